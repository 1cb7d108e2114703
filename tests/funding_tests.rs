mod support;

use cambist::domain::{TransactionStatus, TransactionType};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn funding_history() -> Value {
    json!({
        "deposits": [{
            "currency": "BTC",
            "address": "1abc",
            "amount": "1.0",
            "confirmations": 10,
            "txid": "feed",
            "timestamp": 1_540_000_000,
            "status": "COMPLETE",
        }],
        "withdrawals": [{
            "withdrawalNumber": 777,
            "currency": "ETH",
            "address": "0xabc",
            "amount": "2.0",
            "fee": "0.01",
            "timestamp": 1_540_000_100,
            "status": "COMPLETE: 0xdeadbeef",
        }],
    })
}

#[tokio::test]
async fn transactions_merge_sorted_with_netted_withdrawals() {
    let (client, transport) = support::client();
    transport.push_ok(funding_history());

    let transactions = client.fetch_transactions(None, None, None).await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].tx_type, TransactionType::Deposit);
    assert_eq!(transactions[0].amount, dec!(1.0));
    assert_eq!(transactions[1].tx_type, TransactionType::Withdrawal);
    // Withdrawal amounts are net of the fee.
    assert_eq!(transactions[1].amount, dec!(1.99));
    assert_eq!(transactions[1].txid.as_deref(), Some("0xdeadbeef"));
    assert_eq!(transactions[1].status, TransactionStatus::Ok);
}

#[tokio::test]
async fn deposits_and_withdrawals_filter_by_type() {
    let (client, transport) = support::client();
    transport.push_ok(funding_history());
    let deposits = client.fetch_deposits(None, None, None).await.unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].currency, "BTC");

    transport.push_ok(funding_history());
    let withdrawals = client.fetch_withdrawals(Some("ETH"), None, None).await.unwrap();
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].id.as_deref(), Some("777"));
}

#[tokio::test]
async fn withdraw_returns_a_pending_transaction() {
    let (client, transport) = support::client();
    transport.push_ok(json!({"response": "Withdrew 2.0 ETH."}));

    let tx = client.withdraw("ETH", dec!(2), "0xabc", None).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.tx_type, TransactionType::Withdrawal);
    assert_eq!(tx.amount, dec!(2));
    assert_eq!(tx.address.as_deref(), Some("0xabc"));

    let call = transport.calls().into_iter().last().unwrap();
    assert_eq!(call.command, "withdraw");
    assert_eq!(call.param("currency"), Some("ETH"));
    assert_eq!(call.param("address"), Some("0xabc"));
    assert_eq!(call.param("paymentId"), None);
}

#[tokio::test]
async fn deposit_addresses_are_looked_up_and_generated() {
    let (client, transport) = support::client();
    transport.push_ok(json!({"BTC": "1abc", "ETH": "0xdef"}));
    let address = client.fetch_deposit_address("BTC").await.unwrap();
    assert_eq!(address.address, "1abc");

    transport.push_ok(json!({"success": 1, "response": "0xfresh"}));
    let generated = client.create_deposit_address("ETH").await.unwrap();
    assert_eq!(generated.address, "0xfresh");
    assert_eq!(generated.currency, "ETH");
}
