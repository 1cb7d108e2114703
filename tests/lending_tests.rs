mod support;

use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn loan_book_parses_both_sides() {
    let (client, transport) = support::client();
    transport.push_ok(json!({
        "offers": [
            {"rate": "0.00020000", "amount": "64.66305732", "rangeMin": 2, "rangeMax": 8},
        ],
        "demands": [
            {"rate": "0.00170000", "amount": "26.54848841", "rangeMin": 2, "rangeMax": 2},
        ],
    }));

    let book = client.fetch_loan_book("BTC").await.unwrap();
    assert_eq!(book.currency, "BTC");
    assert_eq!(book.offers.len(), 1);
    assert_eq!(book.offers[0].rate, dec!(0.0002));
    assert_eq!(book.offers[0].range_max, 8);
    assert_eq!(book.demands.len(), 1);
}

#[tokio::test]
async fn active_loans_split_provided_and_used() {
    let (client, transport) = support::client();
    transport.push_ok(json!({
        "provided": [{
            "id": 75073,
            "currency": "BTC",
            "rate": "0.00020000",
            "amount": "0.30000000",
            "range": 2,
            "autoRenew": 0,
            "date": "2018-05-10 23:45:05",
        }],
        "used": [{
            "id": 75238,
            "currency": "STR",
            "rate": "0.00020000",
            "amount": "100.0",
            "range": 2,
            "date": "2018-05-10 23:51:12",
        }],
    }));

    let loans = client.fetch_active_loans().await.unwrap();
    assert_eq!(loans.provided.len(), 1);
    assert_eq!(loans.provided[0].amount, dec!(0.3));
    assert_eq!(loans.used.len(), 1);
    // Legacy codes remap in lending views too.
    assert_eq!(loans.used[0].currency, "XLM");
}

#[tokio::test]
async fn loan_offer_lifecycle_round_trips() {
    let (client, transport) = support::client();
    transport.push_ok(json!({
        "success": 1,
        "message": "Loan order placed.",
        "orderID": 10342,
    }));
    let offer = client
        .create_loan_order("BTC", dec!(0.5), dec!(0.0003), 2, false)
        .await
        .unwrap();
    assert_eq!(offer.id, 10342);
    assert_eq!(offer.amount, dec!(0.5));
    let call = transport.calls().into_iter().last().unwrap();
    assert_eq!(call.command, "createLoanOffer");
    assert_eq!(call.param("lendingRate"), Some("0.0003"));
    assert_eq!(call.param("autoRenew"), Some("0"));

    transport.push_ok(json!({
        "BTC": [{
            "id": 10342,
            "rate": "0.00030000",
            "amount": "0.50000000",
            "duration": 2,
            "autoRenew": 0,
            "date": "2018-05-10 23:33:50",
        }],
    }));
    let open = client.fetch_open_loans().await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, 10342);

    transport.push_ok(json!({"success": 1, "message": "Loan offer canceled."}));
    client.cancel_loan_order(10342).await.unwrap();
}
