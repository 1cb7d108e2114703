#![allow(dead_code)]

use std::sync::Arc;

use cambist::config::ClientConfig;
use cambist::poloniex::Poloniex;
use cambist::testkit::ScriptedTransport;
use serde_json::{json, Value};

/// Capture client logs in test output, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A client over a scripted transport, plus the transport for scripting and
/// call assertions.
pub fn client() -> (Poloniex, Arc<ScriptedTransport>) {
    init_tracing();
    let transport = Arc::new(ScriptedTransport::new());
    let client = Poloniex::with_transport(ClientConfig::default(), transport.clone())
        .expect("default config is valid");
    (client, transport)
}

/// A `returnTicker` table covering three markets, including a delisted-style
/// legacy code (STR) that remaps to XLM.
pub fn ticker_table() -> Value {
    json!({
        "BTC_ETH": {
            "last": "0.05",
            "percentChange": "0.1",
            "highestBid": "0.049",
            "lowestAsk": "0.051",
            "baseVolume": "100",
            "quoteVolume": "2000",
            "high24hr": "0.06",
            "low24hr": "0.04",
            "isFrozen": "0",
        },
        "BTC_XMR": {
            "last": "0.01",
            "percentChange": "-0.05",
            "highestBid": "0.0099",
            "lowestAsk": "0.0101",
            "baseVolume": "50",
            "quoteVolume": "5000",
            "high24hr": "0.011",
            "low24hr": "0.009",
            "isFrozen": "0",
        },
        "BTC_STR": {
            "last": "0.00002",
            "percentChange": "0",
            "highestBid": "0.0000199",
            "lowestAsk": "0.0000201",
            "baseVolume": "10",
            "quoteVolume": "500000",
            "high24hr": "0.000021",
            "low24hr": "0.000019",
            "isFrozen": "1",
        },
    })
}

/// One `returnOpenOrders` row for the given order.
pub fn open_order_row(id: &str, side: &str, rate: &str, amount: &str, starting: &str) -> Value {
    json!({
        "orderNumber": id,
        "type": side,
        "rate": rate,
        "amount": amount,
        "startingAmount": starting,
        "total": "0",
        "date": "2018-10-10 10:10:10",
    })
}
