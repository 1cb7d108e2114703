//! The unified exchange contract.
//!
//! [`Exchange`] covers the operations every integration must provide;
//! venue-specific extensions (margin orders, lending, wallet transfers) stay
//! as inherent methods on the concrete client.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Balances, Candle, Currency, Market, Order, OrderBook, OrderStatus, OrderType, Side, Ticker,
    Timeframe, Trade, Transaction,
};
use crate::error::Result;

#[async_trait]
pub trait Exchange: Send + Sync {
    /// Stable lowercase identifier, e.g. `"poloniex"`.
    fn name(&self) -> &'static str;

    async fn fetch_markets(&self) -> Result<Vec<Market>>;
    async fn fetch_currencies(&self) -> Result<Vec<Currency>>;
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker>;
    async fn fetch_order_book(&self, symbol: &str, depth: Option<u32>) -> Result<OrderBook>;
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>>;
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>>;

    async fn fetch_balance(&self) -> Result<Balances>;

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Order>;
    async fn cancel_order(&self, id: &str) -> Result<()>;
    async fn fetch_order(&self, id: &str) -> Result<Order>;
    async fn fetch_order_status(&self, id: &str) -> Result<OrderStatus>;
    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>>;
    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>>;
    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>>;
    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>>;

    async fn fetch_deposits(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>>;
    async fn fetch_withdrawals(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>>;
}
