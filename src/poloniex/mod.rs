//! Poloniex exchange integration.
//!
//! The client owns the per-instance state the unified model needs on top of
//! the raw REST API: the market registry, the order cache (Poloniex has no
//! single order-status endpoint, so order lifecycle is reconciled from
//! open-orders listings), and the error classifier.

pub mod endpoints;
pub mod errors;
pub mod parser;
pub mod wallet;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::domain::{
    ActiveLoans, Balance, Balances, Candle, Currency, DepositAddress, LendingRecord, Loan,
    LoanBook, LoanOffer, Market, MarketRegistry, Order, OrderBook, OrderStatus, OrderType, Side,
    Ticker, Timeframe, Trade, Transaction, TransactionStatus, TransactionType, WalletBalances,
    WalletType,
};
use crate::error::{ApiError, Error, ErrorClassifier, Result};
use crate::orders::{OrderCache, OrderQuery};
use crate::transport::{Api, HttpTransport, Params, Transport};

use wallet::WalletAccumulator;

/// Maker/taker fee rates for the account's current volume tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingFees {
    pub maker: Decimal,
    pub taker: Decimal,
}

/// Legacy/rebranded ticker symbols this exchange still reports, mapped to
/// canonical codes.
fn builtin_common_currencies() -> HashMap<String, String> {
    [
        ("AIR", "AirCoin"),
        ("APH", "AphroditeCoin"),
        ("BCC", "BTCtalkcoin"),
        ("BDG", "Badgercoin"),
        ("BTM", "Bitmark"),
        ("CON", "Coino"),
        ("GOLD", "GoldEagles"),
        ("GPU", "GPU Coin"),
        ("HOT", "Hotcoin"),
        ("ITC", "Information Coin"),
        ("KEY", "KEYCoin"),
        ("PLX", "ParallaxCoin"),
        ("SOC", "SOCC"),
        ("STR", "XLM"),
        ("XAP", "API Coin"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// A Poloniex client instance.
pub struct Poloniex {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    common_currencies: HashMap<String, String>,
    markets: RwLock<MarketRegistry>,
    /// Serializes order-cache reconciliation: the lock is held across the
    /// open-orders fetch so overlapping calls cannot interleave their
    /// upsert/reconcile steps.
    orders: Mutex<OrderCache>,
    classifier: ErrorClassifier,
    fees: RwLock<Option<TradingFees>>,
}

impl Poloniex {
    /// Create a client with the default HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Create a client over an arbitrary transport (used by tests).
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let mut common_currencies = builtin_common_currencies();
        // Config entries override the built-in table.
        common_currencies.extend(config.common_currencies.clone());
        Ok(Self {
            transport,
            config,
            common_currencies,
            markets: RwLock::new(MarketRegistry::new()),
            orders: Mutex::new(OrderCache::new()),
            classifier: errors::classifier(),
            fees: RwLock::new(None),
        })
    }

    /// The currency remap table in effect for this instance.
    #[must_use]
    pub fn common_currencies(&self) -> &HashMap<String, String> {
        &self.common_currencies
    }

    // --- plumbing -----------------------------------------------------------

    async fn call(&self, api: Api, command: &str, params: Params) -> Result<Value> {
        let value = self.transport.call(api, command, params).await?;
        self.check_error(&value)?;
        Ok(value)
    }

    /// Classify an `{"error": "..."}` message embedded in a response body.
    fn check_error(&self, value: &Value) -> Result<()> {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(self.classifier.classify(message).into());
        }
        Ok(())
    }

    /// Some trading responses signal failure as `{"success": 0, "message"}`.
    fn check_success(&self, value: &Value) -> Result<()> {
        if value.get("success").and_then(Value::as_i64) == Some(0) {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(self.classifier.classify(message).into());
        }
        Ok(())
    }

    async fn ensure_markets(&self) -> Result<()> {
        if self.markets.read().is_empty() {
            self.fetch_markets().await?;
        }
        Ok(())
    }

    fn market(&self, symbol: &str) -> Result<Market> {
        self.markets
            .read()
            .by_symbol(symbol)
            .cloned()
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))
    }

    /// Resolve a native pair id, synthesizing a market for unlisted pairs.
    fn resolve_market(&self, id: &str) -> Result<Market> {
        if let Some(market) = self.markets.read().by_id(id) {
            return Ok(market.clone());
        }
        parser::parse_market(id, &Value::Null, &self.common_currencies, self.config.precision)
    }

    fn taker_fee_rate(&self) -> Option<Decimal> {
        (*self.fees.read()).map(|fees| fees.taker)
    }

    // --- markets & market data ----------------------------------------------

    /// Load the market table and refresh the id/symbol registry.
    pub async fn fetch_markets(&self) -> Result<Vec<Market>> {
        let value = self.call(Api::Public, endpoints::RETURN_TICKER, Vec::new()).await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected a ticker table".into()))?;
        let mut markets = Vec::with_capacity(table.len());
        for (id, data) in table {
            markets.push(parser::parse_market(
                id,
                data,
                &self.common_currencies,
                self.config.precision,
            )?);
        }
        self.markets.write().replace(markets.clone());
        debug!(count = markets.len(), "markets loaded");
        Ok(markets)
    }

    /// Fetch listed currencies with canonical codes.
    pub async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        let value = self
            .call(Api::Public, endpoints::RETURN_CURRENCIES, Vec::new())
            .await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected a currency table".into()))?;
        Ok(table
            .iter()
            .map(|(id, data)| parser::parse_currency(id, data, &self.common_currencies))
            .collect())
    }

    pub async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let value = self.call(Api::Public, endpoints::RETURN_TICKER, Vec::new()).await?;
        let data = value
            .get(&market.id)
            .ok_or_else(|| Error::Parse(format!("no ticker for {}", market.id)))?;
        parser::parse_ticker(&market.symbol, data)
    }

    pub async fn fetch_tickers(&self) -> Result<Vec<Ticker>> {
        self.ensure_markets().await?;
        let value = self.call(Api::Public, endpoints::RETURN_TICKER, Vec::new()).await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected a ticker table".into()))?;
        let markets = self.markets.read();
        let mut tickers = Vec::with_capacity(table.len());
        for (id, data) in table {
            let (symbol, _, _) = parser::resolve_symbol(id, &markets, &self.common_currencies)?;
            tickers.push(parser::parse_ticker(&symbol, data)?);
        }
        Ok(tickers)
    }

    pub async fn fetch_order_book(&self, symbol: &str, depth: Option<u32>) -> Result<OrderBook> {
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let mut params: Params = vec![("currencyPair".into(), market.id.clone())];
        if let Some(depth) = depth {
            params.push(("depth".into(), depth.to_string()));
        }
        let value = self.call(Api::Public, endpoints::RETURN_ORDER_BOOK, params).await?;
        parser::parse_order_book(&market.symbol, &value)
    }

    /// Fetch order books for every market in one call.
    pub async fn fetch_order_books(&self, depth: Option<u32>) -> Result<Vec<OrderBook>> {
        self.ensure_markets().await?;
        let mut params: Params = vec![("currencyPair".into(), "all".into())];
        if let Some(depth) = depth {
            params.push(("depth".into(), depth.to_string()));
        }
        let value = self.call(Api::Public, endpoints::RETURN_ORDER_BOOK, params).await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected an order book table".into()))?;
        let markets = self.markets.read();
        let mut books = Vec::with_capacity(table.len());
        for (id, data) in table {
            let (symbol, _, _) = parser::resolve_symbol(id, &markets, &self.common_currencies)?;
            books.push(parser::parse_order_book(&symbol, data)?);
        }
        Ok(books)
    }

    pub async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>> {
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let period = i64::from(timeframe.seconds());
        let end = Utc::now().timestamp();
        let start = match since {
            Some(ms) => ms / 1000,
            None => end - period * limit.unwrap_or(100) as i64,
        };
        let params: Params = vec![
            ("currencyPair".into(), market.id.clone()),
            ("period".into(), period.to_string()),
            ("start".into(), start.to_string()),
            ("end".into(), end.to_string()),
        ];
        let value = self.call(Api::Public, endpoints::RETURN_CHART_DATA, params).await?;
        let rows = value
            .as_array()
            .ok_or_else(|| Error::Parse("expected a candle array".into()))?;
        let mut candles = rows
            .iter()
            .map(parser::parse_candle)
            .collect::<Result<Vec<_>>>()?;
        if let Some(limit) = limit {
            candles.truncate(limit);
        }
        Ok(candles)
    }

    pub async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>> {
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let mut params: Params = vec![("currencyPair".into(), market.id.clone())];
        if let Some(since) = since {
            params.push(("start".into(), (since / 1000).to_string()));
        }
        let value = self
            .call(Api::Public, endpoints::RETURN_TRADE_HISTORY, params)
            .await?;
        let rows = value
            .as_array()
            .ok_or_else(|| Error::Parse("expected a trade array".into()))?;
        let mut trades = rows
            .iter()
            .map(|row| parser::parse_trade(row, &market))
            .collect::<Result<Vec<_>>>()?;
        if let Some(limit) = limit {
            trades.truncate(limit);
        }
        Ok(trades)
    }

    /// Fetch the account's own trade history.
    pub async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>> {
        self.ensure_markets().await?;
        let pair = match symbol {
            Some(symbol) => self.market(symbol)?.id,
            None => "all".into(),
        };
        let mut params: Params = vec![("currencyPair".into(), pair)];
        if let Some(since) = since {
            params.push(("start".into(), (since / 1000).to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit".into(), limit.to_string()));
        }
        let value = self
            .call(Api::Trading, endpoints::RETURN_TRADE_HISTORY, params)
            .await?;

        let mut trades = Vec::new();
        match (&value, symbol) {
            (Value::Array(rows), Some(symbol)) => {
                let market = self.market(symbol)?;
                for row in rows {
                    trades.push(parser::parse_trade(row, &market)?);
                }
            }
            (Value::Object(by_pair), _) => {
                for (id, rows) in by_pair {
                    let market = self.resolve_market(id)?;
                    for row in rows.as_array().into_iter().flatten() {
                        trades.push(parser::parse_trade(row, &market)?);
                    }
                }
            }
            _ => return Err(Error::Parse("unexpected trade history shape".into())),
        }
        trades.sort_by_key(|trade| trade.timestamp);
        if let Some(limit) = limit {
            trades.truncate(limit);
        }
        Ok(trades)
    }

    /// Fetch and cache the account's maker/taker fee rates.
    pub async fn fetch_trading_fees(&self) -> Result<TradingFees> {
        let value = self.call(Api::Trading, endpoints::RETURN_FEE_INFO, Vec::new()).await?;
        let maker = parser::decimal_field(&value, "makerFee")
            .ok_or_else(|| Error::Parse("missing makerFee".into()))?;
        let taker = parser::decimal_field(&value, "takerFee")
            .ok_or_else(|| Error::Parse("missing takerFee".into()))?;
        let fees = TradingFees { maker, taker };
        *self.fees.write() = Some(fees);
        Ok(fees)
    }

    // --- balances -------------------------------------------------------------

    /// Fetch exchange-account balances as free/used/total per asset.
    pub async fn fetch_balance(&self) -> Result<Balances> {
        let value = self
            .call(Api::Trading, endpoints::RETURN_COMPLETE_BALANCES, Vec::new())
            .await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected a balance table".into()))?;
        let mut balances = Balances::new();
        for (asset, fields) in table {
            let free = parser::decimal_field(fields, "available").unwrap_or_default();
            let used = parser::decimal_field(fields, "onOrders").unwrap_or_default();
            let code = parser::remap_currency(asset, &self.common_currencies);
            balances.insert(code, Balance::new(free, used));
        }
        Ok(balances)
    }

    /// Combine available balances, on-order amounts, and lending commitments
    /// into a per-asset per-wallet-type view.
    pub async fn fetch_wallet_balance(&self) -> Result<WalletBalances> {
        let available = self
            .call(
                Api::Trading,
                endpoints::RETURN_AVAILABLE_ACCOUNT_BALANCES,
                Vec::new(),
            )
            .await?;
        let complete = self
            .call(
                Api::Trading,
                endpoints::RETURN_COMPLETE_BALANCES,
                vec![("account".into(), "all".into())],
            )
            .await?;
        let offers = self
            .call(Api::Trading, endpoints::RETURN_OPEN_LOAN_OFFERS, Vec::new())
            .await?;
        let active = self
            .call(Api::Trading, endpoints::RETURN_ACTIVE_LOANS, Vec::new())
            .await?;

        let mut acc = WalletAccumulator::new();
        acc.accumulate_available(&available);
        acc.accumulate_on_orders(&complete);
        acc.accumulate_loan_offers(&offers);
        acc.accumulate_active_loans(&active);
        Ok(acc.finish())
    }

    /// Move funds between wallet types.
    pub async fn transfer_balance(
        &self,
        currency: &str,
        amount: Decimal,
        from: WalletType,
        to: WalletType,
    ) -> Result<()> {
        let params: Params = vec![
            ("currency".into(), currency.into()),
            ("amount".into(), amount.to_string()),
            ("fromAccount".into(), from.as_str().into()),
            ("toAccount".into(), to.as_str().into()),
        ];
        let value = self.call(Api::Trading, endpoints::TRANSFER_BALANCE, params).await?;
        self.check_success(&value)
    }

    // --- orders ---------------------------------------------------------------

    /// Place a spot order. Market orders are not supported by the venue.
    pub async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Order> {
        self.place_order(symbol, order_type, side, amount, price, false).await
    }

    /// Place a margin order.
    pub async fn create_margin_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Order> {
        self.place_order(symbol, order_type, side, amount, price, true).await
    }

    async fn place_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Decimal,
        price: Decimal,
        margin: bool,
    ) -> Result<Order> {
        if order_type == OrderType::Market {
            return Err(Error::NotSupported("market orders"));
        }
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let amount = parser::to_precision(amount, market.precision.amount, self.config.rounding);
        let price = parser::to_precision(price, market.precision.price, self.config.rounding);
        let command = endpoints::order_command(side, margin);
        let params: Params = vec![
            ("currencyPair".into(), market.id.clone()),
            ("rate".into(), price.to_string()),
            ("amount".into(), amount.to_string()),
        ];
        let value = self.call(Api::Trading, command, params).await?;
        let order = parser::parse_created_order(
            &value,
            &market,
            side,
            order_type,
            price,
            amount,
            Utc::now().timestamp_millis(),
            self.taker_fee_rate(),
        )?;
        self.orders.lock().await.insert(order.clone());
        info!(order_id = %order.id, %symbol, side = side.as_str(), "order created");
        Ok(order)
    }

    /// Replace an order's rate (and optionally amount). The venue assigns a
    /// new order number; the old cache entry is marked canceled and the
    /// replacement inserted.
    pub async fn edit_order(
        &self,
        id: &str,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Option<Decimal>,
        price: Decimal,
    ) -> Result<Order> {
        self.ensure_markets().await?;
        let market = self.market(symbol)?;
        let price = parser::to_precision(price, market.precision.price, self.config.rounding);
        let mut params: Params = vec![
            ("orderNumber".into(), id.into()),
            ("rate".into(), price.to_string()),
        ];
        let amount = match amount {
            Some(amount) => {
                let amount =
                    parser::to_precision(amount, market.precision.amount, self.config.rounding);
                params.push(("amount".into(), amount.to_string()));
                amount
            }
            None => {
                let cache = self.orders.lock().await;
                cache
                    .get(id)
                    .map(|order| order.remaining)
                    .ok_or_else(|| Error::Parse("amount required to edit an uncached order".into()))?
            }
        };
        let value = self.call(Api::Trading, endpoints::MOVE_ORDER, params).await?;
        self.check_success(&value)?;
        let order = parser::parse_created_order(
            &value,
            &market,
            side,
            order_type,
            price,
            amount,
            Utc::now().timestamp_millis(),
            self.taker_fee_rate(),
        )?;
        let mut cache = self.orders.lock().await;
        cache.mark_canceled(id);
        cache.insert(order.clone());
        Ok(order)
    }

    /// Cancel an order.
    ///
    /// The cache entry is marked canceled before the wire call goes out: a
    /// second cancel racing the first is rejected by the venue as "cancel
    /// pending", and without the optimistic mark the stale `Open` entry
    /// would wrongly reappear as `Closed` on the next reconcile pass. The
    /// classified error is still propagated to the caller.
    pub async fn cancel_order(&self, id: &str) -> Result<()> {
        self.orders.lock().await.mark_canceled(id);
        let params: Params = vec![("orderNumber".into(), id.into())];
        let value = self.call(Api::Trading, endpoints::CANCEL_ORDER, params).await?;
        self.check_success(&value)?;
        info!(order_id = id, "order canceled");
        Ok(())
    }

    /// Cancel every open order, optionally scoped to one symbol. Returns the
    /// ids the venue reports as canceled.
    pub async fn cancel_all_orders(&self, symbol: Option<&str>) -> Result<Vec<String>> {
        let mut params: Params = Vec::new();
        if let Some(symbol) = symbol {
            self.ensure_markets().await?;
            params.push(("currencyPair".into(), self.market(symbol)?.id));
        }
        let value = self
            .call(Api::Trading, endpoints::CANCEL_ALL_ORDERS, params)
            .await?;
        self.check_success(&value)?;
        let ids: Vec<String> = value
            .get("orderNumbers")
            .and_then(Value::as_array)
            .map(|numbers| {
                numbers
                    .iter()
                    .filter_map(|n| {
                        n.as_u64()
                            .map(|n| n.to_string())
                            .or_else(|| n.as_str().map(str::to_string))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut cache = self.orders.lock().await;
        for id in &ids {
            cache.mark_canceled(id);
        }
        Ok(ids)
    }

    /// Fetch the raw open-orders listing, normalized with status forced to
    /// `Open`.
    async fn fetch_open_listing(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        let pair = match symbol {
            Some(symbol) => self.market(symbol)?.id,
            None => "all".into(),
        };
        let params: Params = vec![("currencyPair".into(), pair)];
        let value = self
            .call(Api::Trading, endpoints::RETURN_OPEN_ORDERS, params)
            .await?;

        let mut listing = Vec::new();
        match (&value, symbol) {
            (Value::Array(rows), Some(symbol)) => {
                for row in rows {
                    listing.push(parser::parse_open_order(row, symbol)?);
                }
            }
            (Value::Object(by_pair), _) => {
                let markets = self.markets.read();
                for (id, rows) in by_pair {
                    let (pair_symbol, _, _) =
                        parser::resolve_symbol(id, &markets, &self.common_currencies)?;
                    for row in rows.as_array().into_iter().flatten() {
                        listing.push(parser::parse_open_order(row, &pair_symbol)?);
                    }
                }
            }
            _ => return Err(Error::Parse("unexpected open orders shape".into())),
        }
        Ok(listing)
    }

    async fn orders_view(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        self.ensure_markets().await?;
        // Held across the fetch: overlapping reconcile passes must observe a
        // monotonically advancing snapshot, never each other's partial state.
        let mut cache = self.orders.lock().await;
        let listing = self.fetch_open_listing(symbol).await?;
        cache.reconcile(listing);
        Ok(cache.select(&OrderQuery {
            symbol,
            since,
            limit,
            status,
        }))
    }

    /// Fetch all orders this instance has observed, reconciling lifecycle
    /// against the venue's open-orders listing. Orders that closed before
    /// this process ever saw them open are invisible; the cache starts empty
    /// each session.
    pub async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        self.orders_view(symbol, since, limit, None).await
    }

    pub async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        self.orders_view(symbol, since, limit, Some(OrderStatus::Open)).await
    }

    pub async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        self.orders_view(symbol, since, limit, Some(OrderStatus::Closed)).await
    }

    /// Fetch one order by id (cache-backed emulation).
    pub async fn fetch_order(&self, id: &str) -> Result<Order> {
        self.orders_view(None, None, None, None).await?;
        let cache = self.orders.lock().await;
        cache
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::OrderNotFound(format!("order {id} was never observed")).into())
    }

    /// Fetch one order by id, requiring it to still be open.
    pub async fn fetch_open_order(&self, id: &str) -> Result<Order> {
        let order = self.fetch_order(id).await?;
        if order.status == OrderStatus::Open {
            Ok(order)
        } else {
            Err(ApiError::OrderNotFound(format!("order {id} is no longer open")).into())
        }
    }

    pub async fn fetch_order_status(&self, id: &str) -> Result<OrderStatus> {
        Ok(self.fetch_order(id).await?.status)
    }

    /// Fetch the fills belonging to one order.
    pub async fn fetch_order_trades(&self, id: &str) -> Result<Vec<Trade>> {
        self.ensure_markets().await?;
        let params: Params = vec![("orderNumber".into(), id.into())];
        let value = self
            .call(Api::Trading, endpoints::RETURN_ORDER_TRADES, params)
            .await?;
        let rows = value
            .as_array()
            .ok_or_else(|| Error::Parse("expected a trade array".into()))?;
        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            let pair = row
                .get("currencyPair")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Parse("missing currencyPair".into()))?;
            let market = self.resolve_market(pair)?;
            let mut trade = parser::parse_trade(row, &market)?;
            trade.order_id = Some(id.to_string());
            trades.push(trade);
        }
        Ok(trades)
    }

    // --- funding ----------------------------------------------------------------

    /// Generate a fresh deposit address for a currency.
    pub async fn create_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let params: Params = vec![("currency".into(), currency.into())];
        let value = self
            .call(Api::Trading, endpoints::GENERATE_NEW_ADDRESS, params)
            .await?;
        self.check_success(&value)?;
        let address = value
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse("missing generated address".into()))?;
        Ok(DepositAddress {
            currency: currency.to_string(),
            address: address.to_string(),
            tag: None,
        })
    }

    /// Fetch the deposit address on file for a currency.
    pub async fn fetch_deposit_address(&self, currency: &str) -> Result<DepositAddress> {
        let value = self
            .call(Api::Trading, endpoints::RETURN_DEPOSIT_ADDRESSES, Vec::new())
            .await?;
        let address = value
            .get(currency)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse(format!("no deposit address on file for {currency}")))?;
        Ok(DepositAddress {
            currency: currency.to_string(),
            address: address.to_string(),
            tag: None,
        })
    }

    /// Request a withdrawal. The venue only acknowledges; the returned
    /// transaction is pending until it shows up in the funding history.
    pub async fn withdraw(
        &self,
        currency: &str,
        amount: Decimal,
        address: &str,
        tag: Option<&str>,
    ) -> Result<Transaction> {
        let amount = parser::to_precision(amount, self.config.precision, self.config.rounding);
        let mut params: Params = vec![
            ("currency".into(), currency.into()),
            ("amount".into(), amount.to_string()),
            ("address".into(), address.into()),
        ];
        if let Some(tag) = tag {
            params.push(("paymentId".into(), tag.into()));
        }
        let value = self.call(Api::Trading, endpoints::WITHDRAW, params).await?;
        self.check_success(&value)?;
        Ok(Transaction {
            id: None,
            currency: parser::remap_currency(currency, &self.common_currencies).to_string(),
            amount,
            address: Some(address.to_string()),
            tag: tag.map(str::to_string),
            status: TransactionStatus::Pending,
            tx_type: TransactionType::Withdrawal,
            txid: None,
            timestamp: Utc::now().timestamp_millis(),
            fee: None,
        })
    }

    /// Fetch deposits and withdrawals, merged and sorted by timestamp.
    pub async fn fetch_transactions(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        let start = since.map_or(0, |ms| ms / 1000);
        let params: Params = vec![
            ("start".into(), start.to_string()),
            ("end".into(), Utc::now().timestamp().to_string()),
        ];
        let value = self
            .call(Api::Trading, endpoints::RETURN_DEPOSITS_WITHDRAWALS, params)
            .await?;

        let mut transactions = Vec::new();
        for row in value.get("deposits").and_then(Value::as_array).into_iter().flatten() {
            transactions.push(parser::parse_transaction(
                row,
                TransactionType::Deposit,
                &self.common_currencies,
            )?);
        }
        for row in value
            .get("withdrawals")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            transactions.push(parser::parse_transaction(
                row,
                TransactionType::Withdrawal,
                &self.common_currencies,
            )?);
        }
        if let Some(currency) = currency {
            transactions.retain(|tx| tx.currency == currency);
        }
        if let Some(since) = since {
            transactions.retain(|tx| tx.timestamp >= since);
        }
        transactions.sort_by_key(|tx| tx.timestamp);
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    pub async fn fetch_deposits(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = self.fetch_transactions(currency, since, None).await?;
        transactions.retain(|tx| tx.tx_type == TransactionType::Deposit);
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    pub async fn fetch_withdrawals(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = self.fetch_transactions(currency, since, None).await?;
        transactions.retain(|tx| tx.tx_type == TransactionType::Withdrawal);
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    // --- lending -----------------------------------------------------------------

    /// Fetch the public loan book for one currency.
    pub async fn fetch_loan_book(&self, currency: &str) -> Result<LoanBook> {
        let params: Params = vec![("currency".into(), currency.into())];
        let value = self.call(Api::Public, endpoints::RETURN_LOAN_ORDERS, params).await?;
        Ok(parser::parse_loan_book(currency, &value))
    }

    /// Fetch loan books for several currencies.
    pub async fn fetch_loan_books(&self, currencies: &[&str]) -> Result<Vec<LoanBook>> {
        let mut books = Vec::with_capacity(currencies.len());
        for currency in currencies {
            books.push(self.fetch_loan_book(currency).await?);
        }
        Ok(books)
    }

    /// Fetch this account's open (unfilled) loan offers.
    pub async fn fetch_open_loans(&self) -> Result<Vec<LoanOffer>> {
        let value = self
            .call(Api::Trading, endpoints::RETURN_OPEN_LOAN_OFFERS, Vec::new())
            .await?;
        let table = value
            .as_object()
            .ok_or_else(|| Error::Parse("expected a loan offer table".into()))?;
        let mut offers = Vec::new();
        for (currency, rows) in table {
            let code = parser::remap_currency(currency, &self.common_currencies);
            for row in rows.as_array().into_iter().flatten() {
                offers.push(parser::parse_loan_offer(code, row)?);
            }
        }
        Ok(offers)
    }

    /// Fetch this account's active loans, provided and used.
    pub async fn fetch_active_loans(&self) -> Result<ActiveLoans> {
        let value = self
            .call(Api::Trading, endpoints::RETURN_ACTIVE_LOANS, Vec::new())
            .await?;
        let parse_side = |key: &str| -> Result<Vec<Loan>> {
            value
                .get(key)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .map(|row| parser::parse_loan(row, &self.common_currencies))
                .collect()
        };
        Ok(ActiveLoans {
            provided: parse_side("provided")?,
            used: parse_side("used")?,
        })
    }

    /// Fetch settled lending history.
    pub async fn fetch_loans_history(
        &self,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<LendingRecord>> {
        let start = since.map_or(0, |ms| ms / 1000);
        let mut params: Params = vec![
            ("start".into(), start.to_string()),
            ("end".into(), Utc::now().timestamp().to_string()),
        ];
        if let Some(limit) = limit {
            params.push(("limit".into(), limit.to_string()));
        }
        let value = self
            .call(Api::Trading, endpoints::RETURN_LENDING_HISTORY, params)
            .await?;
        let rows = value
            .as_array()
            .ok_or_else(|| Error::Parse("expected a lending history array".into()))?;
        rows.iter()
            .map(|row| parser::parse_lending_record(row, &self.common_currencies))
            .collect()
    }

    /// Place a loan offer.
    pub async fn create_loan_order(
        &self,
        currency: &str,
        amount: Decimal,
        rate: Decimal,
        duration: u32,
        auto_renew: bool,
    ) -> Result<LoanOffer> {
        let params: Params = vec![
            ("currency".into(), currency.into()),
            ("amount".into(), amount.to_string()),
            ("lendingRate".into(), rate.to_string()),
            ("duration".into(), duration.to_string()),
            ("autoRenew".into(), i32::from(auto_renew).to_string()),
        ];
        let value = self.call(Api::Trading, endpoints::CREATE_LOAN_OFFER, params).await?;
        self.check_success(&value)?;
        let id = value
            .get("orderID")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Parse("missing loan offer id".into()))?;
        Ok(LoanOffer {
            id,
            currency: currency.to_string(),
            rate,
            amount,
            duration,
            auto_renew,
            timestamp: Some(Utc::now().timestamp_millis()),
        })
    }

    /// Cancel a loan offer.
    pub async fn cancel_loan_order(&self, id: u64) -> Result<()> {
        let params: Params = vec![("orderNumber".into(), id.to_string())];
        let value = self.call(Api::Trading, endpoints::CANCEL_LOAN_OFFER, params).await?;
        self.check_success(&value)
    }
}

#[async_trait::async_trait]
impl crate::exchange::Exchange for Poloniex {
    fn name(&self) -> &'static str {
        "poloniex"
    }

    async fn fetch_markets(&self) -> Result<Vec<Market>> {
        Poloniex::fetch_markets(self).await
    }

    async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        Poloniex::fetch_currencies(self).await
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        Poloniex::fetch_ticker(self, symbol).await
    }

    async fn fetch_order_book(&self, symbol: &str, depth: Option<u32>) -> Result<OrderBook> {
        Poloniex::fetch_order_book(self, symbol, depth).await
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>> {
        Poloniex::fetch_ohlcv(self, symbol, timeframe, since, limit).await
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>> {
        Poloniex::fetch_trades(self, symbol, since, limit).await
    }

    async fn fetch_balance(&self) -> Result<Balances> {
        Poloniex::fetch_balance(self).await
    }

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: Side,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Order> {
        Poloniex::create_order(self, symbol, order_type, side, amount, price).await
    }

    async fn cancel_order(&self, id: &str) -> Result<()> {
        Poloniex::cancel_order(self, id).await
    }

    async fn fetch_order(&self, id: &str) -> Result<Order> {
        Poloniex::fetch_order(self, id).await
    }

    async fn fetch_order_status(&self, id: &str) -> Result<OrderStatus> {
        Poloniex::fetch_order_status(self, id).await
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        Poloniex::fetch_orders(self, symbol, since, limit).await
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        Poloniex::fetch_open_orders(self, symbol, since, limit).await
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>> {
        Poloniex::fetch_closed_orders(self, symbol, since, limit).await
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>> {
        Poloniex::fetch_my_trades(self, symbol, since, limit).await
    }

    async fn fetch_deposits(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        Poloniex::fetch_deposits(self, currency, since, limit).await
    }

    async fn fetch_withdrawals(
        &self,
        currency: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        Poloniex::fetch_withdrawals(self, currency, since, limit).await
    }
}
