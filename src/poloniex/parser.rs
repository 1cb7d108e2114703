//! Pure normalization functions for Poloniex payloads.
//!
//! Every function here is side-effect free: raw `serde_json::Value` (plus
//! any already-resolved market context) in, canonical entity out. Poloniex
//! reports most numerics as strings, some as bare numbers; the helpers
//! accept both.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::config::RoundingMode;
use crate::domain::{
    Candle, Currency, Fee, LendingRecord, Limits, Loan, LoanBook, LoanBookEntry, LoanOffer,
    Market, MarketRegistry, MinMax, Order, OrderBook, OrderStatus, OrderType, Precision, Side,
    Ticker, Trade, Transaction, TransactionStatus, TransactionType,
};
use crate::error::{Error, Result};

// --- numeric / field helpers -----------------------------------------------

/// Read a `Decimal` field, accepting string or number encodings.
pub(crate) fn decimal_field(data: &Value, key: &str) -> Option<Decimal> {
    let value = data.get(key)?;
    if let Some(s) = value.as_str() {
        s.parse().ok()
    } else if value.is_number() {
        value.to_string().parse().ok()
    } else {
        None
    }
}

fn required_decimal(data: &Value, key: &str) -> Result<Decimal> {
    decimal_field(data, key).ok_or_else(|| Error::Parse(format!("missing numeric field '{key}'")))
}

fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn required_str<'a>(data: &'a Value, key: &str) -> Result<&'a str> {
    str_field(data, key).ok_or_else(|| Error::Parse(format!("missing string field '{key}'")))
}

fn u64_field(data: &Value, key: &str) -> Option<u64> {
    let value = data.get(key)?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Parse the exchange's `YYYY-MM-DD HH:MM:SS` UTC timestamps to epoch ms.
pub(crate) fn parse_datetime(text: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Truncate a user-supplied amount/price to exchange precision.
///
/// The direction is configurable because venues disagree on the rule;
/// flooring can never overdraw on the sell side.
#[must_use]
pub fn to_precision(value: Decimal, places: u32, mode: RoundingMode) -> Decimal {
    let strategy = match mode {
        RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
    };
    value.round_dp_with_strategy(places, strategy)
}

// --- market resolution ------------------------------------------------------

/// Remap a native currency code through the common-currencies table.
#[must_use]
pub fn remap_currency<'a>(code: &'a str, common: &'a HashMap<String, String>) -> &'a str {
    common.get(code).map_or(code, String::as_str)
}

/// Resolve a native pair id to `(symbol, base, quote)`.
///
/// The market-by-id index is consulted first; for unlisted or delisted pairs
/// the id is split on its delimiter instead. Poloniex ids are quote-first
/// (`BTC_ETH` is the ETH/BTC market). Both legs go through the
/// common-currencies remap before symbol construction.
pub fn resolve_symbol(
    id: &str,
    markets: &MarketRegistry,
    common: &HashMap<String, String>,
) -> Result<(String, String, String)> {
    if let Some(market) = markets.by_id(id) {
        return Ok((
            market.symbol.clone(),
            market.base.clone(),
            market.quote.clone(),
        ));
    }
    let (quote_id, base_id) = id
        .split_once('_')
        .ok_or_else(|| Error::Parse(format!("unparseable market id '{id}'")))?;
    let base = remap_currency(base_id, common).to_string();
    let quote = remap_currency(quote_id, common).to_string();
    Ok((format!("{base}/{quote}"), base, quote))
}

/// Build a [`Market`] from a ticker-table entry.
pub fn parse_market(
    id: &str,
    data: &Value,
    common: &HashMap<String, String>,
    precision: u32,
) -> Result<Market> {
    let (quote_id, base_id) = id
        .split_once('_')
        .ok_or_else(|| Error::Parse(format!("unparseable market id '{id}'")))?;
    let base = remap_currency(base_id, common).to_string();
    let quote = remap_currency(quote_id, common).to_string();
    let frozen = str_field(data, "isFrozen").map_or(false, |v| v == "1");
    Ok(Market {
        id: id.to_string(),
        symbol: format!("{base}/{quote}"),
        base,
        quote,
        base_id: base_id.to_string(),
        quote_id: quote_id.to_string(),
        active: !frozen,
        precision: Precision {
            amount: precision,
            price: precision,
        },
        limits: Limits {
            amount: MinMax {
                min: Some(Decimal::new(1, 6)), // 0.000001
                max: Some(Decimal::new(1_000_000_000, 0)),
            },
            price: MinMax {
                min: Some(Decimal::new(1, 8)), // 0.00000001
                max: Some(Decimal::new(1_000_000_000, 0)),
            },
            cost: MinMax {
                min: Some(Decimal::new(1, 4)), // 0.0001
                max: None,
            },
        },
    })
}

/// Build a [`Currency`] from a `returnCurrencies` entry.
pub fn parse_currency(id: &str, data: &Value, common: &HashMap<String, String>) -> Currency {
    let disabled = data.get("disabled").and_then(Value::as_i64).unwrap_or(0) == 1;
    let delisted = data.get("delisted").and_then(Value::as_i64).unwrap_or(0) == 1;
    let frozen = data.get("frozen").and_then(Value::as_i64).unwrap_or(0) == 1;
    Currency {
        id: id.to_string(),
        code: remap_currency(id, common).to_string(),
        name: str_field(data, "name").unwrap_or(id).to_string(),
        active: !(disabled || delisted || frozen),
        fee: decimal_field(data, "txFee"),
    }
}

// --- market data ------------------------------------------------------------

/// Normalize a ticker-table entry.
///
/// Poloniex reports no open price; it is derived from `last` and
/// `percentChange` (a ratio): `open = last / (1 + percentChange)`.
pub fn parse_ticker(symbol: &str, data: &Value) -> Result<Ticker> {
    let last = decimal_field(data, "last");
    let relative_change = decimal_field(data, "percentChange");

    let mut open = None;
    let mut change = None;
    let mut average = None;
    if let (Some(last), Some(relative)) = (last, relative_change) {
        let divisor = Decimal::ONE + relative;
        if !divisor.is_zero() {
            let o = last / divisor;
            change = Some(last - o);
            average = Some((last + o) / Decimal::TWO);
            open = Some(o);
        }
    }

    Ok(Ticker {
        symbol: symbol.to_string(),
        timestamp: None,
        high: decimal_field(data, "high24hr"),
        low: decimal_field(data, "low24hr"),
        bid: decimal_field(data, "highestBid"),
        ask: decimal_field(data, "lowestAsk"),
        open,
        close: last,
        last,
        change,
        percentage: relative_change.map(|r| r * Decimal::ONE_HUNDRED),
        average,
        // Poloniex labels volumes from its quote-first pair convention, so
        // the fields swap on the way to canonical form.
        base_volume: decimal_field(data, "quoteVolume"),
        quote_volume: decimal_field(data, "baseVolume"),
    })
}

/// Parse a bare JSON value (string or number) as a `Decimal`.
pub(crate) fn value_as_decimal(value: &Value) -> Option<Decimal> {
    if let Some(s) = value.as_str() {
        s.parse().ok()
    } else if value.is_number() {
        value.to_string().parse().ok()
    } else {
        None
    }
}

fn parse_book_side(data: &Value) -> Vec<(Decimal, Decimal)> {
    data.as_array()
        .map(|levels| {
            levels
                .iter()
                .filter_map(|level| {
                    let pair = level.as_array()?;
                    let price = value_as_decimal(pair.first()?)?;
                    let amount = value_as_decimal(pair.get(1)?)?;
                    Some((price, amount))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize an order book snapshot.
pub fn parse_order_book(symbol: &str, data: &Value) -> Result<OrderBook> {
    let mut bids = parse_book_side(&data["bids"]);
    let mut asks = parse_book_side(&data["asks"]);
    // Best-first on both sides.
    bids.sort_by(|a, b| b.0.cmp(&a.0));
    asks.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(OrderBook {
        symbol: symbol.to_string(),
        timestamp: None,
        bids,
        asks,
    })
}

/// Normalize one `returnChartData` record.
///
/// Candle tuple order is fixed: `[timestamp_ms, open, high, low, close,
/// volume]`; the exchange reports epoch seconds.
pub fn parse_candle(data: &Value) -> Result<Candle> {
    let seconds = data
        .get("date")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Parse("missing candle date".into()))?;
    Ok(Candle {
        timestamp: seconds * 1000,
        open: required_decimal(data, "open")?,
        high: required_decimal(data, "high")?,
        low: required_decimal(data, "low")?,
        close: required_decimal(data, "close")?,
        volume: required_decimal(data, "volume")?,
    })
}

// --- trades ------------------------------------------------------------------

/// Normalize a trade record, public or private.
///
/// Private history rows carry a `fee` rate; the fee leg follows the side
/// asymmetry: buys pay in base (out of the received amount), sells pay in
/// quote (out of the proceeds).
pub fn parse_trade(data: &Value, market: &Market) -> Result<Trade> {
    let side = required_str(data, "type")
        .ok()
        .and_then(Side::parse)
        .ok_or_else(|| Error::Parse("missing or invalid trade side".into()))?;
    let timestamp = required_str(data, "date")
        .ok()
        .and_then(parse_datetime)
        .ok_or_else(|| Error::Parse("missing or invalid trade date".into()))?;
    let price = required_decimal(data, "rate")?;
    let amount = required_decimal(data, "amount")?;
    let cost = decimal_field(data, "total").unwrap_or_else(|| price * amount);

    let fee = decimal_field(data, "fee").map(|rate| {
        Fee::from_rate(side, &market.base, &market.quote, amount, cost, rate)
    });

    let id = u64_field(data, "tradeID")
        .or_else(|| u64_field(data, "globalTradeID"))
        .map(|id| id.to_string());

    Ok(Trade {
        id,
        order_id: u64_field(data, "orderNumber").map(|id| id.to_string()),
        timestamp,
        symbol: market.symbol.clone(),
        side,
        taker_or_maker: None,
        price,
        amount,
        cost,
        fee,
    })
}

// --- orders ------------------------------------------------------------------

/// Normalize one `returnOpenOrders` row. Status is forced to `Open`: the
/// listing is the exchange's assertion that the order is still on the book,
/// and reconciliation owns every other transition.
pub fn parse_open_order(data: &Value, symbol: &str) -> Result<Order> {
    let id = u64_field(data, "orderNumber")
        .ok_or_else(|| Error::Parse("missing orderNumber".into()))?
        .to_string();
    let side = required_str(data, "type")
        .ok()
        .and_then(Side::parse)
        .ok_or_else(|| Error::Parse("missing or invalid order side".into()))?;
    let price = required_decimal(data, "rate")?;
    // `amount` is what is left on the book; `startingAmount` the original.
    let remaining = required_decimal(data, "amount")?;
    let amount = decimal_field(data, "startingAmount").unwrap_or(remaining);
    let filled = (amount - remaining).max(Decimal::ZERO);
    let timestamp = str_field(data, "date")
        .and_then(parse_datetime)
        .unwrap_or_default();

    Ok(Order {
        id,
        timestamp,
        status: OrderStatus::Open,
        symbol: symbol.to_string(),
        order_type: OrderType::Limit,
        side,
        price,
        amount,
        filled,
        remaining,
        cost: filled * price,
        trades: Vec::new(),
        fee: None,
    })
}

/// Materialize an [`Order`] from a `buy`/`sell`/`moveOrder` response.
///
/// The response reports only the assigned order number and any immediately
/// resulting trades; everything else comes from the request context.
#[allow(clippy::too_many_arguments)]
pub fn parse_created_order(
    data: &Value,
    market: &Market,
    side: Side,
    order_type: OrderType,
    price: Decimal,
    amount: Decimal,
    timestamp: i64,
    fee_rate: Option<Decimal>,
) -> Result<Order> {
    let id = u64_field(data, "orderNumber")
        .ok_or_else(|| Error::Parse("missing orderNumber".into()))?
        .to_string();

    // moveOrder nests resulting trades under the pair id.
    let raw_trades = match &data["resultingTrades"] {
        Value::Array(trades) => trades.clone(),
        Value::Object(by_pair) => by_pair
            .get(&market.id)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut trades = Vec::with_capacity(raw_trades.len());
    for raw in &raw_trades {
        let mut trade = parse_trade(raw, market)?;
        trade.order_id = Some(id.clone());
        if trade.fee.is_none() {
            trade.fee = fee_rate.map(|rate| {
                Fee::from_rate(side, &market.base, &market.quote, trade.amount, trade.cost, rate)
            });
        }
        trades.push(trade);
    }

    let filled: Decimal = trades.iter().map(|t| t.amount).sum();
    let cost: Decimal = trades.iter().map(|t| t.cost).sum();
    let remaining = (amount - filled).max(Decimal::ZERO);
    let status = if remaining.is_zero() && !trades.is_empty() {
        OrderStatus::Closed
    } else {
        OrderStatus::Open
    };

    Ok(Order {
        id,
        timestamp,
        status,
        symbol: market.symbol.clone(),
        order_type,
        side,
        price,
        amount,
        filled,
        remaining,
        cost,
        trades,
        fee: None,
    })
}

// --- transactions ------------------------------------------------------------

/// Map an exchange status string to the canonical transaction status.
/// Withdrawal statuses embed the txid (`"COMPLETE: <txid>"`), hence the
/// prefix matching.
#[must_use]
pub fn parse_transaction_status(status: &str) -> TransactionStatus {
    if status.starts_with("COMPLETE ERROR") || status.starts_with("ERROR") {
        TransactionStatus::Failed
    } else if status.starts_with("COMPLETE") {
        TransactionStatus::Ok
    } else if status.starts_with("CANCEL") {
        TransactionStatus::Canceled
    } else {
        // AWAITING APPROVAL, PENDING, PROCESSING, ...
        TransactionStatus::Pending
    }
}

/// Normalize one deposit or withdrawal record.
///
/// Withdrawal amounts are reported gross of the fee; the canonical `amount`
/// is net, so the fee is subtracted here.
pub fn parse_transaction(
    data: &Value,
    tx_type: TransactionType,
    common: &HashMap<String, String>,
) -> Result<Transaction> {
    let currency_id = required_str(data, "currency")?;
    let currency = remap_currency(currency_id, common).to_string();
    let status_raw = required_str(data, "status")?;
    let status = parse_transaction_status(status_raw);
    let timestamp = data
        .get("timestamp")
        .and_then(Value::as_i64)
        .map(|s| s * 1000)
        .ok_or_else(|| Error::Parse("missing transaction timestamp".into()))?;

    let gross = required_decimal(data, "amount")?;
    let fee_cost = decimal_field(data, "fee");
    let amount = match (tx_type, fee_cost) {
        (TransactionType::Withdrawal, Some(fee)) => gross - fee,
        _ => gross,
    };

    // Deposits carry a bare txid field; completed withdrawals embed it in
    // the status string.
    let txid = str_field(data, "txid").map(str::to_string).or_else(|| {
        status_raw
            .split_once(": ")
            .map(|(_, txid)| txid.to_string())
    });

    Ok(Transaction {
        id: u64_field(data, "withdrawalNumber").map(|id| id.to_string()),
        currency: currency.clone(),
        amount,
        address: str_field(data, "address").map(str::to_string),
        tag: str_field(data, "paymentID").map(str::to_string),
        status,
        tx_type,
        txid,
        timestamp,
        fee: fee_cost.map(|cost| Fee {
            currency,
            cost,
            rate: None,
        }),
    })
}

// --- lending -------------------------------------------------------------------

/// Normalize the public loan book for one currency.
pub fn parse_loan_book(currency: &str, data: &Value) -> LoanBook {
    let parse_side = |key: &str| -> Vec<LoanBookEntry> {
        data.get(key)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        Some(LoanBookEntry {
                            rate: decimal_field(entry, "rate")?,
                            amount: decimal_field(entry, "amount")?,
                            range_min: u64_field(entry, "rangeMin").unwrap_or(2) as u32,
                            range_max: u64_field(entry, "rangeMax").unwrap_or(2) as u32,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    LoanBook {
        currency: currency.to_string(),
        offers: parse_side("offers"),
        demands: parse_side("demands"),
    }
}

/// Normalize one open loan offer.
pub fn parse_loan_offer(currency: &str, data: &Value) -> Result<LoanOffer> {
    Ok(LoanOffer {
        id: u64_field(data, "id").ok_or_else(|| Error::Parse("missing loan offer id".into()))?,
        currency: currency.to_string(),
        rate: required_decimal(data, "rate")?,
        amount: required_decimal(data, "amount")?,
        duration: u64_field(data, "duration").unwrap_or(2) as u32,
        auto_renew: data.get("autoRenew").and_then(Value::as_i64).unwrap_or(0) == 1,
        timestamp: str_field(data, "date").and_then(parse_datetime),
    })
}

/// Normalize one active loan (provided or used).
pub fn parse_loan(data: &Value, common: &HashMap<String, String>) -> Result<Loan> {
    let currency_id = required_str(data, "currency")?;
    Ok(Loan {
        id: u64_field(data, "id").ok_or_else(|| Error::Parse("missing loan id".into()))?,
        currency: remap_currency(currency_id, common).to_string(),
        rate: required_decimal(data, "rate")?,
        amount: required_decimal(data, "amount")?,
        duration: u64_field(data, "range").unwrap_or(2) as u32,
        auto_renew: data.get("autoRenew").and_then(Value::as_i64).unwrap_or(0) == 1,
        timestamp: str_field(data, "date").and_then(parse_datetime),
    })
}

/// Normalize one lending-history row.
pub fn parse_lending_record(data: &Value, common: &HashMap<String, String>) -> Result<LendingRecord> {
    let currency_id = required_str(data, "currency")?;
    Ok(LendingRecord {
        id: u64_field(data, "id").ok_or_else(|| Error::Parse("missing lending id".into()))?,
        currency: remap_currency(currency_id, common).to_string(),
        rate: required_decimal(data, "rate")?,
        amount: required_decimal(data, "amount")?,
        duration: required_decimal(data, "duration")?,
        interest: required_decimal(data, "interest")?,
        fee: required_decimal(data, "fee")?,
        earned: required_decimal(data, "earned")?,
        timestamp: str_field(data, "close").and_then(parse_datetime),
    })
}
