//! 24-hour ticker snapshots.

use rust_decimal::Decimal;

/// A normalized 24h ticker. Fields the exchange does not report are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ticker {
    pub symbol: String,
    /// Milliseconds since the Unix epoch, when the exchange reports one.
    pub timestamp: Option<i64>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
    pub last: Option<Decimal>,
    pub change: Option<Decimal>,
    /// Percent change over the period, in percent (not a ratio).
    pub percentage: Option<Decimal>,
    pub average: Option<Decimal>,
    pub base_volume: Option<Decimal>,
    pub quote_volume: Option<Decimal>,
}
