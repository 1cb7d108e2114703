//! OHLCV candles and timeframes.

use rust_decimal::Decimal;

/// A single OHLCV candle. Tuple order is fixed:
/// `[timestamp_ms, open, high, low, close, volume]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candle {
    /// Candle open time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// The canonical tuple representation.
    #[must_use]
    pub fn as_tuple(&self) -> (i64, Decimal, Decimal, Decimal, Decimal, Decimal) {
        (
            self.timestamp,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}

/// Candle periods supported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    M5,
    M15,
    M30,
    H2,
    H4,
    D1,
}

impl Timeframe {
    /// Period length in seconds, as the wire format expects.
    #[must_use]
    pub const fn seconds(self) -> u32 {
        match self {
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::M30 => 1800,
            Timeframe::H2 => 7200,
            Timeframe::H4 => 14400,
            Timeframe::D1 => 86400,
        }
    }
}
