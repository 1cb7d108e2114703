//! Price-level order books.

use rust_decimal::Decimal;

/// A normalized order book snapshot.
///
/// `bids` are sorted best-first (descending price), `asks` best-first
/// (ascending price). Each level is `(price, amount)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    pub symbol: String,
    pub timestamp: Option<i64>,
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

impl OrderBook {
    /// Best bid price, if any depth exists.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|(price, _)| *price)
    }

    /// Best ask price, if any depth exists.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|(price, _)| *price)
    }
}
