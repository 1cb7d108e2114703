//! Orders and the order-status state machine.

use rust_decimal::Decimal;

use super::trade::{Fee, Trade};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The wire-format string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Parse an exchange-reported side string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Limit,
    Market,
}

/// Order lifecycle state.
///
/// The only transitions are `Open -> Closed` and `Open -> Canceled`; both
/// terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
}

impl OrderStatus {
    /// Whether this state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Canceled)
    }
}

/// A normalized order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: OrderStatus,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    pub filled: Decimal,
    pub remaining: Decimal,
    pub cost: Decimal,
    pub trades: Vec<Trade>,
    pub fee: Option<Fee>,
}
