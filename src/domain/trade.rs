//! Executed trades and fee derivation.

use rust_decimal::Decimal;

use super::order::Side;

/// Who paid the fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakerOrMaker {
    Taker,
    Maker,
}

/// A trading or transfer fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    /// Currency code the fee is denominated in.
    pub currency: String,
    /// Absolute fee amount, in `currency`.
    pub cost: Decimal,
    /// The rate the fee was derived from, when known.
    pub rate: Option<Decimal>,
}

impl Fee {
    /// Derive a trade fee from a maker/taker rate.
    ///
    /// The fee leg depends on the side: a buyer's fee is taken out of the
    /// received base amount (reducing what was actually filled), a seller's
    /// fee out of the quote proceeds (reducing the realized cost). This
    /// asymmetry must be preserved exactly.
    #[must_use]
    pub fn from_rate(
        side: Side,
        base: &str,
        quote: &str,
        amount: Decimal,
        cost: Decimal,
        rate: Decimal,
    ) -> Self {
        match side {
            Side::Buy => Fee {
                currency: base.to_string(),
                cost: amount * rate,
                rate: Some(rate),
            },
            Side::Sell => Fee {
                currency: quote.to_string(),
                cost: cost * rate,
                rate: Some(rate),
            },
        }
    }
}

/// A normalized trade (a single fill). Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: Option<String>,
    /// The order this fill belongs to, when reported.
    pub order_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub symbol: String,
    pub side: Side,
    pub taker_or_maker: Option<TakerOrMaker>,
    pub price: Decimal,
    pub amount: Decimal,
    /// `price * amount`, in quote currency.
    pub cost: Decimal,
    pub fee: Option<Fee>,
}

impl Trade {
    /// Base amount actually received after fees (buy side only reduces).
    #[must_use]
    pub fn net_amount(&self) -> Decimal {
        match &self.fee {
            Some(fee) if self.side == Side::Buy => self.amount - fee.cost,
            _ => self.amount,
        }
    }

    /// Quote proceeds actually received after fees (sell side only reduces).
    #[must_use]
    pub fn net_cost(&self) -> Decimal {
        match &self.fee {
            Some(fee) if self.side == Side::Sell => self.cost - fee.cost,
            _ => self.cost,
        }
    }
}
