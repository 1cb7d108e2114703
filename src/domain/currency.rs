//! Listed currencies.

use rust_decimal::Decimal;

/// A currency listed on an exchange.
///
/// `id` is the exchange-native code; `code` is the canonical code after
/// common-currency remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub id: String,
    pub code: String,
    pub name: String,
    /// False when the currency is delisted, disabled, or frozen.
    pub active: bool,
    /// Flat withdrawal fee, when the exchange reports one.
    pub fee: Option<Decimal>,
}
