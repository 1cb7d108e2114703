//! Per-asset balances and per-wallet-type balances.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// A single asset's balance. `total == free + used` by construction; the
/// fields are private so the invariant cannot be broken after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    free: Decimal,
    used: Decimal,
    total: Decimal,
}

impl Balance {
    #[must_use]
    pub fn new(free: Decimal, used: Decimal) -> Self {
        Self {
            free,
            used,
            total: free + used,
        }
    }

    #[must_use]
    pub const fn free(&self) -> Decimal {
        self.free
    }

    #[must_use]
    pub const fn used(&self) -> Decimal {
        self.used
    }

    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }
}

/// Asset code → [`Balance`], sorted by asset for deterministic iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    accounts: BTreeMap<String, Balance>,
}

impl Balances {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: impl Into<String>, balance: Balance) {
        self.accounts.insert(asset.into(), balance);
    }

    #[must_use]
    pub fn get(&self, asset: &str) -> Option<&Balance> {
        self.accounts.get(asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Balance)> {
        self.accounts.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Sub-account classification an asset balance is held under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WalletType {
    Exchange,
    Margin,
    Lending,
}

impl WalletType {
    /// The wire-format account name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WalletType::Exchange => "exchange",
            WalletType::Margin => "margin",
            WalletType::Lending => "lending",
        }
    }

    /// Parse an exchange-reported account name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "exchange" => Some(WalletType::Exchange),
            "margin" => Some(WalletType::Margin),
            "lending" => Some(WalletType::Lending),
            _ => None,
        }
    }
}

/// One asset's balance within one wallet type.
///
/// `total == available + on_orders`, derived once accumulation of all
/// sources is complete (see the wallet aggregator), never incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletEntry {
    available: Decimal,
    on_orders: Decimal,
    total: Decimal,
}

impl WalletEntry {
    #[must_use]
    pub fn new(available: Decimal, on_orders: Decimal) -> Self {
        Self {
            available,
            on_orders,
            total: available + on_orders,
        }
    }

    #[must_use]
    pub const fn available(&self) -> Decimal {
        self.available
    }

    #[must_use]
    pub const fn on_orders(&self) -> Decimal {
        self.on_orders
    }

    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }
}

/// Asset → wallet type → [`WalletEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletBalances {
    entries: BTreeMap<String, BTreeMap<WalletType, WalletEntry>>,
}

impl WalletBalances {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: impl Into<String>, wallet: WalletType, entry: WalletEntry) {
        self.entries.entry(asset.into()).or_default().insert(wallet, entry);
    }

    #[must_use]
    pub fn get(&self, asset: &str, wallet: WalletType) -> Option<&WalletEntry> {
        self.entries.get(asset).and_then(|wallets| wallets.get(&wallet))
    }

    /// All wallet entries for one asset.
    #[must_use]
    pub fn asset(&self, asset: &str) -> Option<&BTreeMap<WalletType, WalletEntry>> {
        self.entries.get(asset)
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&str, &BTreeMap<WalletType, WalletEntry>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_total_is_free_plus_used() {
        let balance = Balance::new(dec!(1.5), dec!(0.25));
        assert_eq!(balance.total(), dec!(1.75));
        assert_eq!(balance.free(), dec!(1.5));
        assert_eq!(balance.used(), dec!(0.25));
    }

    #[test]
    fn wallet_entry_total_is_available_plus_on_orders() {
        let entry = WalletEntry::new(dec!(2), dec!(3));
        assert_eq!(entry.total(), dec!(5));
    }

    #[test]
    fn wallet_type_round_trips() {
        for wallet in [WalletType::Exchange, WalletType::Margin, WalletType::Lending] {
            assert_eq!(WalletType::parse(wallet.as_str()), Some(wallet));
        }
        assert_eq!(WalletType::parse("futures"), None);
    }
}
