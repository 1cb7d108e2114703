//! Market types and the bidirectional market registry.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Inclusive bounds for an order field. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinMax {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

/// Decimal places accepted by the exchange for each numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub amount: u32,
    pub price: u32,
}

/// Order-size limits enforced by the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
}

/// A tradeable pair, created once per session on market load and immutable
/// thereafter.
///
/// `id` is the exchange-native pair string (e.g. `BTC_ETH`); `symbol` is the
/// canonical `BASE/QUOTE` form (e.g. `ETH/BTC`). `base`/`quote` carry
/// canonical currency codes after common-currency remapping, while
/// `base_id`/`quote_id` keep the exchange-native codes for request building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub id: String,
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub base_id: String,
    pub quote_id: String,
    pub active: bool,
    pub precision: Precision,
    pub limits: Limits,
}

/// Index of markets keyed by both exchange-native id and canonical symbol,
/// for bidirectional lookup.
#[derive(Debug, Default)]
pub struct MarketRegistry {
    by_id: HashMap<String, Market>,
    by_symbol: HashMap<String, Market>,
}

impl MarketRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a market, indexing it under both keys.
    pub fn add(&mut self, market: Market) {
        self.by_id.insert(market.id.clone(), market.clone());
        self.by_symbol.insert(market.symbol.clone(), market);
    }

    /// Replace the registry contents with a fresh market load.
    pub fn replace(&mut self, markets: Vec<Market>) {
        self.by_id.clear();
        self.by_symbol.clear();
        for market in markets {
            self.add(market);
        }
    }

    /// Look up a market by its exchange-native id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Market> {
        self.by_id.get(id)
    }

    /// Look up a market by its canonical symbol.
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Option<&Market> {
        self.by_symbol.get(symbol)
    }

    /// All markets, in arbitrary order.
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.by_id.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth_btc() -> Market {
        Market {
            id: "BTC_ETH".into(),
            symbol: "ETH/BTC".into(),
            base: "ETH".into(),
            quote: "BTC".into(),
            base_id: "ETH".into(),
            quote_id: "BTC".into(),
            active: true,
            precision: Precision {
                amount: 8,
                price: 8,
            },
            limits: Limits::default(),
        }
    }

    #[test]
    fn registry_indexes_both_directions() {
        let mut registry = MarketRegistry::new();
        registry.add(eth_btc());

        assert_eq!(registry.by_id("BTC_ETH").unwrap().symbol, "ETH/BTC");
        assert_eq!(registry.by_symbol("ETH/BTC").unwrap().id, "BTC_ETH");
        assert!(registry.by_id("ETH/BTC").is_none());
    }

    #[test]
    fn replace_discards_previous_contents() {
        let mut registry = MarketRegistry::new();
        registry.add(eth_btc());

        let mut other = eth_btc();
        other.id = "BTC_XMR".into();
        other.symbol = "XMR/BTC".into();
        registry.replace(vec![other]);

        assert_eq!(registry.len(), 1);
        assert!(registry.by_id("BTC_ETH").is_none());
        assert!(registry.by_symbol("XMR/BTC").is_some());
    }
}
