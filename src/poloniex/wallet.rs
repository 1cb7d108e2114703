//! Wallet-balance aggregation.
//!
//! `fetch_wallet_balance` combines three independent sources — available
//! balances by wallet type, complete balances exposing per-asset on-order
//! amounts, and open + active lending offers — into one asset → wallet type
//! → {available, on_orders, total} view.
//!
//! The sources arrive in arbitrary order, so totals are derived in a single
//! pass in [`WalletAccumulator::finish`] after all accumulation; computing
//! them incrementally would bake in partial sums. Entries are created
//! lazily on first reference; the asset universe is never pre-populated.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{WalletBalances, WalletEntry, WalletType};

use super::parser::{decimal_field, value_as_decimal};

#[derive(Debug, Default, Clone, Copy)]
struct Accumulated {
    available: Decimal,
    on_orders: Decimal,
}

/// Intermediate accumulation state for one wallet-balance aggregation pass.
#[derive(Debug, Default)]
pub struct WalletAccumulator {
    entries: BTreeMap<String, BTreeMap<WalletType, Accumulated>>,
}

impl WalletAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, asset: &str, wallet: WalletType) -> &mut Accumulated {
        self.entries
            .entry(asset.to_string())
            .or_default()
            .entry(wallet)
            .or_default()
    }

    pub fn add_available(&mut self, asset: &str, wallet: WalletType, amount: Decimal) {
        self.entry(asset, wallet).available += amount;
    }

    pub fn add_on_orders(&mut self, asset: &str, wallet: WalletType, amount: Decimal) {
        self.entry(asset, wallet).on_orders += amount;
    }

    /// Ingest a `returnAvailableAccountBalances` response:
    /// `{wallet type -> {asset -> amount}}`.
    pub fn accumulate_available(&mut self, data: &Value) {
        let Some(wallets) = data.as_object() else {
            return;
        };
        for (wallet_name, assets) in wallets {
            let Some(wallet) = WalletType::parse(wallet_name) else {
                continue;
            };
            let Some(assets) = assets.as_object() else {
                continue;
            };
            for (asset, amount) in assets {
                if let Some(amount) = value_as_decimal(amount) {
                    self.add_available(asset, wallet, amount);
                }
            }
        }
    }

    /// Ingest a `returnCompleteBalances` (account=all) response:
    /// `{asset -> {available, onOrders, btcValue}}`. The on-order amounts
    /// are locked by open orders.
    ///
    /// The response carries no per-wallet breakdown, so every on-order
    /// amount is attributed to the exchange wallet; margin-locked amounts
    /// are not separable from this source.
    pub fn accumulate_on_orders(&mut self, data: &Value) {
        let Some(assets) = data.as_object() else {
            return;
        };
        for (asset, fields) in assets {
            if let Some(on_orders) = decimal_field(fields, "onOrders") {
                if !on_orders.is_zero() {
                    self.add_on_orders(asset, WalletType::Exchange, on_orders);
                }
            }
        }
    }

    /// Ingest a `returnOpenLoanOffers` response:
    /// `{asset -> [{amount, ...}]}`. Offered amounts are locked in the
    /// lending wallet until filled or canceled.
    pub fn accumulate_loan_offers(&mut self, data: &Value) {
        let Some(assets) = data.as_object() else {
            return;
        };
        for (asset, offers) in assets {
            let Some(offers) = offers.as_array() else {
                continue;
            };
            for offer in offers {
                if let Some(amount) = decimal_field(offer, "amount") {
                    self.add_on_orders(asset, WalletType::Lending, amount);
                }
            }
        }
    }

    /// Ingest the `provided` half of a `returnActiveLoans` response:
    /// loans currently lent out are locked in the lending wallet.
    pub fn accumulate_active_loans(&mut self, data: &Value) {
        let Some(provided) = data.get("provided").and_then(Value::as_array) else {
            return;
        };
        for loan in provided {
            let Some(asset) = loan.get("currency").and_then(Value::as_str) else {
                continue;
            };
            if let Some(amount) = decimal_field(loan, "amount") {
                self.add_on_orders(asset, WalletType::Lending, amount);
            }
        }
    }

    /// Derive `total = available + on_orders` for every entry and produce
    /// the final view. Run exactly once, after all sources are accumulated.
    #[must_use]
    pub fn finish(self) -> WalletBalances {
        let mut balances = WalletBalances::new();
        for (asset, wallets) in self.entries {
            for (wallet, acc) in wallets {
                balances.insert(
                    asset.clone(),
                    wallet,
                    WalletEntry::new(acc.available, acc.on_orders),
                );
            }
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn totals_are_derived_after_accumulation() {
        let mut acc = WalletAccumulator::new();
        acc.add_on_orders("BTC", WalletType::Exchange, dec!(0.5));
        acc.add_available("BTC", WalletType::Exchange, dec!(1.0));

        let balances = acc.finish();
        let entry = balances.get("BTC", WalletType::Exchange).unwrap();
        assert_eq!(entry.available(), dec!(1.0));
        assert_eq!(entry.on_orders(), dec!(0.5));
        assert_eq!(entry.total(), dec!(1.5));
    }

    #[test]
    fn entries_are_created_lazily() {
        let mut acc = WalletAccumulator::new();
        acc.accumulate_loan_offers(&json!({
            "BTC": [{"id": 1, "rate": "0.0002", "amount": "3", "duration": 2}],
        }));
        let balances = acc.finish();
        assert_eq!(balances.len(), 1);
        assert!(balances.get("BTC", WalletType::Lending).is_some());
        assert!(balances.get("BTC", WalletType::Exchange).is_none());
        assert!(balances.get("ETH", WalletType::Lending).is_none());
    }

    #[test]
    fn loan_offers_and_active_loans_both_lock_lending_funds() {
        let mut acc = WalletAccumulator::new();
        acc.accumulate_loan_offers(&json!({
            "BTC": [
                {"id": 1, "rate": "0.0002", "amount": "3", "duration": 2},
                {"id": 2, "rate": "0.0003", "amount": "1", "duration": 2},
            ],
        }));
        acc.accumulate_active_loans(&json!({
            "provided": [{"id": 3, "currency": "BTC", "rate": "0.0001", "amount": "2"}],
            "used": [{"id": 4, "currency": "BTC", "rate": "0.0009", "amount": "9"}],
        }));
        let balances = acc.finish();
        let lending = balances.get("BTC", WalletType::Lending).unwrap();
        // 3 + 1 offered, 2 provided; `used` loans are borrowed, not locked.
        assert_eq!(lending.on_orders(), dec!(6));
    }

    #[test]
    fn available_balances_span_wallet_types() {
        let mut acc = WalletAccumulator::new();
        acc.accumulate_available(&json!({
            "exchange": {"BTC": "1.0", "ETH": "10"},
            "lending": {"BTC": "2.0"},
            "unknown_wallet": {"BTC": "99"},
        }));
        let balances = acc.finish();
        assert_eq!(
            balances.get("BTC", WalletType::Exchange).unwrap().available(),
            dec!(1.0)
        );
        assert_eq!(
            balances.get("BTC", WalletType::Lending).unwrap().available(),
            dec!(2.0)
        );
        assert_eq!(
            balances.get("ETH", WalletType::Exchange).unwrap().available(),
            dec!(10)
        );
        // Unrecognized wallet types are skipped, not misattributed.
        assert_eq!(
            balances.get("BTC", WalletType::Exchange).unwrap().available(),
            dec!(1.0)
        );
    }

    #[test]
    fn complete_balances_lock_exchange_funds() {
        let mut acc = WalletAccumulator::new();
        acc.accumulate_on_orders(&json!({
            "BTC": {"available": "1.0", "onOrders": "0.5", "btcValue": "1.5"},
            "ETH": {"available": "10", "onOrders": "0.0", "btcValue": "0.5"},
        }));
        let balances = acc.finish();
        assert_eq!(
            balances.get("BTC", WalletType::Exchange).unwrap().on_orders(),
            dec!(0.5)
        );
        // The source has no per-wallet breakdown; nothing lands in margin.
        assert!(balances.get("BTC", WalletType::Margin).is_none());
        // Zero on-order amounts do not create entries.
        assert!(balances.get("ETH", WalletType::Exchange).is_none());
    }
}
