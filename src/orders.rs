//! Order cache and lifecycle reconciliation.
//!
//! Some exchanges expose no single "order status" endpoint; the only signal
//! that an order left the book is its absence from the next open-orders
//! listing. [`OrderCache`] keeps every order the process has observed and
//! infers `Open -> Closed` transitions from that absence. Closed and
//! canceled orders are never deleted, so later `fetch_order`/`fetch_orders`
//! calls can still see them.
//!
//! The cache is an explicit struct owned by one client instance. Known
//! limitation, preserved deliberately: orders that closed before this
//! process ever observed them open are invisible — the cache starts empty
//! each session.
//!
//! [`reconcile`](OrderCache::reconcile) treats the listing it is given as
//! the complete set of live orders. A listing scoped to one symbol will
//! therefore close cached open orders on every other symbol; callers that
//! track orders across symbols must reconcile with unscoped listings.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{Order, OrderStatus};

/// Filter applied when reading orders back out of the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderQuery<'a> {
    /// Restrict to one canonical symbol.
    pub symbol: Option<&'a str>,
    /// Only orders with `timestamp >= since` (milliseconds).
    pub since: Option<i64>,
    /// Truncate the result to at most this many orders.
    pub limit: Option<usize>,
    /// Restrict to one lifecycle state.
    pub status: Option<OrderStatus>,
}

/// In-memory table of every order this client instance has seen.
#[derive(Debug, Default)]
pub struct OrderCache {
    orders: HashMap<String, Order>,
}

impl OrderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly created order.
    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    /// Overwrite the cached entry with a fresh server-side view, picking up
    /// rate/amount edits. Entries already in a terminal state are left
    /// untouched: a stale listing must never resurrect a closed or canceled
    /// order.
    pub fn upsert(&mut self, order: Order) {
        match self.orders.get(&order.id) {
            Some(existing) if existing.status.is_terminal() => {}
            _ => {
                self.orders.insert(order.id.clone(), order);
            }
        }
    }

    /// Merge a fresh open-orders listing against the cache.
    ///
    /// Every order in `open_orders` is upserted (their status is expected to
    /// already be forced to `Open` by the normalizer). Every cached order
    /// that is currently `Open` but absent from the listing is transitioned
    /// to `Closed`, with `filled = amount`, `remaining = 0` and
    /// `cost = filled * price` synthesized where not already known.
    ///
    /// The listing is taken as the complete set of live orders: absence
    /// closes regardless of symbol, so a symbol-scoped listing closes open
    /// orders on other symbols too (see the module docs).
    pub fn reconcile(&mut self, open_orders: Vec<Order>) {
        let fresh_ids: HashSet<String> =
            open_orders.iter().map(|order| order.id.clone()).collect();

        for order in open_orders {
            self.upsert(order);
        }

        let mut closed = 0usize;
        for order in self.orders.values_mut() {
            if order.status == OrderStatus::Open && !fresh_ids.contains(&order.id) {
                order.status = OrderStatus::Closed;
                order.filled = order.amount;
                order.remaining = Decimal::ZERO;
                if order.cost.is_zero() {
                    order.cost = order.filled * order.price;
                }
                closed += 1;
            }
        }
        if closed > 0 {
            debug!(closed, "orders absent from open listing marked closed");
        }
    }

    /// Mark an order canceled. Applied optimistically by `cancel_order`
    /// before the exchange confirms, so a second cancel racing the first
    /// (rejected as "cancel pending") cannot leave a stale `Open` entry that
    /// the next reconcile pass would wrongly close.
    pub fn mark_canceled(&mut self, id: &str) {
        if let Some(order) = self.orders.get_mut(id) {
            if !order.status.is_terminal() {
                order.status = OrderStatus::Canceled;
                order.remaining = order.amount - order.filled;
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Read a filtered view of the cache, sorted by timestamp then id.
    #[must_use]
    pub fn select(&self, query: &OrderQuery<'_>) -> Vec<Order> {
        let mut selected: Vec<Order> = self
            .orders
            .values()
            .filter(|order| query.symbol.map_or(true, |s| order.symbol == s))
            .filter(|order| query.since.map_or(true, |t| order.timestamp >= t))
            .filter(|order| query.status.map_or(true, |st| order.status == st))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }
        selected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderType, Side};
    use rust_decimal_macros::dec;

    fn open_order(id: &str, amount: Decimal, price: Decimal) -> Order {
        Order {
            id: id.into(),
            timestamp: 1_540_000_000_000,
            status: OrderStatus::Open,
            symbol: "ETH/BTC".into(),
            order_type: OrderType::Limit,
            side: Side::Buy,
            price,
            amount,
            filled: Decimal::ZERO,
            remaining: amount,
            cost: Decimal::ZERO,
            trades: Vec::new(),
            fee: None,
        }
    }

    #[test]
    fn absent_open_order_closes_with_synthesized_fill() {
        let mut cache = OrderCache::new();
        cache.insert(open_order("1", dec!(10), dec!(2)));

        cache.reconcile(vec![]);

        let order = cache.get("1").unwrap();
        assert_eq!(order.status, OrderStatus::Closed);
        assert_eq!(order.filled, dec!(10));
        assert_eq!(order.remaining, dec!(0));
        assert_eq!(order.cost, dec!(20));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut cache = OrderCache::new();
        cache.insert(open_order("1", dec!(10), dec!(2)));
        cache.insert(open_order("2", dec!(5), dec!(3)));

        let listing = vec![open_order("2", dec!(5), dec!(3))];
        cache.reconcile(listing.clone());
        let first = cache.select(&OrderQuery::default());
        cache.reconcile(listing);
        let second = cache.select(&OrderQuery::default());

        assert_eq!(first, second);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn terminal_status_never_flips() {
        let mut cache = OrderCache::new();
        cache.insert(open_order("1", dec!(10), dec!(2)));
        cache.mark_canceled("1");

        // Even a listing that claims the order is open again must not
        // resurrect it.
        cache.reconcile(vec![open_order("1", dec!(10), dec!(2))]);
        assert_eq!(cache.get("1").unwrap().status, OrderStatus::Canceled);

        cache.reconcile(vec![]);
        assert_eq!(cache.get("1").unwrap().status, OrderStatus::Canceled);
    }

    #[test]
    fn scoped_listing_closes_open_orders_on_other_symbols() {
        let mut cache = OrderCache::new();
        cache.insert(open_order("1", dec!(10), dec!(2)));
        let mut other = open_order("2", dec!(5), dec!(3));
        other.symbol = "XMR/BTC".into();
        cache.insert(other);

        // A listing fetched for ETH/BTC only: the XMR order is absent and
        // gets closed along with everything else not listed.
        cache.reconcile(vec![open_order("1", dec!(10), dec!(2))]);

        assert_eq!(cache.get("1").unwrap().status, OrderStatus::Open);
        assert_eq!(cache.get("2").unwrap().status, OrderStatus::Closed);
    }

    #[test]
    fn upsert_picks_up_server_side_edits() {
        let mut cache = OrderCache::new();
        cache.insert(open_order("1", dec!(10), dec!(2)));

        cache.reconcile(vec![open_order("1", dec!(4), dec!(2.5))]);

        let order = cache.get("1").unwrap();
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.amount, dec!(4));
        assert_eq!(order.price, dec!(2.5));
    }

    #[test]
    fn select_filters_by_symbol_since_status_and_limit() {
        let mut cache = OrderCache::new();
        let mut a = open_order("1", dec!(1), dec!(1));
        a.timestamp = 100;
        let mut b = open_order("2", dec!(1), dec!(1));
        b.timestamp = 200;
        let mut c = open_order("3", dec!(1), dec!(1));
        c.timestamp = 300;
        c.symbol = "XMR/BTC".into();
        cache.insert(a);
        cache.insert(b);
        cache.insert(c);

        let eth = cache.select(&OrderQuery {
            symbol: Some("ETH/BTC"),
            ..Default::default()
        });
        assert_eq!(eth.len(), 2);

        let recent = cache.select(&OrderQuery {
            since: Some(150),
            ..Default::default()
        });
        assert_eq!(recent.len(), 2);

        let limited = cache.select(&OrderQuery {
            limit: Some(1),
            ..Default::default()
        });
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, "1");

        cache.mark_canceled("2");
        let open = cache.select(&OrderQuery {
            status: Some(OrderStatus::Open),
            ..Default::default()
        });
        assert_eq!(open.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), ["1", "3"]);
    }

    #[test]
    fn mark_canceled_restores_remaining_from_fill() {
        let mut cache = OrderCache::new();
        let mut order = open_order("1", dec!(10), dec!(2));
        order.filled = dec!(4);
        cache.insert(order);

        cache.mark_canceled("1");
        let order = cache.get("1").unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(order.remaining, dec!(6));
    }
}
