//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// `OrderBook` (component C4): owns the four price trees (bid-limit, ask-limit, stop-bid, stop-ask)
// plus the `order_by_id` side index, and exposes the public matching API of §6. Matching
// algorithms themselves (market walk, stop activation) live in `matching.rs` (component C5),
// which is written as free functions operating on `&mut OrderBook` — C5 is stateless over C4, so
// there is no separate engine struct duplicating the book's state.
//
// | Operation      | Aggressive phase | Residual phase        | Stop activation scanned |
// |----------------|-------------------|------------------------|--------------------------|
// | submit_limit   | bounded by price  | rest at `price`        | opposite side only       |
// | submit_market  | unbounded         | none (dropped)         | both sides               |
// | submit_stop    | unbounded, if fired now | rest as stop, or as limit residual | both sides |
// | cancel         | —                 | —                       | —                        |
// | amend          | delegates above, or in-place if quantity-down-only at same price | | matches delegate |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::OrderBookError;
use crate::matching;
use crate::order::Order;
use crate::price_level::PriceLevel;
use crate::price_tree::{EdgeKind, PriceTree};
use crate::types::{OrderId, OrderStatus, OrderType, Price, Shares, Side, TimeInForce, TradeEvent};

/// Which of an order's two possible books it rests in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BookKind {
    Limit,
    Stop,
}

#[derive(Debug, Clone, Copy)]
struct OrderLocation {
    side: Side,
    kind: BookKind,
    price: Price,
}

/// Result of a submit/amend call: the trades produced, plus whatever quantity survived the
/// aggressive/market-walk phase untraded. For `submit_limit`/`submit_stop` this is the quantity
/// that ended up resting on the book (0 only if the order matched in full); for `submit_market` it
/// is genuinely dropped, since a market order never rests. Callers that want to detect "order
/// placed but some/all of it did not trade" should check `remaining_shares > 0` together with
/// which `submit_*` call produced the report, not `remaining_shares` alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReport {
    pub trades: Vec<TradeEvent>,
    pub remaining_shares: Shares,
}

pub struct OrderBook {
    pub(crate) bid_tree: PriceTree<PriceLevel>,
    pub(crate) ask_tree: PriceTree<PriceLevel>,
    pub(crate) stop_bid_tree: PriceTree<PriceLevel>,
    pub(crate) stop_ask_tree: PriceTree<PriceLevel>,
    pub(crate) order_by_id: HashMap<OrderId, OrderLocation>,
    submission_seq: u64,
    timestamp_seq: u64,
    synthetic_id_seq: u64,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            bid_tree: PriceTree::new(EdgeKind::Max),
            ask_tree: PriceTree::new(EdgeKind::Min),
            stop_bid_tree: PriceTree::new(EdgeKind::Min),
            stop_ask_tree: PriceTree::new(EdgeKind::Max),
            order_by_id: HashMap::new(),
            submission_seq: 0,
            timestamp_seq: 0,
            synthetic_id_seq: u64::MAX,
        }
    }

    // -- public read API -------------------------------------------------------------------------

    pub fn best_bid(&self) -> Option<Price> {
        self.bid_tree.edge_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.ask_tree.edge_price()
    }

    pub fn lowest_stop_bid(&self) -> Option<Price> {
        self.stop_bid_tree.edge_price()
    }

    pub fn highest_stop_ask(&self) -> Option<Price> {
        self.stop_ask_tree.edge_price()
    }

    pub fn depth_at(&self, side: Side, price: Price) -> Option<(usize, Shares)> {
        self.tree(side, BookKind::Limit)
            .get(price)
            .map(|level| (level.order_count(), level.total_shares()))
    }

    pub fn stop_depth_at(&self, side: Side, price: Price) -> Option<(usize, Shares)> {
        self.tree(side, BookKind::Stop)
            .get(price)
            .map(|level| (level.order_count(), level.total_shares()))
    }

    // -- public mutating API -----------------------------------------------------------------------

    /// Aggressive phase bounded by `price`, then residual rests at `price` on `side`, then stop
    /// activation on the opposite side.
    pub fn submit_limit(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        shares: Shares,
    ) -> Result<SubmitReport, OrderBookError> {
        self.check_new_order(id, shares, Some(price))?;

        let timestamp = self.next_timestamp();
        let mut trades = Vec::new();
        let remaining = matching::market_walk(self, side, shares, Some(price), timestamp, id, &mut trades);
        debug!(order_id = id, traded = trades.len(), "submit_limit matched");

        if remaining > 0 {
            let submission_time = self.next_submission_time();
            let order = Order::new(id, side, OrderType::Limit, price, remaining, TimeInForce::GTC, submission_time)?;
            self.insert_resting(order, BookKind::Limit);
        }

        matching::activate_stops(self, side.opposite(), timestamp, &mut trades);
        self.debug_check_invariants();
        Ok(SubmitReport { trades, remaining_shares: remaining })
    }

    /// Unbounded market walk, then stop activation on both sides.
    pub fn submit_market(&mut self, side: Side, shares: Shares) -> Result<SubmitReport, OrderBookError> {
        if shares == 0 {
            return Err(OrderBookError::InvalidArgument("order shares must be positive".into()));
        }

        let timestamp = self.next_timestamp();
        let mut trades = Vec::new();
        let taker_id = self.next_synthetic_id();
        let remaining = matching::market_walk(self, side, shares, None, timestamp, taker_id, &mut trades);
        if remaining > 0 {
            warn!(remaining, "market order drained the book with shares unfilled");
        }

        matching::activate_stops(self, Side::Bid, timestamp, &mut trades);
        matching::activate_stops(self, Side::Ask, timestamp, &mut trades);
        self.debug_check_invariants();
        Ok(SubmitReport { trades, remaining_shares: remaining })
    }

    /// Fires immediately as a market order if the trigger condition already holds, otherwise
    /// rests dormant in the stop book.
    pub fn submit_stop(
        &mut self,
        id: OrderId,
        side: Side,
        stop_price: Price,
        shares: Shares,
    ) -> Result<SubmitReport, OrderBookError> {
        self.check_new_order(id, shares, Some(stop_price))?;

        let timestamp = self.next_timestamp();
        let mut trades = Vec::new();
        let fires_now = self.stop_triggers(side, stop_price);

        let remaining = if fires_now {
            let remaining = matching::market_walk(self, side, shares, None, timestamp, id, &mut trades);
            if remaining > 0 {
                let submission_time = self.next_submission_time();
                let mut order = Order::new(id, side, OrderType::Stop, stop_price, remaining, TimeInForce::GTC, submission_time)?;
                order.order_type = OrderType::Limit;
                order.status = OrderStatus::Resting;
                self.insert_resting(order, BookKind::Limit);
            }
            remaining
        } else {
            let submission_time = self.next_submission_time();
            let order = Order::new(id, side, OrderType::Stop, stop_price, shares, TimeInForce::GTC, submission_time)?;
            self.insert_resting(order, BookKind::Stop);
            shares
        };

        matching::activate_stops(self, Side::Bid, timestamp, &mut trades);
        matching::activate_stops(self, Side::Ask, timestamp, &mut trades);
        self.debug_check_invariants();
        Ok(SubmitReport { trades, remaining_shares: remaining })
    }

    /// Unlinks the order from its level (deleting the level if it empties) and removes it from
    /// `order_by_id`. Fails with `UnknownOrder` if `id` is absent.
    pub fn cancel(&mut self, id: OrderId) -> Result<(), OrderBookError> {
        self.remove_order(id)?;
        self.debug_check_invariants();
        Ok(())
    }

    /// Quantity-down-only at the same price preserves FIFO priority (in-place amend). Any price
    /// change or quantity increase is a cancel-and-reinsert with `submission_time` reset, routed
    /// through `submit_limit`/`submit_stop` so it may execute immediately.
    pub fn amend(
        &mut self,
        id: OrderId,
        new_shares: Shares,
        new_price: Price,
    ) -> Result<SubmitReport, OrderBookError> {
        if new_shares == 0 {
            return Err(OrderBookError::InvalidArgument("amended shares must be positive".into()));
        }
        let location = *self.order_by_id.get(&id).ok_or(OrderBookError::UnknownOrder(id))?;

        if new_price == location.price {
            let current_remaining = self
                .tree(location.side, location.kind)
                .get(location.price)
                .and_then(|level| level.iter().find(|o| o.id == id))
                .map(|o| o.remaining_shares)
                .ok_or(OrderBookError::UnknownOrder(id))?;

            if new_shares <= current_remaining {
                let tree = self.tree_mut(location.side, location.kind);
                let level = tree.get_mut(location.price).expect("level present per order_by_id index");
                level.amend_quantity_in_place(id, new_shares)?;
                self.debug_check_invariants();
                return Ok(SubmitReport { trades: Vec::new(), remaining_shares: new_shares });
            }
        }

        let old = self.remove_order(id)?;
        match old.order_type {
            OrderType::Stop => self.submit_stop(id, old.side, new_price, new_shares),
            _ => self.submit_limit(id, old.side, new_price, new_shares),
        }
    }

    // -- crate-internal helpers used by matching.rs ---------------------------------------------

    pub(crate) fn tree(&self, side: Side, kind: BookKind) -> &PriceTree<PriceLevel> {
        match (side, kind) {
            (Side::Bid, BookKind::Limit) => &self.bid_tree,
            (Side::Ask, BookKind::Limit) => &self.ask_tree,
            (Side::Bid, BookKind::Stop) => &self.stop_bid_tree,
            (Side::Ask, BookKind::Stop) => &self.stop_ask_tree,
        }
    }

    pub(crate) fn tree_mut(&mut self, side: Side, kind: BookKind) -> &mut PriceTree<PriceLevel> {
        match (side, kind) {
            (Side::Bid, BookKind::Limit) => &mut self.bid_tree,
            (Side::Ask, BookKind::Limit) => &mut self.ask_tree,
            (Side::Bid, BookKind::Stop) => &mut self.stop_bid_tree,
            (Side::Ask, BookKind::Stop) => &mut self.stop_ask_tree,
        }
    }

    pub(crate) fn forget_order(&mut self, id: OrderId) {
        self.order_by_id.remove(&id);
    }

    pub(crate) fn stop_triggers(&self, side: Side, stop_price: Price) -> bool {
        match side {
            Side::Bid => self.ask_tree.edge_price().is_some_and(|ap| ap <= stop_price),
            Side::Ask => self.bid_tree.edge_price().is_some_and(|bp| bp >= stop_price),
        }
    }

    pub(crate) fn insert_resting(&mut self, order: Order, kind: BookKind) {
        let id = order.id;
        let side = order.side;
        let price = order.price;
        let tree = self.tree_mut(side, kind);
        if !tree.contains(price) {
            tree.insert(price, PriceLevel::new(price));
        }
        let level = tree.get_mut(price).expect("just inserted or already present");
        level.append(order);
        self.order_by_id.insert(id, OrderLocation { side, kind, price });
    }

    pub(crate) fn next_timestamp(&mut self) -> u64 {
        self.timestamp_seq += 1;
        self.timestamp_seq
    }

    pub(crate) fn next_submission_time(&mut self) -> u64 {
        self.submission_seq += 1;
        self.submission_seq
    }

    fn next_synthetic_id(&mut self) -> OrderId {
        let id = self.synthetic_id_seq;
        self.synthetic_id_seq -= 1;
        id
    }

    fn check_new_order(&self, id: OrderId, shares: Shares, price: Option<Price>) -> Result<(), OrderBookError> {
        if self.order_by_id.contains_key(&id) {
            return Err(OrderBookError::DuplicateOrder(id));
        }
        if shares == 0 {
            return Err(OrderBookError::InvalidArgument("order shares must be positive".into()));
        }
        if let Some(price) = price {
            if price <= 0 {
                return Err(OrderBookError::InvalidArgument("price must be positive".into()));
            }
        }
        Ok(())
    }

    fn remove_order(&mut self, id: OrderId) -> Result<Order, OrderBookError> {
        let location = *self.order_by_id.get(&id).ok_or(OrderBookError::UnknownOrder(id))?;
        let tree = self.tree_mut(location.side, location.kind);
        let level = tree.get_mut(location.price).expect("level present per order_by_id index");
        let order = level.unlink(id).expect("order present per order_by_id index");
        if level.is_empty() {
            tree.remove(location.price);
        }
        self.forget_order(id);
        Ok(order)
    }

    // -- invariant checking (asserted in debug builds after every public call) -------------------

    #[cfg(debug_assertions)]
    pub fn debug_check_invariants(&self) {
        self.bid_tree.check_invariants().expect("bid tree invariant violated");
        self.ask_tree.check_invariants().expect("ask tree invariant violated");
        self.stop_bid_tree.check_invariants().expect("stop-bid tree invariant violated");
        self.stop_ask_tree.check_invariants().expect("stop-ask tree invariant violated");

        let trees = [&self.bid_tree, &self.ask_tree, &self.stop_bid_tree, &self.stop_ask_tree];
        let mut ids_in_trees = std::collections::HashSet::new();
        for tree in trees {
            for (_, level) in tree.iter_in_order() {
                assert_eq!(
                    level.total_shares(),
                    level.recomputed_total_shares(),
                    "level aggregate mismatch at price {}",
                    level.price
                );
                let mut last_time = None;
                for order in level.iter() {
                    if let Some(last_time) = last_time {
                        assert!(
                            order.submission_time >= last_time,
                            "FIFO monotonicity violated at price {}",
                            level.price
                        );
                    }
                    last_time = Some(order.submission_time);
                    ids_in_trees.insert(order.id);
                }
            }
        }

        let ids_in_map: std::collections::HashSet<_> = self.order_by_id.keys().copied().collect();
        assert_eq!(ids_in_trees, ids_in_map, "order_by_id / FIFO membership mismatch");

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "crossed book: best_bid {} >= best_ask {}", bid, ask);
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn debug_check_invariants(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_resting_limit() {
        let mut book = OrderBook::new();
        let report = book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        assert!(report.trades.is_empty());
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 10)));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn scenario_s2_full_cross() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        let report = book.submit_limit(2, Side::Ask, 100, 10).unwrap();
        assert_eq!(report.trades.len(), 1);
        let trade = report.trades[0];
        assert_eq!((trade.maker_order_id, trade.taker_order_id, trade.price, trade.shares), (1, 2, 100, 10));
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn scenario_s3_partial_cross_and_rest() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        let report = book.submit_limit(2, Side::Ask, 100, 4).unwrap();
        assert_eq!(report.trades.len(), 1);
        let trade = report.trades[0];
        assert_eq!((trade.maker_order_id, trade.taker_order_id, trade.price, trade.shares), (1, 2, 100, 4));
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 6)));
        assert!(book.cancel(2).is_err());
    }

    #[test]
    fn scenario_s4_multi_level_walk() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Ask, 101, 5).unwrap();
        book.submit_limit(2, Side::Ask, 102, 5).unwrap();
        let report = book.submit_market(Side::Bid, 7).unwrap();
        assert_eq!(report.trades.len(), 2);
        assert_eq!((report.trades[0].maker_order_id, report.trades[0].price, report.trades[0].shares), (1, 101, 5));
        assert_eq!((report.trades[1].maker_order_id, report.trades[1].price, report.trades[1].shares), (2, 102, 2));
        assert_eq!(book.best_ask(), Some(102));
        assert_eq!(book.depth_at(Side::Ask, 102), Some((1, 3)));
    }

    #[test]
    fn scenario_s5_stop_fires_immediately() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Ask, 100, 10).unwrap();
        let report = book.submit_stop(2, Side::Bid, 101, 5).unwrap();
        assert_eq!(report.trades.len(), 1);
        let trade = report.trades[0];
        assert_eq!((trade.maker_order_id, trade.taker_order_id, trade.price, trade.shares), (1, 2, 100, 5));
    }

    #[test]
    fn scenario_s6_cancel_in_fifo() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 5).unwrap();
        book.submit_limit(2, Side::Bid, 100, 5).unwrap();
        book.cancel(1).unwrap();
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 5)));
        let report = book.submit_limit(3, Side::Ask, 100, 5).unwrap();
        assert_eq!(report.trades[0].maker_order_id, 2);
    }

    #[test]
    fn duplicate_order_id_is_rejected() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 5).unwrap();
        let err = book.submit_limit(1, Side::Bid, 101, 3);
        assert!(matches!(err, Err(OrderBookError::DuplicateOrder(1))));
    }

    #[test]
    fn cancel_unknown_order_fails() {
        let mut book = OrderBook::new();
        let err = book.cancel(999);
        assert!(matches!(err, Err(OrderBookError::UnknownOrder(999))));
    }

    #[test]
    fn amend_quantity_down_preserves_priority() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        book.submit_limit(2, Side::Bid, 100, 5).unwrap();
        book.amend(1, 3, 100).unwrap();
        assert_eq!(book.depth_at(Side::Bid, 100), Some((2, 8)));
        let report = book.submit_limit(3, Side::Ask, 100, 3).unwrap();
        assert_eq!(report.trades[0].maker_order_id, 1, "order 1 must keep head-of-queue priority");
    }

    #[test]
    fn amend_quantity_on_partially_filled_order_uses_remaining_not_original() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        book.submit_limit(2, Side::Ask, 100, 4).unwrap();
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 6)));

        // A no-op amend keeping the current remaining quantity must not touch it.
        book.amend(1, 6, 100).unwrap();
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 6)));

        // A legal quantity-down amend must succeed, not be rejected against traded quantity.
        book.amend(1, 3, 100).unwrap();
        assert_eq!(book.depth_at(Side::Bid, 100), Some((1, 3)));
    }

    #[test]
    fn amend_price_change_loses_priority_and_can_cross() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Ask, 100, 10).unwrap();
        let report = book.amend(1, 10, 99).unwrap();
        assert_eq!(report.trades.len(), 0);
        assert_eq!(book.best_ask(), Some(99));
    }

    #[test]
    fn round_trip_submit_then_cancel_restores_empty_book() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Bid, 100, 10).unwrap();
        book.cancel(1).unwrap();
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.depth_at(Side::Bid, 100), None);
    }

    #[test]
    fn stop_order_rests_when_not_triggered() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Ask, 100, 10).unwrap();
        let report = book.submit_stop(2, Side::Bid, 90, 5).unwrap();
        assert!(report.trades.is_empty());
        assert_eq!(book.lowest_stop_bid(), Some(90));
    }

    #[test]
    fn stop_residual_rests_as_limit_after_partial_trigger() {
        let mut book = OrderBook::new();
        book.submit_limit(1, Side::Ask, 100, 3).unwrap();
        let report = book.submit_stop(2, Side::Bid, 101, 10).unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.remaining_shares, 7);
        assert_eq!(book.best_bid(), Some(101));
        assert_eq!(book.depth_at(Side::Bid, 101), Some((1, 7)));
    }
}
