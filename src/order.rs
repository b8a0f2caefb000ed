//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The resting-order record (component C1). An `Order` does not hold a back-pointer to its parent
// `PriceLevel` — unlike the pointer-linked original, aggregate upkeep (`total_shares`) is the
// caller's (`PriceLevel`'s) responsibility, since a safe Rust `VecDeque<Order>` element cannot
// hold a live reference back into the container that owns it. `execute`/`amend_quantity` mutate
// only the order's own fields; `PriceLevel` wraps them to keep level aggregates consistent.
//--------------------------------------------------------------------------------------------------

use crate::error::OrderBookError;
use crate::types::{OrderId, OrderStatus, OrderType, Price, Shares, Side, TimeInForce};

/// A single resting or in-flight order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price for `Limit`, trigger price for `Stop`, ignored for `Market`.
    pub price: Price,
    pub remaining_shares: Shares,
    pub original_shares: Shares,
    pub time_in_force: TimeInForce,
    /// Monotonic engine-assigned sequence number; governs FIFO priority within a price level.
    /// Deliberately not a wall-clock timestamp, so replaying the same submission sequence always
    /// produces the same priority ordering.
    pub submission_time: u64,
    pub status: OrderStatus,
}

impl Order {
    /// Constructs a new order. Rejects non-positive share counts and `Limit` orders with a
    /// non-positive price.
    pub fn new(
        id: OrderId,
        side: Side,
        order_type: OrderType,
        price: Price,
        shares: Shares,
        time_in_force: TimeInForce,
        submission_time: u64,
    ) -> Result<Self, OrderBookError> {
        if shares == 0 {
            return Err(OrderBookError::InvalidArgument(
                "order shares must be positive".into(),
            ));
        }
        if matches!(order_type, OrderType::Limit | OrderType::Stop) && price <= 0 {
            return Err(OrderBookError::InvalidArgument(
                "limit/stop orders require a positive price".into(),
            ));
        }
        let status = if order_type == OrderType::Stop {
            OrderStatus::WaitingTrigger
        } else {
            OrderStatus::Resting
        };
        Ok(Order {
            id,
            side,
            order_type,
            price,
            remaining_shares: shares,
            original_shares: shares,
            time_in_force,
            submission_time,
            status,
        })
    }

    /// Decrements `remaining_shares` by `traded` and updates status. Does not touch any parent
    /// level aggregate — the caller (`PriceLevel::execute_head`) does that in the same step.
    pub fn execute(&mut self, traded: Shares) {
        debug_assert!(
            traded > 0 && traded <= self.remaining_shares,
            "execute: traded shares out of range"
        );
        self.remaining_shares -= traded;
        self.status = if self.remaining_shares == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    /// Amends quantity only, preserving price and `submission_time` (and therefore priority).
    /// `new_shares` is the new remaining quantity, not a new original size. Rejects non-positive
    /// quantities.
    pub fn amend_quantity(&mut self, new_shares: Shares) -> Result<(), OrderBookError> {
        if new_shares == 0 {
            return Err(OrderBookError::InvalidArgument(
                "amended shares must be positive".into(),
            ));
        }
        self.remaining_shares = new_shares;
        self.status = if new_shares < self.original_shares {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Resting
        };
        Ok(())
    }

    /// Amends price (and, optionally, quantity), resetting `submission_time` so the order loses
    /// its place in the FIFO and re-queues at the tail of its (possibly new) price level.
    pub fn amend_price(
        &mut self,
        new_price: Price,
        new_shares: Shares,
        new_submission_time: u64,
    ) -> Result<(), OrderBookError> {
        if new_shares == 0 {
            return Err(OrderBookError::InvalidArgument(
                "amended shares must be positive".into(),
            ));
        }
        if matches!(self.order_type, OrderType::Limit | OrderType::Stop) && new_price <= 0 {
            return Err(OrderBookError::InvalidArgument(
                "limit/stop orders require a positive price".into(),
            ));
        }
        self.price = new_price;
        self.remaining_shares = new_shares;
        self.original_shares = new_shares;
        self.submission_time = new_submission_time;
        self.status = OrderStatus::Resting;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order(shares: Shares) -> Order {
        Order::new(1, Side::Bid, OrderType::Limit, 100, shares, TimeInForce::GTC, 0).unwrap()
    }

    #[test]
    fn new_rejects_zero_shares() {
        let err = Order::new(1, Side::Bid, OrderType::Limit, 100, 0, TimeInForce::GTC, 0);
        assert!(matches!(err, Err(OrderBookError::InvalidArgument(_))));
    }

    #[test]
    fn new_rejects_nonpositive_price_for_limit() {
        let err = Order::new(1, Side::Bid, OrderType::Limit, 0, 10, TimeInForce::GTC, 0);
        assert!(matches!(err, Err(OrderBookError::InvalidArgument(_))));
    }

    #[test]
    fn new_allows_zero_price_for_market() {
        let order = Order::new(1, Side::Bid, OrderType::Market, 0, 10, TimeInForce::GTC, 0).unwrap();
        assert_eq!(order.price, 0);
    }

    #[test]
    fn stop_order_starts_waiting_trigger() {
        let order = Order::new(1, Side::Bid, OrderType::Stop, 90, 10, TimeInForce::GTC, 0).unwrap();
        assert_eq!(order.status, OrderStatus::WaitingTrigger);
    }

    #[test]
    fn execute_partial_then_full() {
        let mut order = make_order(10);
        order.execute(4);
        assert_eq!(order.remaining_shares, 6);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        order.execute(6);
        assert_eq!(order.remaining_shares, 0);
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn amend_quantity_preserves_submission_time() {
        let mut order = make_order(10);
        order.submission_time = 42;
        order.amend_quantity(20).unwrap();
        assert_eq!(order.submission_time, 42);
        assert_eq!(order.remaining_shares, 20);
    }

    #[test]
    fn amend_quantity_sets_remaining_directly_on_partially_filled_order() {
        let mut order = make_order(10);
        order.execute(7);
        assert_eq!(order.remaining_shares, 3);
        order.amend_quantity(2).unwrap();
        assert_eq!(order.remaining_shares, 2, "new_shares is the new remaining quantity, not a new original size");
        assert_eq!(order.original_shares, 10, "amend_quantity never touches original_shares");
    }

    #[test]
    fn amend_quantity_rejects_zero() {
        let mut order = make_order(10);
        let err = order.amend_quantity(0);
        assert!(matches!(err, Err(OrderBookError::InvalidArgument(_))));
    }

    #[test]
    fn amend_price_resets_submission_time() {
        let mut order = make_order(10);
        order.submission_time = 42;
        order.amend_price(105, 10, 99).unwrap();
        assert_eq!(order.submission_time, 99);
        assert_eq!(order.price, 105);
        assert_eq!(order.status, OrderStatus::Resting);
    }
}
