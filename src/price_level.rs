//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A single price level's FIFO queue (component C2). The original's intrusive doubly-linked list
// (`headOrder`/`tailOrder`/`previousOrder`/`nextOrder`) is replaced by an owning `VecDeque<Order>`
// — the level is the sole owner of every order it holds, eliminating the class of bug where two
// structures both believe they own (and may free) the same order.
//--------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use crate::order::Order;
use crate::types::{OrderId, Price, Shares};

/// All resting orders at one price, in arrival (FIFO) order.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Price,
    orders: VecDeque<Order>,
    total_shares: Shares,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        PriceLevel {
            price,
            orders: VecDeque::new(),
            total_shares: 0,
        }
    }

    /// Appends an order to the tail of the queue, becoming the lowest-priority order at this
    /// level.
    pub fn append(&mut self, order: Order) {
        self.total_shares += order.remaining_shares;
        self.orders.push_back(order);
    }

    /// Removes and returns the order with the given id, wherever it sits in the queue (used by
    /// `cancel`/`amend`, which can target any order, not just the head).
    pub fn unlink(&mut self, order_id: OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == order_id)?;
        let order = self.orders.remove(pos)?;
        self.total_shares -= order.remaining_shares;
        Some(order)
    }

    /// The order at the front of the queue — the next to trade at this level.
    pub fn peek_head(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Executes `traded` shares against the head order in one step, keeping the order's own
    /// `remaining_shares` and this level's `total_shares` aggregate atomically in sync. Returns
    /// the head order's id and whether it was fully filled (and so should be popped off).
    pub fn execute_head(&mut self, traded: Shares) -> Option<(OrderId, bool)> {
        let order = self.orders.front_mut()?;
        order.execute(traded);
        self.total_shares -= traded;
        let fully_filled = order.remaining_shares == 0;
        let id = order.id;
        if fully_filled {
            self.orders.pop_front();
        }
        Some((id, fully_filled))
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn total_shares(&self) -> Shares {
        self.total_shares
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Recomputes `total_shares` from the live orders. Used only by debug-mode invariant checks.
    pub fn recomputed_total_shares(&self) -> Shares {
        self.orders.iter().map(|o| o.remaining_shares).sum()
    }

    /// Amends the quantity of the order with the given id in place, without moving it in the
    /// queue, keeping `total_shares` in sync with the delta. Used for the quantity-down-only
    /// amend path, which is the one case that preserves FIFO priority.
    pub fn amend_quantity_in_place(
        &mut self,
        order_id: OrderId,
        new_shares: Shares,
    ) -> Result<(), crate::error::OrderBookError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .expect("order present per order_by_id");
        let before = order.remaining_shares;
        order.amend_quantity(new_shares)?;
        let after = order.remaining_shares;
        self.total_shares = self.total_shares - before + after;
        Ok(())
    }
}
