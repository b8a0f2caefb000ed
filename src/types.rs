//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core vocabulary shared by every other module: order identity, price and
// quantity representations, and the public trade event schema.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ALIASES            | OrderId / Price / Shares representations.                        |
// | ENUMS              | Side, OrderType, TimeInForce, OrderStatus.                        |
// | STRUCTS            | TradeEvent — the public trade schema.                             |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

/// Unique 64-bit order identifier, assigned by the caller at submission time.
pub type OrderId = u64;

/// Signed price in ticks. Limit price for `Limit` orders, trigger price for `Stop` orders,
/// ignored for `Market` orders.
pub type Price = i64;

/// Order/level quantity in shares.
pub type Shares = u64;

/// The side of an order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order.
    Bid,
    /// A sell order.
    Ask,
}

impl Side {
    /// The side an aggressor on this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// The type of an order. Stops are stop-market: when triggered they execute as a market order,
/// and any residual rests as a limit order at the original stop price (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Executes at a specific price or better; rests on the book if unfilled.
    Limit,
    /// Executes immediately at the best available price(s); never rests.
    Market,
    /// Dormant until the opposite side's best price reaches the trigger, then fires as Market.
    Stop,
}

/// Order duration policy. Only `GTC` is enforced by the matching core; `DAY`/`IOC`/`FOK` are
/// accepted and stored but otherwise inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good Till Cancel.
    GTC,
    /// Day order.
    DAY,
    /// Immediate or Cancel.
    IOC,
    /// Fill or Kill.
    FOK,
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::GTC
    }
}

/// Informational lifecycle status, for display only — the matching core decides behavior from
/// `remaining_shares` and map/tree membership, never from this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Accepted, resting with no fills yet.
    Resting,
    /// Dormant, waiting for its stop trigger.
    WaitingTrigger,
    /// Filled for part of its quantity, remainder still resting.
    PartiallyFilled,
    /// Fully filled.
    Filled,
    /// Cancelled before being fully filled.
    Cancelled,
}

/// A single execution resulting from a match: one maker (resting order) against one taker
/// (the aggressor). `timestamp` is an engine-wide logical clock, advanced once per accepted
/// top-level call — distinct from `submission_time`, which governs price-time priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Id of the resting order that was matched against.
    pub maker_order_id: OrderId,
    /// Id of the incoming order that triggered the match.
    pub taker_order_id: OrderId,
    /// Price at which the trade occurred (the maker's price).
    pub price: Price,
    /// Quantity traded.
    pub shares: Shares,
    /// Logical timestamp of the top-level call that produced this trade.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_is_involution() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
        assert_eq!(Side::Bid.opposite().opposite(), Side::Bid);
    }

    #[test]
    fn time_in_force_default_is_gtc() {
        assert_eq!(TimeInForce::default(), TimeInForce::GTC);
    }

    #[test]
    fn trade_event_is_copy() {
        let trade = TradeEvent {
            maker_order_id: 1,
            taker_order_id: 2,
            price: 100,
            shares: 10,
            timestamp: 1,
        };
        let copied = trade;
        assert_eq!(trade, copied);
    }
}
