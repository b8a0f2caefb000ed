//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Component C5: the matching algorithms (market walk, stop activation). Stateless over C4 —
// these are free functions taking `&mut OrderBook` rather than a separate engine struct, since
// there is no additional state to own beyond the book itself.
//
// `market_walk` serves both the bounded aggressive phase of `submit_limit` (via `price_limit:
// Some(_)`) and the unbounded walk of `submit_market`/triggered stops (`price_limit: None`) — one
// loop, one place the maker/taker share decrement happens, so it cannot be done asymmetrically
// (design note #4: a draft that decremented only the maker's shares before relinking a
// stop-triggered order as a limit is the bug this structure makes impossible).
//--------------------------------------------------------------------------------------------------

use crate::book::{BookKind, OrderBook};
use crate::types::{OrderId, OrderType, Price, Shares, Side, TradeEvent};

/// Walks the book opposite `side`, consuming FIFO heads level by level until `shares` is
/// exhausted, the opposite side runs dry, or (when `price_limit` is `Some`) the next level no
/// longer crosses. Returns whatever `shares` could not be matched.
pub(crate) fn market_walk(
    book: &mut OrderBook,
    side: Side,
    mut shares: Shares,
    price_limit: Option<Price>,
    timestamp: u64,
    taker_order_id: OrderId,
    trades: &mut Vec<TradeEvent>,
) -> Shares {
    let opposite = side.opposite();
    loop {
        if shares == 0 {
            break;
        }

        let outcome = {
            let tree = book.tree_mut(opposite, BookKind::Limit);
            let Some(edge_price) = tree.edge_price() else { break };

            if let Some(limit) = price_limit {
                let crosses = match side {
                    Side::Bid => edge_price <= limit,
                    Side::Ask => edge_price >= limit,
                };
                if !crosses {
                    break;
                }
            }

            let level = tree.get_mut(edge_price).expect("edge price must be present in its own tree");
            let head_remaining = level
                .peek_head()
                .expect("a non-empty level sits at the edge")
                .remaining_shares;
            let traded = shares.min(head_remaining);
            let (maker_id, fully_filled) = level.execute_head(traded).expect("level has a head");

            if level.is_empty() {
                tree.remove(edge_price);
            }

            (maker_id, traded, edge_price, fully_filled)
        };

        let (maker_id, traded, edge_price, fully_filled) = outcome;
        shares -= traded;
        trades.push(TradeEvent {
            maker_order_id: maker_id,
            taker_order_id,
            price: edge_price,
            shares: traded,
            timestamp,
        });
        if fully_filled {
            book.forget_order(maker_id);
        }
    }
    shares
}

/// Scans the stop book on `side` (the side whose stop orders are dormant bids or asks), firing
/// every stop whose trigger condition currently holds against the opposite side's best price.
/// Each fired stop is reinjected through `market_walk` as a true market order; any residual
/// becomes a resting limit order at the stop's original (trigger) price. Terminates because each
/// iteration either removes an order from the stop book or drains liquidity from the opposite
/// side, both bounded.
pub(crate) fn activate_stops(book: &mut OrderBook, side: Side, timestamp: u64, trades: &mut Vec<TradeEvent>) {
    loop {
        let Some(stop_price) = book.tree(side, BookKind::Stop).edge_price() else { break };
        let Some(opp_price) = book.tree(side.opposite(), BookKind::Limit).edge_price() else { break };

        let fires = match side {
            Side::Bid => stop_price <= opp_price,
            Side::Ask => stop_price >= opp_price,
        };
        if !fires {
            break;
        }

        let mut head = {
            let tree = book.tree_mut(side, BookKind::Stop);
            let level = tree.get_mut(stop_price).expect("edge price must be present in its own tree");
            let head_id = level.peek_head().expect("a non-empty level sits at the edge").id;
            let head = level.unlink(head_id).expect("head order must be present");
            if level.is_empty() {
                tree.remove(stop_price);
            }
            head
        };
        book.forget_order(head.id);

        let remaining = market_walk(book, head.side, head.remaining_shares, None, timestamp, head.id, trades);
        if remaining > 0 {
            head.order_type = OrderType::Limit;
            head.remaining_shares = remaining;
            head.original_shares = remaining;
            head.submission_time = book.next_submission_time();
            book.insert_resting(head, BookKind::Limit);
        }
    }
}
