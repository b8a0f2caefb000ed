//--------------------------------------------------------------------------------------------------
// CRATE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A single-symbol, in-memory central limit order book and matching engine: limit, market, and
// stop orders on two sides, price-time priority, stop activation, cancel/amend. See DESIGN.md for
// the grounding ledger behind each module.
//
// | Module         | Component | Responsibility                                             |
// |----------------|-----------|-------------------------------------------------------------|
// | types          | —         | OrderId/Price/Shares aliases, Side/OrderType/TimeInForce     |
// | error          | —         | OrderBookError                                               |
// | order          | C1        | Order construct/execute/amend                                |
// | price_level    | C2        | FIFO queue of orders at one price                            |
// | price_tree     | C3        | AVL tree keyed by price, arena-indexed                       |
// | book           | C4        | OrderBook: four trees + order_by_id, public matching API     |
// | matching       | C5        | market walk, stop activation                                 |
// | config         | —         | CLI/ambient configuration                                    |
//--------------------------------------------------------------------------------------------------

pub mod book;
pub mod config;
pub mod error;
pub mod matching;
pub mod order;
pub mod price_level;
pub mod price_tree;
pub mod types;

pub use book::{OrderBook, SubmitReport};
pub use error::OrderBookError;
pub use order::Order;
pub use price_level::PriceLevel;
pub use price_tree::{EdgeKind, PriceTree};
pub use types::{OrderId, OrderStatus, OrderType, Price, Shares, Side, TimeInForce, TradeEvent};
