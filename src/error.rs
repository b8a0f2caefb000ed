//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A single flat error type for the whole book/matching surface, mirroring the flat error-kind
// list in the system's error handling design (InvalidArgument / DuplicateOrder / UnknownOrder).
// `InvariantViolation` is not a variant here: it is fatal and unrecoverable, so it is raised as a
// `debug_assert!` panic in debug builds rather than threaded through `Result`.
//--------------------------------------------------------------------------------------------------

use crate::types::OrderId;
use thiserror::Error;

/// Errors returned by `OrderBook`'s public operations.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum OrderBookError {
    /// A caller-supplied argument violates a precondition (non-positive shares, a `Limit`
    /// order with no price, an `amend` to zero or negative shares, etc).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `submit_*` was called with an order id already present on the book.
    #[error("duplicate order id: {0}")]
    DuplicateOrder(OrderId),

    /// `cancel`/`amend` referenced an order id not present on the book.
    #[error("unknown order id: {0}")]
    UnknownOrder(OrderId),
}
