//! Domain validation and auction protocol errors.
//!
//! `ValidationError` is returned by the `validate` methods on tokens,
//! pools, liquidity positions and orders when an invariant does not
//! hold. Configuration builders treat every variant as fatal; the
//! acceptance policy treats a failing bid leg as a reason to discard
//! that bid only.
//!
//! `AuctionError` covers the bid protocol at runtime.

use thiserror::Error;

use super::ids::OrderId;

/// Errors raised when a domain invariant is violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A ticker was seen with a different USD price than its first occurrence.
    #[error("token {ticker} has invalid value: got {got}, want {want}")]
    PriceMismatch {
        /// Ticker whose price disagrees.
        ticker: String,
        /// Price carried by the offending token.
        got: u64,
        /// Price fixed by the first occurrence.
        want: u64,
    },

    /// Both sides of a pool are the same asset instance.
    #[error("invalid pool pairing: both tokens are {ticker}")]
    SameAssetPool {
        /// Ticker present on both sides.
        ticker: String,
    },

    /// A pool token lives on a different domain than the pool.
    #[error("invalid pool: token {ticker} in incorrect domain: got {got}, want {want}")]
    TokenOutsidePoolDomain {
        /// Offending token ticker.
        ticker: String,
        /// Domain of the token.
        got: String,
        /// Domain of the pool.
        want: String,
    },

    /// Stored volume ratio no longer equals `amountA / amountB`.
    #[error("invalid pool: volume ratio mismatch: got {got}, want {want}")]
    VolumeRatioMismatch {
        /// Ratio recomputed from the current amounts.
        got: f64,
        /// Ratio stored on the pool.
        want: f64,
    },

    /// Stored price ratio no longer equals `valueA / valueB`.
    #[error("invalid pool: price ratio mismatch: got {got}, want {want}")]
    PriceRatioMismatch {
        /// Ratio recomputed from the current prices.
        got: f64,
        /// Ratio stored on the pool.
        want: f64,
    },

    /// The two sides of a position are not worth the same in USD.
    #[error("invalid position: pair not of equal value: got {value_a} and {value_b}")]
    UnequalPositionValue {
        /// USD notional of side A.
        value_a: u128,
        /// USD notional of side B.
        value_b: u128,
    },

    /// A position side does not match the pool's corresponding token.
    #[error("invalid position: token {side} not the same as pool's: got {got}, want {want}")]
    PositionTokenMismatch {
        /// `A` or `B`.
        side: char,
        /// Ticker on the position.
        got: String,
        /// Ticker on the pool.
        want: String,
    },

    /// A position holds more of a token than its pool.
    #[error("invalid position: token {ticker} exceeds pool volume: got {got}, pool has {pool}")]
    PositionExceedsPoolVolume {
        /// Offending token ticker.
        ticker: String,
        /// Position amount.
        got: u64,
        /// Pool amount.
        pool: u64,
    },

    /// A position prices a token above its pool.
    #[error("invalid position: token {ticker} exceeds pool value: got {got}, pool has {pool}")]
    PositionExceedsPoolValue {
        /// Offending token ticker.
        ticker: String,
        /// Position price.
        got: u64,
        /// Pool price.
        pool: u64,
    },

    /// Exit time is not strictly after entry time.
    #[error("invalid order: exit time is not after entry time")]
    ExitBeforeEntry,

    /// Exit time lies beyond `entry + timeout`.
    #[error("invalid order: exit time is after the timeout period has elapsed")]
    ExitAfterTimeout,

    /// Order is marked filled without a settlement path.
    #[error("invalid order: filled but no solved path found")]
    FilledWithoutPath,

    /// Final leg of the path does not deliver the target token.
    #[error("invalid order: final token of solved path mismatch: got {got}, want {want}")]
    PathTargetMismatch {
        /// Final token of the path, `ticker@domain`.
        got: String,
        /// Order target, `ticker@domain`.
        want: String,
    },

    /// Order is marked filled without a solver.
    #[error("invalid order: filled order has no solver")]
    FilledWithoutSolver,

    /// Fill fields are present on an order not marked filled.
    #[error("invalid order: fill fields present but order not marked filled")]
    UnfilledWithFillFields,
}

/// Errors raised while running the auction.
#[derive(Error, Debug)]
pub enum AuctionError {
    /// The collector closed the order's bid window before the bid arrived.
    #[error("bid window for order {order_id} is closed")]
    BidWindowClosed {
        /// Order the late bid was for.
        order_id: OrderId,
    },

    /// An order failed validation after the acceptance policy ran.
    #[error("order {order_id} is inconsistent after acceptance: {source}")]
    InvariantViolated {
        /// Order that failed validation.
        order_id: OrderId,
        /// Violated invariant.
        #[source]
        source: ValidationError,
    },

    /// The order's bid channel was already handed to a collector.
    #[error("order {order_id} has already been collected")]
    AlreadyCollected {
        /// Order collected twice.
        order_id: OrderId,
    },
}
