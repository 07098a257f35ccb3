//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OrderFeed`: Order fan-out to solvers and single-use bid replies
//! - `OutcomeSink`: Reporting of terminal order outcomes

pub mod order_feed;
pub mod outcome_sink;

pub use order_feed::{BidSlot, OrderBroadcast, OrderFeed, Unsubscribe};
pub use outcome_sink::{OrderOutcome, OutcomeSink};
