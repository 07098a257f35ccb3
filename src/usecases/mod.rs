//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! auction's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `AuctionEngine`: Runs solvers and users over an order feed
//! - `Solver`: Per-solver bidding task
//! - `User`: Order owner, posts its orders one at a time
//! - `Settlement`: One order through post, collection and acceptance
//! - `BidCollection`: Deadline-bounded bid window
//! - `Acceptance`: Bid validation and selection

pub mod acceptance;
pub mod auction_engine;
pub mod bid_collection;
pub mod settlement;
pub mod solver;
pub mod user;

pub use acceptance::{accept_bid, AcceptanceReport};
pub use auction_engine::{AuctionEngine, RunSummary, Scenario};
pub use bid_collection::{collect_bids, Collection};
pub use settlement::settle_order;
pub use solver::Solver;
pub use user::User;
