//! In-process order bus.

pub mod auction_bus;

pub use auction_bus::AuctionBus;
