//! Metrics Adapters
//!
//! Prometheus registry fed from order outcomes. The exposition text is
//! logged at the end of a run and optionally written next to the report.

pub mod prometheus;

pub use self::prometheus::AuctionMetrics;
