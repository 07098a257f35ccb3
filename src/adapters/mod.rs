//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `bus`: In-process order fan-out to subscribed solvers
//! - `metrics`: Prometheus counters fed from order outcomes
//! - `report`: JSONL outcome log and metrics dump

pub mod bus;
pub mod metrics;
pub mod report;
