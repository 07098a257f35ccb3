//! Report Adapters
//!
//! File-backed outcome reporting: JSONL order outcomes and the metrics
//! exposition for a run.

pub mod outcome_log;

pub use outcome_log::OutcomeLog;
