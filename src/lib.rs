//! Intent Auction — Library Root
//!
//! Cross-domain swap intents settled by a sealed-bid auction among
//! solvers. Re-exports all modules for the binary, integration tests
//! and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
