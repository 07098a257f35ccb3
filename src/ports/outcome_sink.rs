//! Outcome Sink Port - Order Outcome Reporting Interface
//!
//! Defines where terminal order outcomes go once the auction is done
//! with them (structured logs, JSONL files, metrics). Filled and
//! unfilled orders are both ordinary outcomes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{OrderId, SolverId, UserId};
use crate::domain::order::CloseReason;

/// Terminal state of one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOutcome {
  /// Order identifier.
  pub order_id: OrderId,
  /// Owning user.
  pub user_id: UserId,
  /// Owning user's name.
  pub user_name: String,
  /// Origin token, `ticker@domain`.
  pub origin: String,
  /// Target token, `ticker@domain`.
  pub target: String,
  /// Whether a bid was accepted.
  pub filled: bool,
  /// Winning solver.
  pub solver_id: Option<SolverId>,
  /// Winning solver's name, resolved by the runner.
  pub solver_name: Option<String>,
  /// Accepted route, one `[A@d -> B@d]` entry per leg.
  pub path: Vec<String>,
  /// Subscribers the order reached.
  pub expected_bids: usize,
  /// Bids that arrived before the window closed, declines included.
  pub bids_received: usize,
  /// Declines among the received bids.
  pub declined: usize,
  /// Bids discarded for failing leg validation.
  pub rejected: usize,
  /// What ended the bid window.
  pub closed_by: CloseReason,
  /// Post to acceptance, in milliseconds.
  pub latency_ms: u64,
  /// Wall-clock creation time of the order.
  pub created_at: DateTime<Utc>,
}

impl OrderOutcome {
  /// Bids that carried a route.
  pub const fn routes_received(&self) -> usize {
    self.bids_received.saturating_sub(self.declined)
  }
}

/// Trait for outcome consumers.
#[async_trait]
pub trait OutcomeSink: Send + Sync + 'static {
  /// Record one terminal order outcome.
  async fn record(&self, outcome: &OrderOutcome) -> anyhow::Result<()>;

  /// Flush anything buffered at the end of a run.
  async fn finish(&self) -> anyhow::Result<()>;
}
