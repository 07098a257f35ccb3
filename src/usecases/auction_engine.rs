//! Auction Engine - Scenario Orchestration
//!
//! Runs one auction session over a prepared scenario:
//! 1. Start every solver on the order feed
//! 2. Let subscriptions settle
//! 3. Drive every user concurrently (each user's orders in sequence)
//! 4. Stop the solvers and hand outcomes to the configured sinks
//!
//! A post-acceptance invariant violation aborts the remaining drivers
//! and fails the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::domain::ids::SolverId;
use crate::ports::order_feed::OrderFeed;
use crate::ports::outcome_sink::{OrderOutcome, OutcomeSink};

use super::solver::Solver;
use super::user::User;

/// Entities taking part in one run.
#[derive(Debug, Default)]
pub struct Scenario {
  pub users: Vec<User>,
  pub solvers: Vec<Solver>,
}

impl Scenario {
  /// Total orders across all users.
  pub fn order_count(&self) -> usize {
    self.users.iter().map(|u| u.orders.len()).sum()
  }
}

/// Aggregated result of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
  /// Outcomes ordered by order creation time.
  pub outcomes: Vec<OrderOutcome>,
  pub filled: usize,
  pub unfilled: usize,
}

impl From<Vec<OrderOutcome>> for RunSummary {
  fn from(mut outcomes: Vec<OrderOutcome>) -> Self {
    outcomes.sort_by_key(|o| o.created_at);
    let filled = outcomes.iter().filter(|o| o.filled).count();
    Self {
      unfilled: outcomes.len() - filled,
      filled,
      outcomes,
    }
  }
}

/// Orchestrates solvers and users over an order feed.
pub struct AuctionEngine<F: OrderFeed> {
  /// Order fan-out bus.
  feed: Arc<F>,
  /// Outcome consumers, fed after the run.
  sinks: Vec<Arc<dyn OutcomeSink>>,
  /// Pause between starting solvers and posting the first order.
  settle_delay: Duration,
}

impl<F: OrderFeed> AuctionEngine<F> {
  /// Create an engine over the given feed.
  pub fn new(feed: Arc<F>, settle_delay: Duration) -> Self {
    Self {
      feed,
      sinks: Vec::new(),
      settle_delay,
    }
  }

  /// Register an outcome sink.
  #[must_use]
  pub fn with_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
    self.sinks.push(sink);
    self
  }

  /// Run the scenario to completion.
  ///
  /// # Errors
  /// Fails if a user driver hits a post-acceptance invariant violation,
  /// if a driver task panics, or if a sink fails.
  #[instrument(skip_all, name = "auction_run")]
  pub async fn run(&self, scenario: Scenario) -> Result<RunSummary> {
    let Scenario { users, mut solvers } = scenario;

    for solver in &mut solvers {
      solver.start(self.feed.as_ref());
    }
    info!(
      solvers = solvers.len(),
      users = users.len(),
      "Auction started"
    );
    if !self.settle_delay.is_zero() {
      tokio::time::sleep(self.settle_delay).await;
    }

    let mut drivers = JoinSet::new();
    for mut user in users {
      let feed = Arc::clone(&self.feed);
      drivers.spawn(async move {
        let result = user.start(feed.as_ref()).await;
        (user.name, result)
      });
    }

    let mut outcomes = Vec::new();
    let mut fatal: Option<anyhow::Error> = None;
    while let Some(joined) = drivers.join_next().await {
      match joined {
        Ok((_, Ok(user_outcomes))) => outcomes.extend(user_outcomes),
        Ok((name, Err(e))) => {
          error!(user = %name, error = %e, "Fatal auction error, halting run");
          drivers.abort_all();
          fatal.get_or_insert(anyhow::Error::new(e).context(format!("user {name}")));
        }
        Err(e) if e.is_cancelled() => warn!("User driver aborted"),
        Err(e) => {
          drivers.abort_all();
          fatal.get_or_insert(anyhow!("user driver panicked: {e}"));
        }
      }
    }

    for solver in &mut solvers {
      solver.stop().await;
    }
    if let Some(e) = fatal {
      return Err(e);
    }

    let names: HashMap<SolverId, &str> =
      solvers.iter().map(|s| (s.id, s.name.as_str())).collect();
    for outcome in &mut outcomes {
      outcome.solver_name = outcome
        .solver_id
        .and_then(|id| names.get(&id))
        .map(|name| (*name).to_string());
    }

    let summary = RunSummary::from(outcomes);
    for sink in &self.sinks {
      for outcome in &summary.outcomes {
        sink.record(outcome).await.context("Failed to record outcome")?;
      }
      sink.finish().await.context("Failed to flush outcome sink")?;
    }

    info!(
      orders = summary.outcomes.len(),
      filled = summary.filled,
      unfilled = summary.unfilled,
      "Auction finished"
    );
    Ok(summary)
  }
}
