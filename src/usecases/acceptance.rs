//! Acceptance Policy - Choosing the Winning Bid
//!
//! Declines are dropped, as is any bid with a leg that fails
//! `Liquidity::validate` (logged, not fatal). Survivors are ordered by
//! hop count with a stable sort, so ties go to the earliest arrival.
//! The first survivor fills the order. With no survivor the order stays
//! unfilled for good.

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::order::{Bid, Order};

/// What the policy did with a set of bids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceReport {
  /// Index of the accepted bid, if any.
  pub winner: Option<usize>,
  /// Bids carrying no route.
  pub declined: usize,
  /// Bids discarded because a leg failed validation.
  pub rejected: usize,
}

/// Apply the acceptance policy to `bids` and finalize `order` on a fill.
pub fn accept_bid(order: &mut Order, bids: &mut [Bid]) -> AcceptanceReport {
  let mut report = AcceptanceReport::default();
  let mut candidates: Vec<usize> = Vec::with_capacity(bids.len());

  for (index, bid) in bids.iter().enumerate() {
    if bid.is_decline() {
      report.declined += 1;
      continue;
    }
    if let Some((leg, err)) = bid
      .path
      .iter()
      .enumerate()
      .find_map(|(i, leg)| leg.validate().err().map(|e| (i, e)))
    {
      warn!(
        order_id = %order.id(),
        solver_id = %bid.solver_id,
        leg,
        error = %err,
        "Invalid pool in bid path, bid discarded"
      );
      report.rejected += 1;
      continue;
    }
    candidates.push(index);
  }

  candidates.sort_by_key(|&i| bids[i].path.len());
  let Some(&winner) = candidates.first() else {
    debug!(order_id = %order.id(), "No viable bid");
    return report;
  };

  let chosen = &mut bids[winner];
  chosen.accepted = true;
  order.fill(chosen.solver_id, chosen.path.clone(), Instant::now());
  report.winner = Some(winner);

  info!(
    order_id = %order.id(),
    solver_id = %chosen.solver_id,
    hops = chosen.path.len(),
    candidates = candidates.len(),
    "Bid accepted"
  );
  report
}
