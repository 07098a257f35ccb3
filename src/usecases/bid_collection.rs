//! Bid Collection - Per-order Bid Window
//!
//! After an order is posted its owner collects bids on the order's bid
//! channel until either every expected bid has arrived or the order's
//! deadline passes, whichever comes first. The wait is multiplexed over
//! the channel and a deadline timer, so there is no polling. When the
//! window ends the channel is closed; later submissions fail at the
//! solver instead of blocking.

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::order::{Bid, CloseReason};

/// Bids gathered during one window.
#[derive(Debug)]
pub struct Collection {
  /// Bids in arrival order, declines included.
  pub bids: Vec<Bid>,
  pub closed_by: CloseReason,
}

/// Collect up to `expected` bids, stopping at `deadline` if one is set.
///
/// The receiver is closed before returning.
pub async fn collect_bids(
  rx: &mut mpsc::Receiver<Bid>,
  expected: usize,
  deadline: Option<Instant>,
) -> Collection {
  let mut bids = Vec::with_capacity(expected);

  let closed_by = loop {
    if bids.len() >= expected {
      break CloseReason::AllBidsIn;
    }
    let next = match deadline {
      Some(deadline) => tokio::select! {
        biased;
        bid = rx.recv() => bid,
        () = tokio::time::sleep_until(deadline) => break CloseReason::Deadline,
      },
      None => rx.recv().await,
    };
    match next {
      Some(bid) => {
        debug!(
          solver_id = %bid.solver_id,
          hops = bid.path.len(),
          "Bid received"
        );
        bids.push(bid);
      }
      None => break CloseReason::ChannelClosed,
    }
  };

  rx.close();
  debug!(
    received = bids.len(),
    expected,
    closed_by = ?closed_by,
    "Bid window closed"
  );
  Collection { bids, closed_by }
}
