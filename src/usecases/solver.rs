//! Solver Use Case - Route Bidding Worker
//!
//! A solver owns a private set of liquidity positions. Once started it
//! subscribes to the order feed and runs a dedicated task that answers
//! every delivered order with exactly one bid: a route through its
//! positions, or a decline. Stopping a solver unsubscribes it; the task
//! drains whatever was already delivered and exits when its channel
//! closes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::domain::ids::SolverId;
use crate::domain::order::{Bid, OrderTicket};
use crate::domain::pool::Liquidity;
use crate::domain::routing::find_route;
use crate::ports::order_feed::{OrderBroadcast, OrderFeed, Unsubscribe};

/// Live subscription of a started solver.
#[derive(Debug)]
struct Running {
  unsubscribe: Unsubscribe,
  task: JoinHandle<()>,
}

/// A bidder with its own liquidity inventory.
#[derive(Debug)]
pub struct Solver {
  pub name: String,
  pub id: SolverId,
  /// Positions forming this solver's routing graph.
  pub positions: Arc<[Liquidity]>,
  running: Option<Running>,
}

impl Solver {
  /// Create a stopped solver with a fresh id.
  pub fn new(name: impl Into<String>, positions: Vec<Liquidity>) -> Self {
    Self {
      name: name.into(),
      id: SolverId::new(),
      positions: positions.into(),
      running: None,
    }
  }

  /// Compute this solver's answer to an order.
  pub fn bid_for(&self, ticket: &OrderTicket) -> Bid {
    compute_bid(self.id, &self.positions, ticket)
  }

  /// Subscribe to the feed and spawn the bidding task.
  ///
  /// Must be called from within a tokio runtime. Starting a running
  /// solver is a no-op.
  pub fn start<F: OrderFeed + ?Sized>(&mut self, feed: &F) {
    if self.running.is_some() {
      warn!(solver = %self.name, "Solver already running");
      return;
    }
    let (orders, unsubscribe) = feed.subscribe();
    let task = tokio::spawn(run_worker(
      self.name.clone(),
      self.id,
      Arc::clone(&self.positions),
      orders,
    ));
    self.running = Some(Running { unsubscribe, task });
    info!(
      solver = %self.name,
      solver_id = %self.id,
      positions = self.positions.len(),
      "Solver started"
    );
  }

  /// Unsubscribe and wait for the bidding task to drain.
  pub async fn stop(&mut self) {
    let Some(Running { unsubscribe, task }) = self.running.take() else {
      return;
    };
    unsubscribe.unsubscribe();
    if let Err(e) = task.await {
      warn!(solver = %self.name, error = %e, "Solver task ended abnormally");
    }
  }

  pub const fn is_running(&self) -> bool {
    self.running.is_some()
  }
}

/// Route the order through `positions`, or decline.
pub fn compute_bid(solver_id: SolverId, positions: &[Liquidity], ticket: &OrderTicket) -> Bid {
  match find_route(&ticket.origin, &ticket.target, positions) {
    Some(path) => Bid::route(ticket, solver_id, path),
    None => Bid::decline(ticket, solver_id),
  }
}

#[instrument(skip_all, fields(solver = %name, solver_id = %solver_id))]
async fn run_worker(
  name: String,
  solver_id: SolverId,
  positions: Arc<[Liquidity]>,
  mut orders: mpsc::Receiver<OrderBroadcast>,
) {
  while let Some(OrderBroadcast { ticket, slot }) = orders.recv().await {
    let bid = compute_bid(solver_id, &positions, &ticket);
    let hops = bid.path.len();
    match slot.submit(bid).await {
      Ok(()) if hops == 0 => debug!(order_id = %ticket.order_id, "Declined order"),
      Ok(()) => debug!(order_id = %ticket.order_id, hops, "Bid submitted"),
      Err(e) => warn!(error = %e, "Bid not delivered"),
    }
  }
  debug!("Order subscription closed, solver task exiting");
}
