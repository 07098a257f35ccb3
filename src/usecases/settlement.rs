//! Settlement Use Case - One Order Through the Auction
//!
//! Drives a single order end to end:
//! 1. Post the order to every subscribed solver
//! 2. Collect bids until all are in or the order times out
//! 3. Apply the acceptance policy
//! 4. Re-validate the order; a failure here is fatal
//!
//! Filled and unfilled orders are both normal outcomes and are reported
//! as such.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{info, instrument};

use crate::domain::error::AuctionError;
use crate::domain::order::Order;
use crate::ports::order_feed::OrderFeed;
use crate::ports::outcome_sink::OrderOutcome;

use super::acceptance::accept_bid;
use super::bid_collection::{collect_bids, Collection};

/// Post, collect, accept and validate a single order.
///
/// # Errors
/// `AuctionError::AlreadyCollected` if the order went through the
/// auction before; `AuctionError::InvariantViolated` if the order is
/// inconsistent after acceptance.
#[instrument(skip(order, feed), fields(order_id = %order.id()))]
pub async fn settle_order<F: OrderFeed + ?Sized>(
  user_name: &str,
  order: &mut Order,
  feed: &F,
) -> Result<OrderOutcome, AuctionError> {
  let order_id = order.id();
  let mut rx = order
    .take_bid_receiver()
    .ok_or(AuctionError::AlreadyCollected { order_id })?;

  info!(
    user = user_name,
    origin = %order.origin().label(),
    target = %order.target().label(),
    "Posting order"
  );
  let started = Instant::now();
  let expected = feed.post(Arc::clone(&order.ticket)).await;

  let Collection { mut bids, closed_by } =
    collect_bids(&mut rx, expected, order.ticket.deadline()).await;
  let report = accept_bid(order, &mut bids);

  order
    .validate()
    .map_err(|source| AuctionError::InvariantViolated { order_id, source })?;

  let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
  let path: Vec<String> = order.bid_path.iter().map(|leg| leg.describe()).collect();

  if order.filled {
    info!(
      solver_id = ?order.solver_id,
      path = %path.join(" -> "),
      latency_ms,
      "Order filled"
    );
  } else {
    info!(
      bids = bids.len(),
      expected,
      closed_by = ?closed_by,
      "Order not filled"
    );
  }

  Ok(OrderOutcome {
    order_id,
    user_id: order.ticket.user_id,
    user_name: user_name.to_string(),
    origin: order.origin().label(),
    target: order.target().label(),
    filled: order.filled,
    solver_id: order.solver_id,
    solver_name: None,
    path,
    expected_bids: expected,
    bids_received: bids.len(),
    declined: report.declined,
    rejected: report.rejected,
    closed_by,
    latency_ms,
    created_at: order.created_at,
  })
}
