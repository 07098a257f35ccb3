//! User Use Case - Order Owner and Driver
//!
//! A user holds token balances (informational only) and the orders it
//! created. Starting a user drives its orders through the auction one
//! at a time, in creation order.

use std::time::Duration;

use tracing::{info, instrument};

use crate::domain::error::{AuctionError, ValidationError};
use crate::domain::ids::{OrderId, UserId};
use crate::domain::order::Order;
use crate::domain::token::Token;
use crate::ports::order_feed::OrderFeed;
use crate::ports::outcome_sink::OrderOutcome;

use super::settlement::settle_order;

/// An order-posting participant.
#[derive(Debug)]
pub struct User {
  pub name: String,
  pub id: UserId,
  pub tokens: Vec<Token>,
  pub orders: Vec<Order>,
}

impl User {
  pub fn new(name: impl Into<String>, tokens: Vec<Token>) -> Self {
    Self {
      name: name.into(),
      id: UserId::new(),
      tokens,
      orders: Vec::new(),
    }
  }

  /// Create an order owned by this user. A zero timeout never expires.
  ///
  /// # Errors
  /// Propagates `Order::validate` failures.
  pub fn create_order(
    &mut self,
    origin: Token,
    target: Token,
    timeout: Duration,
  ) -> Result<OrderId, ValidationError> {
    let order = Order::new(self.id, origin, target, timeout)?;
    let id = order.id();
    self.orders.push(order);
    Ok(id)
  }

  pub fn order(&self, id: OrderId) -> Option<&Order> {
    self.orders.iter().find(|o| o.id() == id)
  }

  /// Run every not-yet-collected order through the auction, in sequence.
  ///
  /// # Errors
  /// Stops at the first order left inconsistent by the acceptance
  /// policy and returns `AuctionError::InvariantViolated`.
  #[instrument(skip_all, fields(user = %self.name))]
  pub async fn start<F: OrderFeed + ?Sized>(
    &mut self,
    feed: &F,
  ) -> Result<Vec<OrderOutcome>, AuctionError> {
    let mut outcomes = Vec::with_capacity(self.orders.len());
    for order in self.orders.iter_mut().filter(|o| !o.is_collected()) {
      outcomes.push(settle_order(&self.name, order, feed).await?);
    }
    info!(
      orders = outcomes.len(),
      filled = outcomes.iter().filter(|o| o.filled).count(),
      "User finished posting orders"
    );
    Ok(outcomes)
  }
}
