//! Order Feed Port - Order Fan-out Interface
//!
//! Defines how orders reach solvers and how solvers answer. A feed
//! broadcasts each posted order to every current subscriber; every
//! delivery carries its own single-use `BidSlot` for the reply.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::error::AuctionError;
use crate::domain::ids::OrderId;
use crate::domain::order::{Bid, OrderTicket};

/// One order as delivered to one subscriber.
#[derive(Debug)]
pub struct OrderBroadcast {
  /// Shared, read-only view of the order.
  pub ticket: Arc<OrderTicket>,
  /// Where this subscriber sends its single reply.
  pub slot: BidSlot,
}

impl OrderBroadcast {
  /// Pair a ticket with a fresh reply slot.
  pub fn new(ticket: Arc<OrderTicket>) -> Self {
    let slot = BidSlot::for_ticket(&ticket);
    Self { ticket, slot }
  }
}

/// Single-use reply handle for one order delivery.
///
/// `submit` consumes the slot, so a subscriber answers each delivery at
/// most once. Once the collector has closed the order's bid window the
/// submission fails instead of blocking.
#[derive(Debug)]
pub struct BidSlot {
  order_id: OrderId,
  tx: mpsc::Sender<Bid>,
}

impl BidSlot {
  pub(crate) fn for_ticket(ticket: &OrderTicket) -> Self {
    Self {
      order_id: ticket.order_id,
      tx: ticket.bid_sender(),
    }
  }

  /// Order this slot answers.
  pub const fn order_id(&self) -> OrderId {
    self.order_id
  }

  /// Send the bid (or decline) for this delivery.
  ///
  /// # Errors
  /// Returns `AuctionError::BidWindowClosed` if collection has ended.
  pub async fn submit(self, bid: Bid) -> Result<(), AuctionError> {
    self
      .tx
      .send(bid)
      .await
      .map_err(|_| AuctionError::BidWindowClosed {
        order_id: self.order_id,
      })
  }

  /// Whether the collector has already closed the window.
  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }
}

/// Removes a subscription from its feed when called.
pub struct Unsubscribe(Box<dyn FnOnce() + Send + Sync>);

impl Unsubscribe {
  pub fn new(f: impl FnOnce() + Send + Sync + 'static) -> Self {
    Self(Box::new(f))
  }

  /// Deregister and close the subscription channel.
  pub fn unsubscribe(self) {
    (self.0)();
  }
}

impl std::fmt::Debug for Unsubscribe {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Unsubscribe")
  }
}

/// Trait for order fan-out buses.
///
/// Implementors deliver every posted order to every subscriber that is
/// registered when `post` is called.
#[async_trait]
pub trait OrderFeed: Send + Sync + 'static {
  /// Register a new subscriber.
  ///
  /// Returns the receiving end of its order channel and the handle that
  /// removes it again. The channel ends once the subscriber is removed.
  fn subscribe(&self) -> (mpsc::Receiver<OrderBroadcast>, Unsubscribe);

  /// Deliver an order to all current subscribers.
  ///
  /// Returns once every subscriber has received it, or once the order's
  /// deadline cuts a stalled delivery short. The result is the number of
  /// subscribers the order reached, i.e. how many bids to expect.
  async fn post(&self, ticket: Arc<OrderTicket>) -> usize;

  /// Number of currently registered subscribers.
  fn subscriber_count(&self) -> usize;
}
