//! Auction Bus — In-process Order Fan-out
//!
//! Implements the `OrderFeed` port with one bounded channel per
//! subscriber. The registry lock only guards the subscriber list:
//! `post` snapshots the current senders under the lock and delivers
//! outside it, each delivery bounded by the order's own deadline, so a
//! solver that stops reading can delay its own delivery but not the
//! registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::domain::order::OrderTicket;
use crate::ports::order_feed::{OrderBroadcast, OrderFeed, Unsubscribe};

/// Orders buffered per subscriber. Keeps delivery close to a rendezvous.
const SUBSCRIPTION_CAPACITY: usize = 1;

#[derive(Debug)]
struct Subscriber {
    id: u64,
    tx: mpsc::Sender<OrderBroadcast>,
}

/// Outcome of delivering one order to one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Delivered,
    /// Subscriber dropped its receiver.
    Closed,
    /// Order deadline passed before the subscriber had room.
    TimedOut,
}

/// Fan-out registry of solver subscriptions.
#[derive(Debug, Default)]
pub struct AuctionBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_id: AtomicU64,
}

impl AuctionBus {
    pub fn new() -> Self {
        Self::default()
    }

    async fn deliver(
        id: u64,
        tx: mpsc::Sender<OrderBroadcast>,
        msg: OrderBroadcast,
        deadline: Option<tokio::time::Instant>,
    ) -> Delivery {
        let send = tx.send(msg);
        let sent = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, send).await {
                Ok(sent) => sent,
                Err(_) => {
                    warn!(subscriber = id, "Order delivery cut short by deadline");
                    return Delivery::TimedOut;
                }
            },
            None => send.await,
        };
        if sent.is_ok() {
            Delivery::Delivered
        } else {
            debug!(subscriber = id, "Subscriber channel closed during delivery");
            Delivery::Closed
        }
    }
}

#[async_trait]
impl OrderFeed for AuctionBus {
    fn subscribe(&self) -> (mpsc::Receiver<OrderBroadcast>, Unsubscribe) {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Subscriber { id, tx });
        debug!(subscriber = id, "Subscriber registered");

        let registry = Arc::downgrade(&self.subscribers);
        let unsubscribe = Unsubscribe::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let mut subscribers = registry.lock();
            if let Some(index) = subscribers.iter().position(|s| s.id == id) {
                // Dropping the sender closes the subscriber's channel.
                subscribers.remove(index);
                debug!(subscriber = id, "Subscriber removed");
            }
        });
        (rx, unsubscribe)
    }

    #[instrument(skip(self, ticket), fields(order_id = %ticket.order_id))]
    async fn post(&self, ticket: Arc<OrderTicket>) -> usize {
        let targets: Vec<(u64, mpsc::Sender<OrderBroadcast>)> = {
            let subscribers = self.subscribers.lock();
            subscribers.iter().map(|s| (s.id, s.tx.clone())).collect()
        };
        let deadline = ticket.deadline();

        let deliveries = targets.into_iter().map(|(id, tx)| {
            let msg = OrderBroadcast::new(Arc::clone(&ticket));
            Self::deliver(id, tx, msg, deadline)
        });
        let outcomes = join_all(deliveries).await;

        let delivered = outcomes
            .iter()
            .filter(|d| **d == Delivery::Delivered)
            .count();
        debug!(
            delivered,
            attempted = outcomes.len(),
            "Order fanned out to subscribers"
        );
        delivered
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
