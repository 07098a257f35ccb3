//! Orders and bids.
//!
//! An `Order` is owned by the user that created it. The immutable part
//! solvers need (tokens, timing, where to send bids) lives in an
//! `OrderTicket` shared through an `Arc`; the fill state stays on the
//! order and is mutated exactly once by the acceptance policy.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::error::ValidationError;
use super::ids::{OrderId, SolverId, UserId};
use super::pool::Liquidity;
use super::token::Token;

/// Buffered bids per order before solvers wait on the collector.
pub const BID_CHANNEL_CAPACITY: usize = 64;

/// Read-only view of an order broadcast to solvers.
#[derive(Debug)]
pub struct OrderTicket {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Token offered.
    pub origin: Token,
    /// Token wanted.
    pub target: Token,
    /// When the order was created.
    pub entry_time: Instant,
    /// How long the order stays open; `None` never expires.
    pub timeout: Option<Duration>,
    /// Sending half of the order's bid channel.
    pub(crate) bids: mpsc::Sender<Bid>,
}

impl OrderTicket {
    /// `entry_time + timeout`, or `None` for orders that never expire.
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.and_then(|t| self.entry_time.checked_add(t))
    }

    /// Whether the collection window has already elapsed.
    pub fn is_expired(&self) -> bool {
        self.deadline().is_some_and(|d| Instant::now() >= d)
    }

    pub(crate) fn bid_sender(&self) -> mpsc::Sender<Bid> {
        self.bids.clone()
    }
}

/// A swap order and its settlement state.
#[derive(Debug)]
pub struct Order {
    pub ticket: Arc<OrderTicket>,
    /// Wall-clock creation time, for reporting.
    pub created_at: DateTime<Utc>,
    /// Winning solver, once filled.
    pub solver_id: Option<SolverId>,
    /// When collection for this order ended with a fill.
    pub exit_time: Option<Instant>,
    /// Settlement route, once filled.
    pub bid_path: Vec<Liquidity>,
    pub filled: bool,
    bid_rx: Option<mpsc::Receiver<Bid>>,
}

impl Order {
    /// Create an unfilled order with a fresh bid channel.
    ///
    /// A zero `timeout` means the order never expires.
    ///
    /// # Errors
    /// Propagates `Order::validate` failures.
    pub fn new(
        user_id: UserId,
        origin: Token,
        target: Token,
        timeout: Duration,
    ) -> Result<Self, ValidationError> {
        let (bids, bid_rx) = mpsc::channel(BID_CHANNEL_CAPACITY);
        let ticket = OrderTicket {
            order_id: OrderId::new(),
            user_id,
            origin,
            target,
            entry_time: Instant::now(),
            timeout: (!timeout.is_zero()).then_some(timeout),
            bids,
        };
        let order = Self {
            ticket: Arc::new(ticket),
            created_at: Utc::now(),
            solver_id: None,
            exit_time: None,
            bid_path: Vec::new(),
            filled: false,
            bid_rx: Some(bid_rx),
        };
        order.validate()?;
        Ok(order)
    }

    pub fn id(&self) -> OrderId {
        self.ticket.order_id
    }

    pub fn origin(&self) -> &Token {
        &self.ticket.origin
    }

    pub fn target(&self) -> &Token {
        &self.ticket.target
    }

    /// Hand the receiving half of the bid channel to the collector.
    ///
    /// Returns `None` once taken; an order is collected at most once.
    pub fn take_bid_receiver(&mut self) -> Option<mpsc::Receiver<Bid>> {
        self.bid_rx.take()
    }

    /// Whether bid collection has already run for this order.
    pub const fn is_collected(&self) -> bool {
        self.bid_rx.is_none()
    }

    /// Record the winning route. Exit time is clamped to the deadline.
    pub fn fill(&mut self, solver_id: SolverId, path: Vec<Liquidity>, now: Instant) {
        let exit = self.ticket.deadline().map_or(now, |d| now.min(d));
        self.filled = true;
        self.solver_id = Some(solver_id);
        self.bid_path = path;
        self.exit_time = Some(exit);
    }

    /// Check timing and fill consistency.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(exit) = self.exit_time {
            if exit <= self.ticket.entry_time {
                return Err(ValidationError::ExitBeforeEntry);
            }
            if self.ticket.deadline().is_some_and(|d| exit > d) {
                return Err(ValidationError::ExitAfterTimeout);
            }
        }

        if self.filled {
            let Some(last) = self.bid_path.last() else {
                return Err(ValidationError::FilledWithoutPath);
            };
            if !last.token_b.matches(self.target()) {
                return Err(ValidationError::PathTargetMismatch {
                    got: last.token_b.label(),
                    want: self.target().label(),
                });
            }
            if self.solver_id.is_none() {
                return Err(ValidationError::FilledWithoutSolver);
            }
        } else if !self.bid_path.is_empty() || self.solver_id.is_some() {
            return Err(ValidationError::UnfilledWithFillFields);
        }
        Ok(())
    }
}

/// Why an order's bid window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every subscriber the order reached has answered.
    AllBidsIn,
    /// The order's timeout elapsed first.
    Deadline,
    /// Every sender went away before the expected count was reached.
    ChannelClosed,
}

/// A solver's proposed route for an order. An empty path is a decline.
#[derive(Debug, Clone, Serialize)]
pub struct Bid {
    pub order_id: OrderId,
    pub solver_id: SolverId,
    pub user_id: UserId,
    pub target_token: Token,
    pub amount_used: u64,
    pub path: Vec<Liquidity>,
    pub accepted: bool,
}

impl Bid {
    /// A route proposal delivering the order's full target amount.
    pub fn route(ticket: &OrderTicket, solver_id: SolverId, path: Vec<Liquidity>) -> Self {
        Self {
            order_id: ticket.order_id,
            solver_id,
            user_id: ticket.user_id,
            target_token: ticket.target.clone(),
            amount_used: ticket.target.amount,
            path,
            accepted: false,
        }
    }

    /// "No route" answer.
    pub fn decline(ticket: &OrderTicket, solver_id: SolverId) -> Self {
        Self {
            amount_used: 0,
            ..Self::route(ticket, solver_id, Vec::new())
        }
    }

    pub fn is_decline(&self) -> bool {
        self.path.is_empty()
    }
}
