//! Prometheus Metrics Registry - Auction Observability
//!
//! Counts posted, filled and unfilled orders, bids by kind, rejected
//! bids, and tracks bid-collection latency and the number of running
//! solvers. Fed from order outcomes; rendered as text exposition at the
//! end of a run.

use async_trait::async_trait;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::{debug, instrument};

use crate::ports::outcome_sink::{OrderOutcome, OutcomeSink};

/// Centralized Prometheus metrics for one auction run.
///
/// Every metric is registered under the configured namespace, e.g.
/// `intent_auction_orders_filled_total`.
pub struct AuctionMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Orders posted to the bus.
    pub orders_posted: IntCounter,
    /// Orders that ended with an accepted route.
    pub orders_filled: IntCounter,
    /// Orders that ended without a route.
    pub orders_unfilled: IntCounter,
    /// Bids collected, labelled `kind` = `route` | `decline`.
    pub bids_received: IntCounterVec,
    /// Route bids discarded by acceptance validation.
    pub bids_rejected: IntCounter,
    /// Time from posting an order to the end of its bid window (ms).
    pub collection_latency_ms: Histogram,
    /// Solvers currently subscribed.
    pub active_solvers: IntGauge,
}

impl AuctionMetrics {
    /// Create and register all metrics under `namespace`.
    pub fn new(namespace: &str) -> anyhow::Result<Self> {
        let registry = Registry::new();
        let opts = |name: &str, help: &str| Opts::new(name, help).namespace(namespace);

        let orders_posted =
            IntCounter::with_opts(opts("orders_posted_total", "Total orders posted"))?;
        let orders_filled =
            IntCounter::with_opts(opts("orders_filled_total", "Total orders filled"))?;
        let orders_unfilled = IntCounter::with_opts(opts(
            "orders_unfilled_total",
            "Total orders closed without a route",
        ))?;
        let bids_received = IntCounterVec::new(
            opts("bids_received_total", "Total bids collected"),
            &["kind"],
        )?;
        let bids_rejected = IntCounter::with_opts(opts(
            "bids_rejected_total",
            "Route bids discarded as invalid",
        ))?;
        let collection_latency_ms = Histogram::with_opts(
            HistogramOpts::new(
                "collection_latency_ms",
                "Order post to bid window close in milliseconds",
            )
            .namespace(namespace)
            .buckets(vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]),
        )?;
        let active_solvers =
            IntGauge::with_opts(opts("active_solvers", "Solvers subscribed to the bus"))?;

        registry.register(Box::new(orders_posted.clone()))?;
        registry.register(Box::new(orders_filled.clone()))?;
        registry.register(Box::new(orders_unfilled.clone()))?;
        registry.register(Box::new(bids_received.clone()))?;
        registry.register(Box::new(bids_rejected.clone()))?;
        registry.register(Box::new(collection_latency_ms.clone()))?;
        registry.register(Box::new(active_solvers.clone()))?;

        Ok(Self {
            registry,
            orders_posted,
            orders_filled,
            orders_unfilled,
            bids_received,
            bids_rejected,
            collection_latency_ms,
            active_solvers,
        })
    }

    /// Fold one order outcome into the counters.
    #[allow(clippy::cast_precision_loss)]
    pub fn observe(&self, outcome: &OrderOutcome) {
        self.orders_posted.inc();
        if outcome.filled {
            self.orders_filled.inc();
        } else {
            self.orders_unfilled.inc();
        }
        self.bids_received
            .with_label_values(&["route"])
            .inc_by(outcome.routes_received() as u64);
        self.bids_received
            .with_label_values(&["decline"])
            .inc_by(outcome.declined as u64);
        self.bids_rejected.inc_by(outcome.rejected as u64);
        self.collection_latency_ms.observe(outcome.latency_ms as f64);
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[async_trait]
impl OutcomeSink for AuctionMetrics {
    async fn record(&self, outcome: &OrderOutcome) -> anyhow::Result<()> {
        self.observe(outcome);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn finish(&self) -> anyhow::Result<()> {
        debug!(metrics = %self.render()?, "Auction metrics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrderId, UserId};
    use crate::domain::order::CloseReason;

    fn outcome(filled: bool, bids: usize, declined: usize, rejected: usize) -> OrderOutcome {
        OrderOutcome {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            user_name: "alice".to_string(),
            origin: "USDC@ethereum".to_string(),
            target: "ETH@ethereum".to_string(),
            filled,
            solver_id: None,
            solver_name: None,
            path: Vec::new(),
            expected_bids: bids,
            bids_received: bids,
            declined,
            rejected,
            closed_by: CloseReason::AllBidsIn,
            latency_ms: 3,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_observe_counts_outcomes() {
        let metrics = AuctionMetrics::new("test").unwrap();
        metrics.observe(&outcome(true, 3, 1, 1));
        metrics.observe(&outcome(false, 2, 2, 0));

        assert_eq!(metrics.orders_posted.get(), 2);
        assert_eq!(metrics.orders_filled.get(), 1);
        assert_eq!(metrics.orders_unfilled.get(), 1);
        assert_eq!(metrics.bids_received.with_label_values(&["route"]).get(), 2);
        assert_eq!(metrics.bids_received.with_label_values(&["decline"]).get(), 3);
        assert_eq!(metrics.bids_rejected.get(), 1);
        assert_eq!(metrics.collection_latency_ms.get_sample_count(), 2);
    }

    #[test]
    fn test_render_uses_namespace() {
        let metrics = AuctionMetrics::new("intent_auction").unwrap();
        metrics.active_solvers.set(2);
        let text = metrics.render().unwrap();
        assert!(text.contains("intent_auction_active_solvers 2"));
        assert!(text.contains("intent_auction_orders_posted_total 0"));
    }
}
