//! Integration Tests - End-to-end Auction Flow
//!
//! Tests the interaction between users, solvers, the order bus and the
//! engine. Uses mockall for port mocking and tokio::test for async tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use mockall::mock;
use tokio::sync::mpsc;

use intent_auction::adapters::bus::AuctionBus;
use intent_auction::domain::error::{AuctionError, ValidationError};
use intent_auction::domain::ids::SolverId;
use intent_auction::domain::order::{Bid, CloseReason, OrderTicket};
use intent_auction::ports::order_feed::{OrderBroadcast, OrderFeed, Unsubscribe};
use intent_auction::ports::outcome_sink::{OrderOutcome, OutcomeSink};
use intent_auction::usecases::{settle_order, AuctionEngine, Scenario, Solver, User};

use common::{dai, domains, eth, position, usdc};

// ---- Mock Definitions ----

mock! {
    pub Feed {}

    #[async_trait::async_trait]
    impl OrderFeed for Feed {
        fn subscribe(&self) -> (mpsc::Receiver<OrderBroadcast>, Unsubscribe);
        async fn post(&self, ticket: Arc<OrderTicket>) -> usize;
        fn subscriber_count(&self) -> usize;
    }
}

mock! {
    pub Sink {}

    #[async_trait::async_trait]
    impl OutcomeSink for Sink {
        async fn record(&self, outcome: &OrderOutcome) -> anyhow::Result<()>;
        async fn finish(&self) -> anyhow::Result<()>;
    }
}

fn no_settle() -> Duration {
    Duration::ZERO
}

// ---- Bid Window Termination ----

#[tokio::test]
async fn test_silent_solver_window_ends_at_deadline() {
    let (d1, _) = domains();
    let mut feed = MockFeed::new();
    // Claims one subscriber that never answers.
    feed.expect_post().times(1).returning(|_| 1);

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_millis(100))
        .unwrap();

    let started = tokio::time::Instant::now();
    let outcome = settle_order("alice", &mut user.orders[0], &feed)
        .await
        .unwrap();

    assert!(!outcome.filled);
    assert_eq!(outcome.closed_by, CloseReason::Deadline);
    assert_eq!(outcome.bids_received, 0);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(user.orders[0].validate().is_ok());
}

#[tokio::test]
async fn test_no_subscribers_closes_immediately() {
    let (d1, _) = domains();
    let mut feed = MockFeed::new();
    feed.expect_post().times(1).returning(|_| 0);

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::ZERO)
        .unwrap();

    let outcomes = user.start(&feed).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].filled);
    assert_eq!(outcomes[0].closed_by, CloseReason::AllBidsIn);
    assert_eq!(outcomes[0].expected_bids, 0);
}

#[tokio::test]
async fn test_all_declines_leave_order_unfilled() {
    let (d1, _) = domains();
    let mut feed = MockFeed::new();
    feed.expect_post().times(1).returning(|ticket| {
        for _ in 0..2 {
            let msg = OrderBroadcast::new(Arc::clone(&ticket));
            let bid = Bid::decline(&msg.ticket, SolverId::new());
            tokio::spawn(msg.slot.submit(bid));
        }
        2
    });

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_secs(5))
        .unwrap();
    let outcome = settle_order("alice", &mut user.orders[0], &feed)
        .await
        .unwrap();

    assert!(!outcome.filled);
    assert_eq!(outcome.closed_by, CloseReason::AllBidsIn);
    assert_eq!(outcome.bids_received, 2);
    assert_eq!(outcome.declined, 2);
    assert!(outcome.path.is_empty());
}

#[tokio::test]
async fn test_order_collected_once() {
    let (d1, _) = domains();
    let mut feed = MockFeed::new();
    feed.expect_post().times(1).returning(|_| 0);

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::ZERO)
        .unwrap();
    settle_order("alice", &mut user.orders[0], &feed)
        .await
        .unwrap();

    let again = settle_order("alice", &mut user.orders[0], &feed).await;
    assert!(matches!(again, Err(AuctionError::AlreadyCollected { .. })));
    // Already-collected orders are skipped by the driver.
    assert!(user.start(&feed).await.unwrap().is_empty());
}

// ---- End-to-end Over the Bus ----

#[tokio::test]
async fn test_direct_swap_filled_by_only_solver() {
    let (d1, _) = domains();
    let solver = Solver::new(
        "s1",
        vec![position(usdc(20_000, &d1), eth(10, &d1))],
    );
    let solver_id = solver.id;

    let mut user = User::new("alice", vec![usdc(10_000, &d1)]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_secs(1))
        .unwrap();

    let engine = AuctionEngine::new(Arc::new(AuctionBus::new()), Duration::from_millis(10));
    let summary = engine
        .run(Scenario {
            users: vec![user],
            solvers: vec![solver],
        })
        .await
        .unwrap();

    assert_eq!(summary.filled, 1);
    let outcome = &summary.outcomes[0];
    assert!(outcome.filled);
    assert_eq!(outcome.path.len(), 1);
    assert_eq!(outcome.solver_id, Some(solver_id));
    assert_eq!(outcome.solver_name.as_deref(), Some("s1"));
    assert_eq!(outcome.closed_by, CloseReason::AllBidsIn);
}

#[tokio::test]
async fn test_bridge_route_reaches_other_domain() {
    let (d1, d2) = domains();
    let solver = Solver::new(
        "bridger",
        vec![
            position(usdc(20_000, &d1), eth(10, &d1)),
            position(usdc(20_000, &d2), eth(10, &d2)),
        ],
    );

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d2), Duration::from_secs(1))
        .unwrap();

    let engine = AuctionEngine::new(Arc::new(AuctionBus::new()), no_settle());
    let summary = engine
        .run(Scenario {
            users: vec![user],
            solvers: vec![solver],
        })
        .await
        .unwrap();

    let outcome = &summary.outcomes[0];
    assert!(outcome.filled);
    assert_eq!(outcome.path, vec!["[USDC@arbitrum -> ETH@arbitrum]".to_string()]);
}

#[tokio::test]
async fn test_shortest_route_wins_across_solvers() {
    let (d1, _) = domains();
    let two_hops = Solver::new(
        "via-dai",
        vec![
            position(usdc(20_000, &d1), dai(20_000, &d1)),
            position(dai(20_000, &d1), eth(10, &d1)),
        ],
    );
    let direct = Solver::new("direct", vec![position(usdc(20_000, &d1), eth(10, &d1))]);
    let unrelated = Solver::new("unrelated", vec![position(dai(20_000, &d1), eth(10, &d1))]);
    let direct_id = direct.id;

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_secs(1))
        .unwrap();

    let engine = AuctionEngine::new(Arc::new(AuctionBus::new()), no_settle());
    let summary = engine
        .run(Scenario {
            users: vec![user],
            solvers: vec![two_hops, direct, unrelated],
        })
        .await
        .unwrap();

    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.solver_id, Some(direct_id));
    assert_eq!(outcome.bids_received, 3);
    assert_eq!(outcome.declined, 1);
    assert_eq!(outcome.routes_received(), 2);
}

#[tokio::test]
async fn test_users_run_concurrently_and_sinks_see_every_outcome() {
    let (d1, _) = domains();
    let solver = Solver::new("s1", vec![position(usdc(20_000, &d1), eth(10, &d1))]);

    let mut alice = User::new("alice", vec![]);
    alice
        .create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_secs(1))
        .unwrap();
    alice
        .create_order(eth(1, &d1), usdc(2_000, &d1), Duration::from_secs(1))
        .unwrap();
    let mut bob = User::new("bob", vec![]);
    bob.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::ZERO)
        .unwrap();

    let mut sink = MockSink::new();
    sink.expect_record().times(3).returning(|_| Ok(()));
    sink.expect_finish().times(1).returning(|| Ok(()));

    let engine = AuctionEngine::new(Arc::new(AuctionBus::new()), no_settle())
        .with_sink(Arc::new(sink));
    let summary = engine
        .run(Scenario {
            users: vec![alice, bob],
            solvers: vec![solver],
        })
        .await
        .unwrap();

    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.filled, 2);
    assert_eq!(summary.unfilled, 1);
}

// ---- Fatal Invariant ----

#[tokio::test]
async fn test_fill_with_wrong_final_token_is_fatal() {
    let (d1, _) = domains();
    // A valid leg that ends in DAI, answered for an ETH order.
    let wrong_leg = position(usdc(20_000, &d1), dai(20_000, &d1));

    let mut feed = MockFeed::new();
    feed.expect_post().returning(move |ticket| {
        let msg = OrderBroadcast::new(Arc::clone(&ticket));
        let bid = Bid::route(&msg.ticket, SolverId::new(), vec![wrong_leg.clone()]);
        tokio::spawn(msg.slot.submit(bid));
        1
    });

    let mut user = User::new("mallory", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_secs(1))
        .unwrap();

    let mut sink = MockSink::new();
    sink.expect_record().never();
    sink.expect_finish().never();

    let engine = AuctionEngine::new(Arc::new(feed), no_settle()).with_sink(Arc::new(sink));
    let err = engine
        .run(Scenario {
            users: vec![user],
            solvers: vec![],
        })
        .await
        .unwrap_err();

    let auction_err = err.downcast_ref::<AuctionError>().unwrap();
    assert!(matches!(
        auction_err,
        AuctionError::InvariantViolated {
            source: ValidationError::PathTargetMismatch { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_late_bid_is_refused() {
    let (d1, _) = domains();
    let mut feed = MockFeed::new();
    let (slots_tx, mut slots_rx) = mpsc::unbounded_channel();
    feed.expect_post().times(1).returning(move |ticket| {
        let _ = slots_tx.send(OrderBroadcast::new(ticket));
        1
    });

    let mut user = User::new("alice", vec![]);
    user.create_order(usdc(2_000, &d1), eth(1, &d1), Duration::from_millis(20))
        .unwrap();
    let outcome = settle_order("alice", &mut user.orders[0], &feed)
        .await
        .unwrap();
    assert_eq!(outcome.closed_by, CloseReason::Deadline);

    let OrderBroadcast { ticket, slot } = slots_rx.recv().await.unwrap();
    assert!(slot.is_closed());
    let late = slot.submit(Bid::decline(&ticket, SolverId::new())).await;
    assert!(matches!(late, Err(AuctionError::BidWindowClosed { .. })));
}
