//! Integration tests for the execution loop against the paper venue.
//!
//! These tests drive whole advanced orders through release, pricing, venue
//! submission, fills, timeouts and retries.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use async_trait::async_trait;
use execution_scheduler::application::ports::{NoOpEventPublisher, VenueError, VenueGatewayPort};
use execution_scheduler::application::services::{ExecutionCoordinator, ExecutionLoop};
use execution_scheduler::domain::order_scheduling::AdvancedOrderStatus;
use execution_scheduler::infrastructure::persistence::InMemoryStateRepository;
use execution_scheduler::infrastructure::venue::PaperVenue;
use execution_scheduler::{
    AdaptiveExecutor, AdvancedOrderParams, AdvancedOrderScheduler, AdvancedSchedulerConfig,
    AlgorithmKind, ContractId, Direction, ExecutionEvent, Offset, OrderExecutionConfig, Quote,
    TradeInstruction, VenueOrderId,
};

type Engine = ExecutionLoop<PaperVenue, InMemoryStateRepository, NoOpEventPublisher>;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap()
}

fn contract() -> ContractId {
    ContractId::new("IF2506.CFFEX")
}

fn quote() -> Quote {
    Quote::new(dec!(3800.0), dec!(3800.2), dec!(0.2))
}

fn engine(venue: &Arc<PaperVenue>, executor: OrderExecutionConfig) -> Engine {
    let coordinator = ExecutionCoordinator::new(
        AdvancedOrderScheduler::with_seed(AdvancedSchedulerConfig::deterministic(), 42),
        AdaptiveExecutor::new(executor),
    );
    ExecutionLoop::new(coordinator, Arc::clone(venue), Arc::new(NoOpEventPublisher))
}

fn instruction(direction: Direction, quantity: u64) -> TradeInstruction {
    TradeInstruction::limit(contract(), direction, Offset::Open, quantity, dec!(3800))
        .with_signal("breakout")
}

fn event_types(events: &[ExecutionEvent]) -> Vec<&'static str> {
    events.iter().map(ExecutionEvent::event_type).collect()
}

#[tokio::test]
async fn test_timed_split_releases_on_schedule() {
    let venue = Arc::new(PaperVenue::new());
    venue.set_quote(&contract(), quote()).await;
    let mut engine = engine(&venue, OrderExecutionConfig::default());

    let order = engine
        .submit(
            AlgorithmKind::TimedSplit,
            instruction(Direction::Buy, 100),
            &AdvancedOrderParams::timed_split(60, 30),
            t0(),
        )
        .unwrap();
    let schedule: Vec<_> = order.slice_schedule().iter().map(|e| (e.time, e.quantity)).collect();
    assert_eq!(
        schedule,
        vec![
            (t0(), 30),
            (t0() + Duration::seconds(60), 30),
            (t0() + Duration::seconds(120), 30),
            (t0() + Duration::seconds(180), 10),
        ]
    );

    let mut events = Vec::new();
    let mut released = Vec::new();
    for secs in [0, 30, 60, 119, 120, 180] {
        let report = engine.tick(t0() + Duration::seconds(secs), |_| quote()).await;
        released.push(report.released);
        events.extend(report.events);
    }

    assert_eq!(released, vec![1, 0, 1, 0, 1, 1]);
    assert_eq!(event_types(&events), vec!["TIMED_SPLIT_COMPLETE"]);

    let submitted = venue.submitted().await;
    assert!(submitted.iter().all(|i| i.price == dec!(3800.6)));
    assert!(submitted.iter().all(|i| i.signal == "breakout"));
    let status = engine.coordinator().scheduler().get_order(order.id()).unwrap().status();
    assert_eq!(status, AdvancedOrderStatus::Completed);
}

#[tokio::test]
async fn test_vwap_follows_profile() {
    let venue = Arc::new(PaperVenue::new());
    venue.set_quote(&contract(), quote()).await;
    let mut engine = engine(&venue, OrderExecutionConfig::default());

    engine
        .submit(
            AlgorithmKind::Vwap,
            instruction(Direction::Sell, 40),
            &AdvancedOrderParams::vwap(300, vec![dec!(3), dec!(7), dec!(10)]),
            t0(),
        )
        .unwrap();

    let mut events = Vec::new();
    for secs in [0, 100, 200] {
        events.extend(engine.tick(t0() + Duration::seconds(secs), |_| quote()).await.events);
    }

    let quantities: Vec<_> = venue.submitted().await.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![6, 14, 20]);
    assert!(venue.submitted().await.iter().all(|i| i.price == dec!(3799.6)));
    assert_eq!(event_types(&events), vec!["VWAP_COMPLETE"]);
}

#[tokio::test]
async fn test_classic_iceberg_waits_for_each_fill() {
    let venue = Arc::new(PaperVenue::new());
    let mut engine = engine(&venue, OrderExecutionConfig::default());

    engine
        .submit(
            AlgorithmKind::ClassicIceberg,
            instruction(Direction::Buy, 12),
            &AdvancedOrderParams::classic_iceberg(5, 0.0, 0, dec!(0.2)),
            t0(),
        )
        .unwrap();

    // No venue quote: the first child rests and nothing else is revealed.
    for secs in 0..3 {
        engine.tick(t0() + Duration::seconds(secs), |_| quote()).await;
    }
    assert_eq!(venue.submitted().await.len(), 1);

    venue.set_quote(&contract(), quote()).await;
    let mut events = Vec::new();
    for secs in 3..8 {
        events.extend(engine.tick(t0() + Duration::seconds(secs), |_| quote()).await.events);
    }

    let quantities: Vec<_> = venue.submitted().await.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![5, 5, 2]);
    assert_eq!(event_types(&events), vec!["CLASSIC_ICEBERG_COMPLETE"]);
}

#[tokio::test]
async fn test_retry_walk_fills_once_price_reaches_quote() {
    let venue = Arc::new(PaperVenue::new());
    let mut engine = engine(
        &venue,
        OrderExecutionConfig {
            timeout_secs: 10,
            max_retries: 3,
            slippage_ticks: 0,
            price_tick: dec!(0.2),
        },
    );
    engine
        .submit(
            AlgorithmKind::Iceberg,
            instruction(Direction::Buy, 3),
            &AdvancedOrderParams::iceberg(10),
            t0(),
        )
        .unwrap();

    // Priced at the engine's ask with no slippage; the venue ask is a tick higher.
    engine.tick(t0(), |_| quote()).await;
    venue
        .set_quote(&contract(), Quote::new(dec!(3800.2), dec!(3800.4), dec!(0.2)))
        .await;
    assert!(venue.drain_fills().await.unwrap().is_empty());

    let report = engine.tick(t0() + Duration::seconds(10), |_| quote()).await;
    assert_eq!(report.timeouts, 1);
    assert_eq!(report.retries, 1);

    let report = engine.tick(t0() + Duration::seconds(11), |_| quote()).await;
    assert_eq!(report.fills, 1);
    assert_eq!(event_types(&report.events), vec!["ICEBERG_COMPLETE"]);

    let prices: Vec<Decimal> = venue.submitted().await.iter().map(|i| i.price).collect();
    assert_eq!(prices, vec![dec!(3800.2), dec!(3800.4)]);
}

#[tokio::test]
async fn test_retries_exhaust_and_order_stays_working() {
    let venue = Arc::new(PaperVenue::new());
    let mut engine = engine(
        &venue,
        OrderExecutionConfig {
            timeout_secs: 5,
            max_retries: 2,
            ..OrderExecutionConfig::default()
        },
    );
    let order = engine
        .submit(
            AlgorithmKind::Iceberg,
            instruction(Direction::Sell, 1),
            &AdvancedOrderParams::iceberg(1),
            t0(),
        )
        .unwrap();

    let mut events = Vec::new();
    for secs in [0, 5, 10, 15, 20] {
        events.extend(engine.tick(t0() + Duration::seconds(secs), |_| quote()).await.events);
    }

    assert_eq!(
        event_types(&events),
        vec!["ORDER_TIMEOUT", "ORDER_TIMEOUT", "ORDER_TIMEOUT", "RETRY_EXHAUSTED"]
    );
    let ExecutionEvent::RetryExhausted(exhausted) = events.last().unwrap() else {
        panic!("expected exhaustion event");
    };
    assert_eq!(exhausted.total_retries, 2);
    assert_eq!(exhausted.original_price, dec!(3799.6));
    assert_eq!(exhausted.final_price, dec!(3799.2));

    assert_eq!(venue.resting_count().await, 0);
    assert!(engine.coordinator().executor().active_orders().is_empty());
    let status = engine.coordinator().scheduler().get_order(order.id()).unwrap().status();
    assert_eq!(status, AdvancedOrderStatus::Executing);

    let cancelled = engine.cancel_order(order.id(), t0() + Duration::seconds(25)).await;
    assert_eq!(event_types(&cancelled), vec!["ICEBERG_CANCELLED"]);
}

#[tokio::test]
async fn test_cancel_mid_twap_reports_partial_fill() {
    let venue = Arc::new(PaperVenue::new());
    venue.set_quote(&contract(), quote()).await;
    let mut engine = engine(&venue, OrderExecutionConfig::default());

    let order = engine
        .submit(
            AlgorithmKind::EnhancedTwap,
            instruction(Direction::Buy, 50),
            &AdvancedOrderParams::twap(500, 5),
            t0(),
        )
        .unwrap();
    engine.tick(t0(), |_| quote()).await;
    engine.tick(t0() + Duration::seconds(100), |_| quote()).await;

    let events = engine.cancel_order(order.id(), t0() + Duration::seconds(150)).await;

    let [ExecutionEvent::EnhancedTwapCancelled(cancelled)] = events.as_slice() else {
        panic!("expected one ENHANCED_TWAP_CANCELLED event, got {events:?}");
    };
    assert_eq!(cancelled.filled_qty, 20);
    assert_eq!(cancelled.remaining_qty, 30);

    let report = engine.tick(t0() + Duration::seconds(400), |_| quote()).await;
    assert_eq!(report.released, 0);
    assert_eq!(venue.submitted().await.len(), 2);
}

#[tokio::test]
async fn test_invalid_request_creates_no_state() {
    let venue = Arc::new(PaperVenue::new());
    let mut engine = engine(&venue, OrderExecutionConfig::default());

    let err = engine
        .submit(
            AlgorithmKind::Vwap,
            instruction(Direction::Buy, 10),
            &AdvancedOrderParams::vwap(60, Vec::new()),
            t0(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("volume_profile"));
    assert!(engine.coordinator().scheduler().orders().is_empty());

    let report = engine.tick(t0(), |_| quote()).await;
    assert_eq!(report.released, 0);
}

/// Paper venue that rejects its first `rejections` submissions.
struct RejectingVenue {
    inner: PaperVenue,
    rejections: AtomicUsize,
}

impl RejectingVenue {
    fn new(rejections: usize) -> Self {
        Self {
            inner: PaperVenue::new(),
            rejections: AtomicUsize::new(rejections),
        }
    }
}

#[async_trait]
impl VenueGatewayPort for RejectingVenue {
    async fn submit(&self, instruction: &TradeInstruction) -> Result<VenueOrderId, VenueError> {
        let rejected = self
            .rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(VenueError::Unavailable {
                message: "gateway disconnected".to_string(),
            });
        }
        self.inner.submit(instruction).await
    }

    async fn cancel(&self, venue_id: &VenueOrderId) -> Result<(), VenueError> {
        self.inner.cancel(venue_id).await
    }

    async fn drain_fills(&self) -> Result<Vec<VenueOrderId>, VenueError> {
        self.inner.drain_fills().await
    }
}

fn rejecting_engine(
    venue: &Arc<RejectingVenue>,
    executor: OrderExecutionConfig,
) -> ExecutionLoop<RejectingVenue, InMemoryStateRepository, NoOpEventPublisher> {
    let coordinator = ExecutionCoordinator::new(
        AdvancedOrderScheduler::with_seed(AdvancedSchedulerConfig::deterministic(), 42),
        AdaptiveExecutor::new(executor),
    );
    ExecutionLoop::new(coordinator, Arc::clone(venue), Arc::new(NoOpEventPublisher))
}

#[tokio::test]
async fn test_rejected_submission_is_retried_next_tick() {
    let venue = Arc::new(RejectingVenue::new(1));
    venue.inner.set_quote(&contract(), quote()).await;
    let mut engine = rejecting_engine(&venue, OrderExecutionConfig::default());

    let order = engine
        .submit(
            AlgorithmKind::Iceberg,
            instruction(Direction::Buy, 20),
            &AdvancedOrderParams::iceberg(10),
            t0(),
        )
        .unwrap();

    let first = engine.tick(t0(), |_| quote()).await;
    assert_eq!((first.released, first.submitted), (1, 0));

    let mut events = Vec::new();
    for secs in 1..4 {
        events.extend(engine.tick(t0() + Duration::seconds(secs), |_| quote()).await.events);
    }

    let quantities: Vec<_> = venue.inner.submitted().await.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![10, 10]);
    assert_eq!(event_types(&events), vec!["ICEBERG_COMPLETE"]);
    let status = engine.coordinator().scheduler().get_order(order.id()).unwrap().status();
    assert_eq!(status, AdvancedOrderStatus::Completed);
}

#[tokio::test]
async fn test_rejected_retry_restarts_the_child() {
    // The first submission rests (no venue quote); its retry is rejected.
    let venue = Arc::new(RejectingVenue::new(0));
    let mut engine = rejecting_engine(
        &venue,
        OrderExecutionConfig {
            timeout_secs: 10,
            ..OrderExecutionConfig::default()
        },
    );
    engine
        .submit(
            AlgorithmKind::Iceberg,
            instruction(Direction::Buy, 5),
            &AdvancedOrderParams::iceberg(10),
            t0(),
        )
        .unwrap();
    engine.tick(t0(), |_| quote()).await;

    venue.rejections.store(1, Ordering::SeqCst);
    let report = engine.tick(t0() + Duration::seconds(10), |_| quote()).await;
    assert_eq!((report.timeouts, report.retries), (1, 0));
    assert!(engine.coordinator().executor().active_orders().is_empty());

    venue.inner.set_quote(&contract(), quote()).await;
    let report = engine.tick(t0() + Duration::seconds(11), |_| quote()).await;
    assert_eq!(report.released, 1);
    assert_eq!(report.fills, 1);
    assert_eq!(event_types(&report.events), vec!["ICEBERG_COMPLETE"]);
}
