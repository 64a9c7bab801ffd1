//! End-to-end partial → wire → exchange → combine → output flows,
//! including transport retry and cancellation. Driven through the root
//! facade, the surface downstream consumers see.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fracture::{
    open_exchange, AggregateFunction, DataType, EngineConfig, Error, ExchangeEdge,
    ExchangeTransport, FinalAggregator, FragmentId, InMemoryExchange, PartialAggregator, Result,
    RetryPolicy, RetryingTransport, RowBatch, Scalar,
};

const F1: FragmentId = FragmentId::new(1);
const F2: FragmentId = FragmentId::new(2);

fn worker_wire(f: &Arc<AggregateFunction>, rows: &[(i64, i64)]) -> RowBatch {
    let mut agg = PartialAggregator::new(Arc::clone(f));
    for (group, value) in rows {
        agg.push(Scalar::I64(*group), &Scalar::I64(*value)).unwrap();
    }
    agg.into_wire().unwrap()
}

#[test]
fn two_workers_combine_to_global_max() {
    for f in [
        AggregateFunction::max(DataType::Int64).unwrap(),
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    ] {
        let f = Arc::new(f);
        // Worker one sees [3, 7, 2] (local max 7); worker two sees [9].
        let exchange = InMemoryExchange::new();
        exchange.publish(F1, vec![worker_wire(&f, &[(0, 3), (0, 7), (0, 2)])]);
        exchange.publish(F2, vec![worker_wire(&f, &[(0, 9)])]);

        let edge = ExchangeEdge::new(vec![F1, F2], vec![("g".into(), 0), ("s".into(), 1)]).unwrap();
        let streams = open_exchange(&edge, &exchange).unwrap();

        let mut merger = FinalAggregator::new(Arc::clone(&f));
        for stream in &streams {
            merger.merge_stream(stream).unwrap();
        }
        let out = merger.finish().unwrap();
        assert_eq!(out.columns[1].values, vec![Scalar::I64(9)]);
    }
}

#[test]
fn merge_order_across_streams_does_not_matter() {
    let f = Arc::new(
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    );
    let a = worker_wire(&f, &[(0, 3), (1, 100), (0, 7)]);
    let b = worker_wire(&f, &[(0, 9), (1, -4)]);

    let mut forward = FinalAggregator::new(Arc::clone(&f));
    forward.merge_batch(&a).unwrap();
    forward.merge_batch(&b).unwrap();

    let mut backward = FinalAggregator::new(Arc::clone(&f));
    backward.merge_batch(&b).unwrap();
    backward.merge_batch(&a).unwrap();

    let fw = forward.finish().unwrap();
    let bw = backward.finish().unwrap();
    assert_eq!(fw.columns[0].values, bw.columns[0].values);
    assert_eq!(fw.columns[1].values, bw.columns[1].values);
    assert_eq!(fw.columns[1].values, vec![Scalar::I64(9), Scalar::I64(100)]);
}

#[test]
fn groups_with_no_rows_on_one_worker_still_merge() {
    let f = Arc::new(
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    );
    // Worker one only saw group 0; worker two only saw group 1.
    let a = worker_wire(&f, &[(0, 5)]);
    let b = worker_wire(&f, &[(1, 6)]);

    let mut merger = FinalAggregator::new(Arc::clone(&f));
    merger.merge_batch(&a).unwrap();
    merger.merge_batch(&b).unwrap();
    assert_eq!(merger.group_count(), 2);
    let out = merger.finish().unwrap();
    assert_eq!(out.columns[1].values, vec![Scalar::I64(5), Scalar::I64(6)]);
}

#[test]
fn hash_partitioned_wire_covers_every_group_once() {
    let f = Arc::new(AggregateFunction::max(DataType::Int64).unwrap());
    let mut agg = PartialAggregator::new(Arc::clone(&f));
    for g in 0..20i64 {
        agg.push(Scalar::I64(g), &Scalar::I64(g * 10)).unwrap();
    }
    let parts = agg.into_wire_partitions(3).unwrap();
    assert_eq!(parts.len(), 3);
    let total: usize = parts.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 20);
}

#[test]
fn cancelled_query_surfaces_nothing() {
    let f = Arc::new(AggregateFunction::max(DataType::Int64).unwrap());
    let mut agg = PartialAggregator::new(Arc::clone(&f));
    agg.push(Scalar::I64(0), &Scalar::I64(1)).unwrap();
    // Dropping without into_wire()/output(): no partial result escapes.
    agg.cancel();

    let mut merger = FinalAggregator::new(Arc::clone(&f));
    merger.merge_batch(&worker_wire(&f, &[(0, 1)])).unwrap();
    merger.cancel();
}

/// Transport that fails transiently before succeeding.
struct FlakyTransport {
    inner: InMemoryExchange,
    failures_left: AtomicUsize,
}

impl ExchangeTransport for FlakyTransport {
    fn fetch(&self, fragment: FragmentId) -> Result<Vec<RowBatch>> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::Transport {
                attempts: 1,
                message: "connection reset".into(),
            });
        }
        self.inner.fetch(fragment)
    }
}

#[test]
fn bounded_retry_recovers_from_transient_failures() {
    let f = Arc::new(AggregateFunction::max(DataType::Int64).unwrap());
    let inner = InMemoryExchange::new();
    inner.publish(F1, vec![worker_wire(&f, &[(0, 8)])]);

    let flaky = FlakyTransport {
        inner,
        failures_left: AtomicUsize::new(2),
    };
    let transport = RetryingTransport::new(flaky, RetryPolicy::immediate(3));
    let batches = transport.fetch(F1).unwrap();
    assert_eq!(batches.len(), 1);
}

#[test]
fn engine_config_drives_the_retry_policy() {
    let mut cfg = EngineConfig::default();
    cfg.exchange_retry_max_retries = 1;
    cfg.exchange_retry_initial_backoff_ms = 0;
    cfg.exchange_retry_max_backoff_ms = 0;

    let flaky = FlakyTransport {
        inner: InMemoryExchange::new(),
        failures_left: AtomicUsize::new(usize::MAX),
    };
    let transport = RetryingTransport::new(flaky, cfg.retry_policy());
    let err = transport.fetch(F1).unwrap_err();
    assert!(matches!(err, Error::Transport { attempts: 2, .. }));
}

#[test]
fn exhausted_retries_surface_attempt_count() {
    let flaky = FlakyTransport {
        inner: InMemoryExchange::new(),
        failures_left: AtomicUsize::new(usize::MAX),
    };
    let transport = RetryingTransport::new(flaky, RetryPolicy::immediate(2));
    let err = transport.fetch(F1).unwrap_err();
    match err {
        Error::Transport { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected transport error, got {other:?}"),
    }
}
