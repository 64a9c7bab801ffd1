//! Transport abstraction between fragments.
//!
//! The real row-batch network service is an external collaborator; the
//! contract assumed here is ordered delivery within one upstream
//! instance's stream and transient, retryable failures. No ordering is
//! guaranteed between distinct upstream instances feeding the same edge.

use std::collections::HashMap;
use std::sync::Mutex;

use fracture_core::prelude::{Error, FragmentId, Result, RetryPolicy, RowBatch};
use fracture_plan::ExchangeEdge;

pub trait ExchangeTransport: Send + Sync {
    /// Fetch the full output stream of one upstream fragment instance,
    /// in the order that instance produced it.
    fn fetch(&self, fragment: FragmentId) -> Result<Vec<RowBatch>>;
}

/// One upstream instance's stream, tagged by its fragment id. Row order
/// is preserved within the stream; nothing is guaranteed across streams.
#[derive(Debug, Clone)]
pub struct ExchangeStream {
    pub fragment: FragmentId,
    pub batches: Vec<RowBatch>,
}

/// Open the exchange an edge describes: one stream per source fragment,
/// in the edge's declared order.
pub fn open_exchange(
    edge: &ExchangeEdge,
    transport: &dyn ExchangeTransport,
) -> Result<Vec<ExchangeStream>> {
    edge.source_fragments()
        .iter()
        .map(|&fragment| {
            Ok(ExchangeStream {
                fragment,
                batches: transport.fetch(fragment)?,
            })
        })
        .collect()
}

/// In-process transport for tests and single-node execution.
#[derive(Debug, Default)]
pub struct InMemoryExchange {
    streams: Mutex<HashMap<FragmentId, Vec<RowBatch>>>,
}

impl InMemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fragment instance's output, appending to its stream.
    pub fn publish(&self, fragment: FragmentId, batches: Vec<RowBatch>) {
        let mut streams = self.streams.lock().expect("exchange lock poisoned");
        streams.entry(fragment).or_default().extend(batches);
    }
}

impl ExchangeTransport for InMemoryExchange {
    fn fetch(&self, fragment: FragmentId) -> Result<Vec<RowBatch>> {
        let streams = self.streams.lock().expect("exchange lock poisoned");
        streams.get(&fragment).cloned().ok_or_else(|| Error::Transport {
            attempts: 1,
            message: format!("fragment {fragment} has published no output"),
        })
    }
}

/// Bounded-retry wrapper around any transport. Only transient transport
/// failures are retried; deterministic errors pass through untouched.
/// When retries are exhausted the error surfaces as a query-level
/// failure carrying the attempt count.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: ExchangeTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T: ExchangeTransport> ExchangeTransport for RetryingTransport<T> {
    fn fetch(&self, fragment: FragmentId) -> Result<Vec<RowBatch>> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.inner.fetch(fragment) {
                Ok(batches) => return Ok(batches),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempts > self.policy.max_retries => {
                    return Err(Error::Transport {
                        attempts,
                        message: e.to_string(),
                    });
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(fragment = %fragment, attempt = attempts, "retrying exchange fetch");
                    std::thread::sleep(self.policy.backoff_for(attempts));
                }
            }
        }
    }
}
