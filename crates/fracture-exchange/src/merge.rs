//! Final-side aggregation: deserialize partial states arriving from any
//! number of upstream instances and combine them per group.
//!
//! Arrival order across instances is unspecified, and partials may be
//! folded pairwise or as a tree; `combine` is associative and
//! commutative, so every reduction shape yields the same result.

use std::collections::BTreeMap;
use std::sync::Arc;

use fracture_agg::function::AggregateFunction;
use fracture_agg::state::AccumulatorState;
use fracture_core::error::{Error, Result};
use fracture_core::types::{Column, GroupKey, RowBatch};

use crate::transport::ExchangeStream;
use crate::{GROUP_COLUMN, STATE_COLUMN};

/// Merges wire batches of serialized partial states into final per-group
/// values.
pub struct FinalAggregator {
    function: Arc<AggregateFunction>,
    groups: BTreeMap<GroupKey, Box<dyn AccumulatorState>>,
}

impl FinalAggregator {
    pub fn new(function: Arc<AggregateFunction>) -> Self {
        Self {
            function,
            groups: BTreeMap::new(),
        }
    }

    /// Merge one wire batch from any upstream instance.
    pub fn merge_batch(&mut self, batch: &RowBatch) -> Result<()> {
        let (keys, states) = wire_columns(batch)?;
        let serializer = self.function.serializer();
        for (key, wire) in keys.values.iter().zip(&states.values) {
            let partial = serializer.deserialize(wire)?;
            let function = &self.function;
            let state = self
                .groups
                .entry(GroupKey(key.clone()))
                .or_insert_with(|| function.new_state());
            state.combine(partial.as_ref())?;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            rows = batch.num_rows(),
            groups = self.groups.len(),
            "merged wire batch"
        );
        Ok(())
    }

    /// Merge every batch of one upstream instance's stream, in stream
    /// order.
    pub fn merge_stream(&mut self, stream: &ExchangeStream) -> Result<()> {
        for batch in &stream.batches {
            self.merge_batch(batch)?;
        }
        Ok(())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Finalize every group and emit the output batch (group key, final
    /// value), groups in key order.
    pub fn finish(self) -> Result<RowBatch> {
        let mut keys = Vec::with_capacity(self.groups.len());
        let mut values = Vec::with_capacity(self.groups.len());
        for (key, mut state) in self.groups {
            keys.push(key.0);
            values.push(state.output());
        }
        Ok(RowBatch {
            columns: vec![
                Column {
                    name: GROUP_COLUMN.into(),
                    values: keys,
                },
                Column {
                    name: "value".into(),
                    values,
                },
            ],
        })
    }

    /// Release every live state without calling `output()`. Partial or
    /// incomplete results are never surfaced as a final answer.
    pub fn cancel(self) {
        drop(self.groups);
    }
}

fn wire_columns(batch: &RowBatch) -> Result<(&Column, &Column)> {
    let keys = batch
        .columns
        .iter()
        .find(|c| c.name == GROUP_COLUMN)
        .ok_or_else(|| Error::Invariant("wire batch missing group column".into()))?;
    let states = batch
        .columns
        .iter()
        .find(|c| c.name == STATE_COLUMN)
        .ok_or_else(|| Error::Invariant("wire batch missing state column".into()))?;
    if keys.len() != states.len() {
        return Err(Error::Invariant(format!(
            "wire batch column lengths differ: {} vs {}",
            keys.len(),
            states.len()
        )));
    }
    Ok((keys, states))
}
