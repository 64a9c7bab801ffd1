//! Partial-side aggregation: local per-group accumulation and wire
//! encoding at the fragment boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

use fracture_agg::function::AggregateFunction;
use fracture_agg::state::AccumulatorState;
use fracture_core::error::Result;
use fracture_core::types::{hash_partition, Column, GroupKey, RowBatch, Scalar};

use crate::{GROUP_COLUMN, STATE_COLUMN};

/// Accumulates one fragment instance's rows into per-group states.
///
/// Each group's state is created on first observation and exclusively
/// owned by this aggregator (one worker, one thread). `push` is O(1) per
/// row: a map probe plus one virtual `input` call.
pub struct PartialAggregator {
    function: Arc<AggregateFunction>,
    groups: BTreeMap<GroupKey, Box<dyn AccumulatorState>>,
}

impl PartialAggregator {
    pub fn new(function: Arc<AggregateFunction>) -> Self {
        Self {
            function,
            groups: BTreeMap::new(),
        }
    }

    /// Route one row's value into its group's accumulator.
    pub fn push(&mut self, group: Scalar, value: &Scalar) -> Result<()> {
        let function = &self.function;
        let state = self
            .groups
            .entry(GroupKey(group))
            .or_insert_with(|| function.new_state());
        state.input(value)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Serialize every group's state into the wire batch shipped through
    /// the exchange: one row per group, columns (group key, wire value).
    /// States are snapshotted, not finalized.
    pub fn into_wire(self) -> Result<RowBatch> {
        let serializer = self.function.serializer();
        let mut keys = Vec::with_capacity(self.groups.len());
        let mut states = Vec::with_capacity(self.groups.len());
        for (key, state) in &self.groups {
            keys.push(key.0.clone());
            states.push(serializer.serialize(state.as_ref())?);
        }
        Ok(wire_batch(keys, states))
    }

    /// Hash-partition the wire output across `num_partitions` downstream
    /// consumers. Every group lands in exactly one partition.
    pub fn into_wire_partitions(self, num_partitions: usize) -> Result<Vec<RowBatch>> {
        let serializer = self.function.serializer();
        let mut parts: Vec<(Vec<Scalar>, Vec<Scalar>)> =
            (0..num_partitions.max(1)).map(|_| (Vec::new(), Vec::new())).collect();
        for (key, state) in &self.groups {
            let p = hash_partition(&key.0, num_partitions.max(1));
            parts[p].0.push(key.0.clone());
            parts[p].1.push(serializer.serialize(state.as_ref())?);
        }
        Ok(parts
            .into_iter()
            .map(|(keys, states)| wire_batch(keys, states))
            .collect())
    }

    /// Release every live state without finalizing. Cancelled queries
    /// never surface partial results.
    pub fn cancel(self) {
        drop(self.groups);
    }
}

fn wire_batch(keys: Vec<Scalar>, states: Vec<Scalar>) -> RowBatch {
    RowBatch {
        columns: vec![
            Column {
                name: GROUP_COLUMN.into(),
                values: keys,
            },
            Column {
                name: STATE_COLUMN.into(),
                values: states,
            },
        ],
    }
}
