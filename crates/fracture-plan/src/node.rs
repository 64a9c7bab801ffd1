//! Minimal plan-node surface: enough structure for exchange addressing,
//! shape checks, and plan validation.

use serde::{Deserialize, Serialize};

use fracture_core::id::FragmentId;
use fracture_core::schema::Schema;

/// How an aggregate node participates in a two-phase aggregation:
/// `Partial` emits serialized accumulator states, `Final` consumes and
/// combines them into finished values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateMode {
    Partial,
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanNode {
    TableScan {
        schema: Schema,
    },
    Aggregate {
        input: Box<PlanNode>,
        mode: AggregateMode,
        function: String,
        group_by: Vec<String>,
    },
    /// Reads the output of one or more upstream fragments through the
    /// exchange. The declared schema is the row layout every source
    /// fragment ships.
    RemoteSource {
        source_fragments: Vec<FragmentId>,
        schema: Schema,
    },
}

impl PlanNode {
    /// Cheap, type-only discriminator used by shape checks.
    pub fn is_remote_source(&self) -> bool {
        matches!(self, PlanNode::RemoteSource { .. })
    }

    pub fn inputs(&self) -> usize {
        match self {
            PlanNode::TableScan { .. } | PlanNode::RemoteSource { .. } => 0,
            PlanNode::Aggregate { .. } => 1,
        }
    }

    /// Pre-order walk over this node and its inputs.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a PlanNode)) {
        f(self);
        if let PlanNode::Aggregate { input, .. } = self {
            input.visit(f);
        }
    }
}
