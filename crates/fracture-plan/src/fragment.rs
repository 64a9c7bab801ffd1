//! Plan fragments: units of the distributed plan, addressed by opaque id.

use serde::{Deserialize, Serialize};

use fracture_core::prelude::{FragmentId, Schema};

use crate::node::PlanNode;

/// One fragment of a distributed plan. Scheduling and placement are out
/// of scope; the rest of the engine references fragments only by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFragment {
    pub id: FragmentId,
    pub root: PlanNode,
    /// Ordered, typed output columns this fragment ships through the
    /// exchange.
    pub output: Schema,
}

impl PlanFragment {
    pub fn new(id: FragmentId, root: PlanNode, output: Schema) -> Self {
        Self { id, root, output }
    }
}
