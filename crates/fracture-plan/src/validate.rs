//! Whole-plan validation of exchange addressing, run before execution
//! starts. A failing plan is rejected, never started.

use std::collections::HashMap;

use fracture_core::error::{Error, Result};
use fracture_core::id::FragmentId;

use crate::exchange::ExchangeEdge;
use crate::fragment::PlanFragment;
use crate::node::PlanNode;

/// Check every remote source in the plan: referenced fragments must
/// exist, and the declared schema must agree with each source fragment's
/// output arity.
pub fn validate_plan(fragments: &[PlanFragment]) -> Result<()> {
    let by_id = index_fragments(fragments)?;

    for fragment in fragments {
        let mut remotes = Vec::new();
        fragment.root.visit(&mut |node| {
            if let PlanNode::RemoteSource { .. } = node {
                remotes.push(node);
            }
        });

        for node in remotes {
            let PlanNode::RemoteSource {
                source_fragments,
                schema,
            } = node
            else {
                continue;
            };
            for source in source_fragments {
                let upstream = by_id.get(source).ok_or_else(|| {
                    Error::PlanValidation(format!(
                        "fragment {} reads from unknown fragment {source}",
                        fragment.id
                    ))
                })?;
                if upstream.output.arity() != schema.arity() {
                    return Err(Error::PlanValidation(format!(
                        "fragment {} declares arity {} for remote source, but fragment {source} outputs arity {}",
                        fragment.id,
                        schema.arity(),
                        upstream.output.arity()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Validate one exchange edge against the plan it addresses: every
/// source fragment must exist and every alias index must fall within
/// that fragment's output arity.
pub fn validate_edge(edge: &ExchangeEdge, fragments: &[PlanFragment]) -> Result<()> {
    let by_id = index_fragments(fragments)?;

    for source in edge.source_fragments() {
        let upstream = by_id.get(source).ok_or_else(|| {
            Error::PlanValidation(format!("exchange edge references unknown fragment {source}"))
        })?;
        edge.validate(&upstream.output)?;
    }
    Ok(())
}

fn index_fragments(fragments: &[PlanFragment]) -> Result<HashMap<FragmentId, &PlanFragment>> {
    let mut by_id = HashMap::new();
    for fragment in fragments {
        if by_id.insert(fragment.id, fragment).is_some() {
            return Err(Error::PlanValidation(format!(
                "duplicate fragment id {}",
                fragment.id
            )));
        }
    }
    Ok(by_id)
}
