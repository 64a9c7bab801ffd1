//! Exchange-edge descriptor: the only addressing primitive between
//! fragments this core exposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fracture_core::error::{Error, Result};
use fracture_core::id::FragmentId;
use fracture_core::schema::Schema;

/// Addresses the upstream fragments feeding one downstream operator and
/// names their output columns locally.
///
/// Built at plan-assembly time, immutable afterwards; the engine consumes
/// it when opening the corresponding exchange at runtime. The fragment
/// list is ordered and non-empty; local symbol names are unique within
/// one edge. BTreeMap keeps alias iteration deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEdge {
    source_fragments: Vec<FragmentId>,
    aliases: BTreeMap<String, usize>,
}

impl ExchangeEdge {
    pub fn new(
        source_fragments: Vec<FragmentId>,
        aliases: Vec<(String, usize)>,
    ) -> Result<Self> {
        if source_fragments.is_empty() {
            return Err(Error::PlanValidation(
                "exchange edge must name at least one source fragment".into(),
            ));
        }
        let mut map = BTreeMap::new();
        for (symbol, index) in aliases {
            if map.insert(symbol.clone(), index).is_some() {
                return Err(Error::PlanValidation(format!(
                    "duplicate local symbol '{symbol}' in exchange edge"
                )));
            }
        }
        Ok(Self {
            source_fragments,
            aliases: map,
        })
    }

    pub fn source_fragments(&self) -> &[FragmentId] {
        &self.source_fragments
    }

    pub fn aliases(&self) -> &BTreeMap<String, usize> {
        &self.aliases
    }

    /// Check every mapped index against the upstream output's arity.
    /// Runs at plan-validation time, before any row is processed.
    pub fn validate(&self, upstream: &Schema) -> Result<()> {
        for (symbol, &index) in &self.aliases {
            if index >= upstream.arity() {
                return Err(Error::PlanValidation(format!(
                    "local symbol '{symbol}' maps to column {index}, but the upstream schema has arity {}",
                    upstream.arity()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fracture_core::schema::{DataType, Field};

    fn two_column_schema() -> Schema {
        Schema::new(vec![
            Field::new("c0", DataType::Int64, true),
            Field::new("c1", DataType::Utf8, true),
        ])
    }

    #[test]
    fn empty_fragment_list_is_rejected() {
        let err = ExchangeEdge::new(vec![], vec![("a".into(), 0)]).unwrap_err();
        assert!(matches!(err, Error::PlanValidation(_)));
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let err = ExchangeEdge::new(
            vec![FragmentId::new(1)],
            vec![("a".into(), 0), ("a".into(), 1)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::PlanValidation(_)));
    }

    #[test]
    fn index_within_arity_validates() {
        let edge = ExchangeEdge::new(
            vec![FragmentId::new(1)],
            vec![("a".into(), 0), ("b".into(), 1)],
        )
        .unwrap();
        edge.validate(&two_column_schema()).unwrap();
    }

    #[test]
    fn index_beyond_arity_is_plan_validation_error() {
        let edge = ExchangeEdge::new(vec![FragmentId::new(1)], vec![("a".into(), 2)]).unwrap();
        let err = edge.validate(&two_column_schema()).unwrap_err();
        assert!(matches!(err, Error::PlanValidation(_)));
    }
}
