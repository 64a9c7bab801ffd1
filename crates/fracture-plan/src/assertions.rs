//! Shape-then-detail plan matching for exchange edges.
//!
//! `shape_matches` is a cheap discriminator test; `detail_matches` may
//! only run after it succeeds, because the detail check assumes the
//! node's concrete shape. Calling it out of order is a contract
//! violation and panics. A fragment-id mismatch, by contrast, is an
//! expected outcome during plan verification and yields a clean
//! `NoMatch`.

use std::collections::BTreeMap;

use fracture_core::id::FragmentId;

use crate::exchange::ExchangeEdge;
use crate::node::PlanNode;

/// A resolved upstream output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHandle {
    pub index: usize,
    pub name: String,
}

/// Local symbol name → resolved upstream column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolAliases {
    bindings: BTreeMap<String, ColumnHandle>,
}

impl SymbolAliases {
    pub fn get(&self, symbol: &str) -> Option<&ColumnHandle> {
        self.bindings.get(symbol)
    }

    pub fn insert(&mut self, symbol: impl Into<String>, handle: ColumnHandle) {
        self.bindings.insert(symbol.into(), handle);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Match(SymbolAliases),
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match(_))
    }
}

pub trait Matcher {
    /// Cheap, type-only check on the candidate node.
    fn shape_matches(&self, node: &PlanNode) -> bool;

    /// Detailed comparison. Precondition: `shape_matches(node)` returned
    /// true; violations panic rather than soft-fail.
    fn detail_matches(&self, node: &PlanNode) -> MatchResult;
}

/// Matches a remote-source node against an expected fragment list and
/// binds each declared local symbol to the node's output column at its
/// mapped index.
#[derive(Debug, Clone)]
pub struct RemoteSourceMatcher {
    source_fragments: Vec<FragmentId>,
    aliases: BTreeMap<String, usize>,
}

impl RemoteSourceMatcher {
    pub fn new(source_fragments: Vec<FragmentId>, aliases: Vec<(String, usize)>) -> Self {
        Self {
            source_fragments,
            aliases: aliases.into_iter().collect(),
        }
    }

    /// Matcher verifying the contract an exchange edge declares.
    pub fn from_edge(edge: &ExchangeEdge) -> Self {
        Self {
            source_fragments: edge.source_fragments().to_vec(),
            aliases: edge.aliases().clone(),
        }
    }
}

impl Matcher for RemoteSourceMatcher {
    fn shape_matches(&self, node: &PlanNode) -> bool {
        node.is_remote_source()
    }

    fn detail_matches(&self, node: &PlanNode) -> MatchResult {
        assert!(
            self.shape_matches(node),
            "detail_matches invoked on a node that fails the shape check"
        );
        let PlanNode::RemoteSource {
            source_fragments,
            schema,
        } = node
        else {
            unreachable!("shape check admitted a non-remote-source node");
        };

        if source_fragments != &self.source_fragments {
            return MatchResult::NoMatch;
        }

        let mut bound = SymbolAliases::default();
        for (symbol, &index) in &self.aliases {
            let field = schema.field(index).unwrap_or_else(|| {
                panic!(
                    "alias '{symbol}' maps to column {index}, outside the node's output (arity {})",
                    schema.arity()
                )
            });
            bound.insert(
                symbol.clone(),
                ColumnHandle {
                    index,
                    name: field.name.clone(),
                },
            );
        }
        MatchResult::Match(bound)
    }
}
