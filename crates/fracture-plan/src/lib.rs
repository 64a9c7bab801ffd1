#![forbid(unsafe_code)]
//! fracture-plan: plan nodes, fragments, and the exchange-edge surface.
//!
//! Only the structure the exchange core needs is modelled here: enough
//! node shape for discriminator checks, fragment addressing, and
//! validation before execution. The optimizer and the full assertion DSL
//! live elsewhere.

pub mod assertions;
pub mod exchange;
pub mod fragment;
pub mod node;
pub mod validate;

pub use assertions::{ColumnHandle, MatchResult, Matcher, RemoteSourceMatcher, SymbolAliases};
pub use exchange::ExchangeEdge;
pub use fragment::PlanFragment;
pub use node::{AggregateMode, PlanNode};
pub use validate::{validate_edge, validate_plan};
