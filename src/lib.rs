#![forbid(unsafe_code)]
//! fracture: aggregation-state and cross-fragment exchange core for a
//! distributed SQL execution engine.
//!
//! Facade over the workspace crates; see the members for the real
//! surface area:
//! - `fracture-core` — values, schemas, IDs, errors, config
//! - `fracture-agg` — accumulator states, factories, serializers,
//!   function descriptors
//! - `fracture-plan` — plan nodes, fragments, exchange edges, assertions
//! - `fracture-exchange` — transport, partial/final aggregation drivers

pub use fracture_agg::{
    AccumulatorState, AggregateFunction, FunctionRegistry, FunctionSpec, IntermediatePolicy,
    MaxState, Phase, StateFactory, StateRepr, StateSerializer, WireType,
};
pub use fracture_core::config::{EngineConfig, RetryPolicy};
pub use fracture_core::error::{Error, Result};
pub use fracture_core::id::{FragmentId, OperatorId, QueryId};
pub use fracture_core::schema::{DataType, Field, Schema};
pub use fracture_core::types::{Column, GroupKey, RowBatch, Scalar};
pub use fracture_exchange::{
    open_exchange, ExchangeStream, ExchangeTransport, FinalAggregator, InMemoryExchange,
    PartialAggregator, RetryingTransport,
};
pub use fracture_plan::{
    validate_edge, validate_plan, AggregateMode, ExchangeEdge, MatchResult, Matcher, PlanFragment,
    PlanNode, RemoteSourceMatcher, SymbolAliases,
};
