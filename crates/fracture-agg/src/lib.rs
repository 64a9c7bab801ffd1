#![forbid(unsafe_code)]
//! fracture-agg: per-group accumulator state for aggregate functions.
//!
//! Design intent:
//! - Row-level operations (`input`/`combine`) cost one virtual call and no
//!   boxing on the specialized representations.
//! - The merge algorithm is written once, generic over the representation;
//!   variants differ only in which state/serializer pair they bind.
//! - Descriptors are immutable and shared read-only across worker threads;
//!   only state instances are mutable, and each is exclusively owned.

pub mod factory;
pub mod function;
pub mod serializer;
pub mod state;

pub use factory::{StateFactory, StateRepr};
pub use function::{AggregateFunction, FunctionRegistry, FunctionSpec, IntermediatePolicy};
pub use serializer::{BoxedStateSerializer, NativeStateSerializer, StateSerializer, WireType};
pub use state::{AccumulatorState, MaxState, Phase, StateValue};
