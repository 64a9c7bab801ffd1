#![forbid(unsafe_code)]
//! fracture-core: value/schema types, strongly-typed IDs, configuration,
//! and the error taxonomy shared by the aggregation and exchange layers.
//!
//! Design intent:
//! - Pure data and cheap helpers only; no I/O, no async, no registries.
//! - Everything here is immutable or exclusively owned by its caller, so
//!   the crate is trivially shareable across worker threads.

pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod schema;
pub mod types;
