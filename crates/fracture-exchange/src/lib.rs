#![forbid(unsafe_code)]
//! fracture-exchange: the runtime side of cross-fragment data flow.
//!
//! A fragment accumulates per-group states locally (`PartialAggregator`),
//! serializes them onto the wire, and ships them through an
//! `ExchangeTransport`. The downstream fragment opens the exchange by
//! edge, deserializes incoming partial states, and combines them in
//! arrival order (`FinalAggregator`). Nothing here blocks on network I/O
//! directly; the transport is a trait with a bounded retry wrapper.

pub mod merge;
pub mod partial;
pub mod transport;

pub use merge::FinalAggregator;
pub use partial::PartialAggregator;
pub use transport::{
    open_exchange, ExchangeStream, ExchangeTransport, InMemoryExchange, RetryingTransport,
};

/// Wire batch column names produced by the partial side and expected by
/// the final side.
pub const GROUP_COLUMN: &str = "group";
pub const STATE_COLUMN: &str = "state";
