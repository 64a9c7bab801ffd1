//! Convenient re-exports for downstream crates.

pub use crate::config::{EngineConfig, RetryPolicy};
pub use crate::error::{Error, Result};
pub use crate::id::{FragmentId, OperatorId, QueryId};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{Column, GroupKey, RowBatch, Scalar};
