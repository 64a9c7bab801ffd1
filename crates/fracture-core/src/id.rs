//! Strongly-typed identifiers used across the engine.
//!
//! Downstream crates (plan, exchange, agg) should *not* use raw integers
//! for IDs. Fragment identifiers are opaque and unique within one query;
//! nothing in this core derives meaning from their numeric value.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(v: u64) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

new_id!(QueryId);
new_id!(FragmentId);
new_id!(OperatorId);
