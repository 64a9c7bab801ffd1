//! Accumulator state: lifecycle, representations, and the object-safe
//! bridge used by function descriptors.
//!
//! One merge algorithm, many layouts: `MaxState<T>` instantiated at a
//! native width (`i64`, `f64`, ...) is the specialized nullable-scalar
//! path with no boxing per row; `MaxState<Scalar>` is the generic boxed
//! path able to carry any value type. Both share the same null-identity
//! and ordering logic, so combining partial states is associative and
//! commutative regardless of the representation chosen.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use fracture_core::error::{Error, Result};
use fracture_core::types::{scalar_cmp, Scalar};

/// Lifecycle of one accumulator instance.
///
/// `Uninitialized` → (`input`/`combine`) → `Accumulating` → (`output`) →
/// `Finalized`. `Accumulating` is re-entrant. `output` is legal from
/// `Uninitialized` (yields the null identity) or `Accumulating`.
/// After `Finalized`, only `reset` is valid; any other call is a
/// programming-contract violation and panics. `reset` returns the
/// instance to `Uninitialized` so it can be pooled across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Accumulating,
    Finalized,
}

/// A value one state representation can hold.
///
/// `greater` is the ordering MAX merges under. The native-width
/// implementations compare directly; the `Scalar` implementation goes
/// through the engine-wide total order.
pub trait StateValue: Clone + fmt::Debug + Send + 'static {
    fn greater(&self, other: &Self) -> bool;
    /// Convert from a row value. The factory guarantees the input type at
    /// registration time, so a mismatch here is an internal invariant.
    fn from_scalar(s: &Scalar) -> Result<Self>;
    fn to_scalar(&self) -> Scalar;
}

macro_rules! primitive_state_value {
    ($ty:ty, $variant:ident) => {
        impl StateValue for $ty {
            fn greater(&self, other: &Self) -> bool {
                self > other
            }
            fn from_scalar(s: &Scalar) -> Result<Self> {
                match s {
                    Scalar::$variant(v) => Ok(v.clone()),
                    other => Err(Error::Invariant(format!(
                        "expected {} input, got {:?}",
                        stringify!($variant),
                        other
                    ))),
                }
            }
            fn to_scalar(&self) -> Scalar {
                Scalar::$variant(self.clone())
            }
        }
    };
}

primitive_state_value!(bool, Bool);
primitive_state_value!(i32, I32);
primitive_state_value!(i64, I64);

// Floats order NaN last, matching the engine-wide scalar order.
macro_rules! float_state_value {
    ($ty:ty, $variant:ident) => {
        impl StateValue for $ty {
            fn greater(&self, other: &Self) -> bool {
                if self.is_nan() {
                    return !other.is_nan();
                }
                if other.is_nan() {
                    return false;
                }
                self > other
            }
            fn from_scalar(s: &Scalar) -> Result<Self> {
                match s {
                    Scalar::$variant(v) => Ok(*v),
                    other => Err(Error::Invariant(format!(
                        "expected {} input, got {:?}",
                        stringify!($variant),
                        other
                    ))),
                }
            }
            fn to_scalar(&self) -> Scalar {
                Scalar::$variant(*self)
            }
        }
    };
}

float_state_value!(f32, F32);
float_state_value!(f64, F64);

impl StateValue for Scalar {
    fn greater(&self, other: &Self) -> bool {
        scalar_cmp(self, other) == Ordering::Greater
    }
    fn from_scalar(s: &Scalar) -> Result<Self> {
        Ok(s.clone())
    }
    fn to_scalar(&self) -> Scalar {
        self.clone()
    }
}

/// MAX accumulator over one representation.
///
/// The value slot and null flag collapse into `Option<T>`; for the
/// primitive instantiations that is a native-width nullable scalar with
/// no heap allocation. Exclusively owned by one operator instance; never
/// shared across threads while mutable.
#[derive(Debug, Clone)]
pub struct MaxState<T: StateValue> {
    value: Option<T>,
    phase: Phase,
}

impl<T: StateValue> Default for MaxState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StateValue> MaxState<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            phase: Phase::Uninitialized,
        }
    }

    /// Rebuild a partial state from a deserialized wire value. The state
    /// lands in `Accumulating`: it represents rows already observed
    /// elsewhere, even when the value is the null identity.
    pub fn from_partial(value: Option<T>) -> Self {
        Self {
            value,
            phase: Phase::Accumulating,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Non-finalizing read of the current value; `None` is the null flag.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    fn touch(&mut self) {
        assert!(
            self.phase != Phase::Finalized,
            "max accumulator mutated after finalization; call reset() before reuse"
        );
        self.phase = Phase::Accumulating;
    }

    /// Fold one row's value into the state.
    pub fn update(&mut self, v: T) {
        self.touch();
        match &self.value {
            Some(cur) if !v.greater(cur) => {}
            _ => self.value = Some(v),
        }
    }

    /// Merge another partial state into this one. Null is the identity:
    /// a null `other` leaves the value unchanged, a null `self` adopts
    /// `other`'s value, and otherwise the greater value wins.
    pub fn merge(&mut self, other: &Self) {
        self.touch();
        if let Some(v) = &other.value {
            match &self.value {
                Some(cur) if !v.greater(cur) => {}
                _ => self.value = Some(v.clone()),
            }
        }
    }

    /// Materialize the final value and finalize the instance. `None` when
    /// no non-null row ever reached this group.
    pub fn finish(&mut self) -> Option<T> {
        assert!(
            self.phase != Phase::Finalized,
            "max accumulator finalized twice; call reset() before reuse"
        );
        self.phase = Phase::Finalized;
        self.value.clone()
    }

    /// Clear value and null flag, returning to `Uninitialized`. Valid from
    /// any phase; used to pool instances across successive groups.
    pub fn reset(&mut self) {
        self.value = None;
        self.phase = Phase::Uninitialized;
    }
}

/// Object-safe view over an accumulator so descriptors can own states of
/// any representation behind one pointer. Row-level calls cost exactly
/// one virtual dispatch.
pub trait AccumulatorState: fmt::Debug + Send {
    fn phase(&self) -> Phase;

    /// Feed one input row's value. Null inputs are skipped per SQL
    /// aggregate semantics but still move the state to `Accumulating`.
    fn input(&mut self, value: &Scalar) -> Result<()>;

    /// Merge another partial state of the same representation. Combining
    /// across representations is an internal invariant violation.
    fn combine(&mut self, other: &dyn AccumulatorState) -> Result<()>;

    /// Finalize and return the output value (`Scalar::Null` for the null
    /// identity). No call other than `reset` is valid afterwards.
    fn output(&mut self) -> Scalar;

    fn reset(&mut self);

    /// Non-finalizing snapshot of the current value, used by serializers.
    fn snapshot(&self) -> Scalar;

    fn as_any(&self) -> &dyn Any;
}

impl<T: StateValue> AccumulatorState for MaxState<T> {
    fn phase(&self) -> Phase {
        MaxState::phase(self)
    }

    fn input(&mut self, value: &Scalar) -> Result<()> {
        if value.is_null() {
            self.touch();
            return Ok(());
        }
        let v = T::from_scalar(value)?;
        self.update(v);
        Ok(())
    }

    fn combine(&mut self, other: &dyn AccumulatorState) -> Result<()> {
        let other = other.as_any().downcast_ref::<Self>().ok_or_else(|| {
            Error::Invariant("combine across mismatched state representations".into())
        })?;
        self.merge(other);
        Ok(())
    }

    fn output(&mut self) -> Scalar {
        self.finish().map(|v| v.to_scalar()).unwrap_or(Scalar::Null)
    }

    fn reset(&mut self) {
        MaxState::reset(self);
    }

    fn snapshot(&self) -> Scalar {
        self.value
            .as_ref()
            .map(StateValue::to_scalar)
            .unwrap_or(Scalar::Null)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
