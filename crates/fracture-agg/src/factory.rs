//! State specialization registry and the per-descriptor factory.
//!
//! The registry maps `(input type, representation)` to a state
//! constructor and is built exactly once at startup. Resolution happens
//! at function-registration time; asking for an unregistered
//! specialization is a configuration error there, never at row time.
//! After resolution, creating a group's state is one function-pointer
//! call.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use fracture_core::error::{Error, Result};
use fracture_core::schema::DataType;
use fracture_core::types::Scalar;

use crate::state::{AccumulatorState, MaxState, StateValue};

/// Which in-memory representation a descriptor binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateRepr {
    /// Generic boxed path: the value slot holds a `Scalar` of any type.
    Boxed,
    /// Nullable scalar of the input type's native width; no boxing.
    NativeScalar,
}

type StateCtor = fn() -> Box<dyn AccumulatorState>;

fn ctor<T: StateValue>() -> Box<dyn AccumulatorState> {
    Box::new(MaxState::<T>::new())
}

static BUILTINS: Lazy<HashMap<(DataType, StateRepr), StateCtor>> = Lazy::new(|| {
    use DataType::*;
    let mut m: HashMap<(DataType, StateRepr), StateCtor> = HashMap::new();

    // The boxed representation carries any input type.
    for dt in [Boolean, Int32, Int64, Float32, Float64, Utf8, Binary] {
        m.insert((dt, StateRepr::Boxed), ctor::<Scalar>);
    }

    // Native-width specializations for the primitive types. Utf8/Binary
    // stay on the boxed path.
    m.insert((Boolean, StateRepr::NativeScalar), ctor::<bool>);
    m.insert((Int32, StateRepr::NativeScalar), ctor::<i32>);
    m.insert((Int64, StateRepr::NativeScalar), ctor::<i64>);
    m.insert((Float32, StateRepr::NativeScalar), ctor::<f32>);
    m.insert((Float64, StateRepr::NativeScalar), ctor::<f64>);

    m
});

/// Resolved constructor for one `(input type, representation)` pair.
#[derive(Clone, Copy)]
pub struct StateFactory {
    input_type: DataType,
    repr: StateRepr,
    ctor: StateCtor,
}

impl fmt::Debug for StateFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateFactory")
            .field("input_type", &self.input_type)
            .field("repr", &self.repr)
            .finish()
    }
}

impl StateFactory {
    /// Look up the specialization for `input_type` under `repr`.
    /// Unregistered pairs fail here, at registration time.
    pub fn resolve(input_type: DataType, repr: StateRepr) -> Result<Self> {
        let ctor = BUILTINS
            .get(&(input_type, repr))
            .copied()
            .ok_or_else(|| {
                Error::Config(format!(
                    "no {repr:?} state specialization registered for {input_type:?}"
                ))
            })?;
        Ok(Self {
            input_type,
            repr,
            ctor,
        })
    }

    /// Fresh state for a newly observed group.
    pub fn create(&self) -> Box<dyn AccumulatorState> {
        (self.ctor)()
    }

    pub fn input_type(&self) -> DataType {
        self.input_type
    }

    pub fn repr(&self) -> StateRepr {
        self.repr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_native_primitive() {
        let f = StateFactory::resolve(DataType::Int64, StateRepr::NativeScalar).unwrap();
        let mut s = f.create();
        s.input(&Scalar::I64(42)).unwrap();
        assert_eq!(s.output(), Scalar::I64(42));
    }

    #[test]
    fn unregistered_specialization_is_config_error() {
        let err = StateFactory::resolve(DataType::Utf8, StateRepr::NativeScalar).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn boxed_covers_every_type() {
        for dt in [
            DataType::Boolean,
            DataType::Int32,
            DataType::Int64,
            DataType::Float32,
            DataType::Float64,
            DataType::Utf8,
            DataType::Binary,
        ] {
            assert!(StateFactory::resolve(dt, StateRepr::Boxed).is_ok());
        }
    }
}
