//! State serializers and the intermediate (wire) type contract.
//!
//! A serializer is paired 1:1 with its descriptor's declared wire type.
//! The boxed serializer encodes a snapshot able to carry any output type
//! plus a null marker; the native serializer puts the state's scalar on
//! the wire verbatim, skipping the encoding pass entirely. The law both
//! must uphold: deserialize(serialize(s)) is observationally equal to `s`
//! under `output()`, including the null state.

use std::fmt;

use serde::{Deserialize, Serialize};

use fracture_core::error::{Error, Result};
use fracture_core::schema::DataType;
use fracture_core::types::Scalar;

use crate::state::{AccumulatorState, MaxState, StateValue};

/// Wire (intermediate) type of a function descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireType {
    /// Generic boxed encoding, sized to accommodate any group.
    Boxed,
    /// The wire value is a scalar of this type verbatim.
    Native(DataType),
}

/// Encodes/decodes one accumulator state to/from a wire value.
///
/// `serialize` snapshots without finalizing; `deserialize` rebuilds a
/// partial state in `Accumulating`, ready to be combined.
pub trait StateSerializer: fmt::Debug + Send + Sync {
    /// Must equal the owning descriptor's declared intermediate type.
    fn wire_type(&self) -> WireType;

    fn serialize(&self, state: &dyn AccumulatorState) -> Result<Scalar>;

    fn deserialize(&self, wire: &Scalar) -> Result<Box<dyn AccumulatorState>>;
}

/// Default serializer: JSON-encoded snapshot in a binary scalar. One
/// encoding for every output type, null marker included.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxedStateSerializer;

impl StateSerializer for BoxedStateSerializer {
    fn wire_type(&self) -> WireType {
        WireType::Boxed
    }

    fn serialize(&self, state: &dyn AccumulatorState) -> Result<Scalar> {
        let snapshot = state.snapshot();
        Ok(Scalar::Bin(serde_json::to_vec(&snapshot)?))
    }

    fn deserialize(&self, wire: &Scalar) -> Result<Box<dyn AccumulatorState>> {
        let Scalar::Bin(bytes) = wire else {
            return Err(Error::Invariant(format!(
                "boxed wire value must be binary, got {wire:?}"
            )));
        };
        let snapshot: Scalar = serde_json::from_slice(bytes)?;
        let value = if snapshot.is_null() {
            None
        } else {
            Some(snapshot)
        };
        Ok(Box::new(MaxState::<Scalar>::from_partial(value)))
    }
}

/// Override serializer: the wire value is the state's scalar itself.
/// Only legal when the function's merge is closed over the input type
/// (true for MAX/MIN), and only for the native-width primitives.
#[derive(Debug, Clone, Copy)]
pub struct NativeStateSerializer {
    value_type: DataType,
}

impl NativeStateSerializer {
    pub fn new(value_type: DataType) -> Result<Self> {
        match value_type {
            DataType::Boolean
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64 => Ok(Self { value_type }),
            other => Err(Error::Config(format!(
                "no native wire representation for {other:?}"
            ))),
        }
    }

    pub fn value_type(&self) -> DataType {
        self.value_type
    }

    fn rebuild<T: StateValue>(wire: &Scalar) -> Result<Box<dyn AccumulatorState>> {
        let value = if wire.is_null() {
            None
        } else {
            Some(T::from_scalar(wire)?)
        };
        Ok(Box::new(MaxState::<T>::from_partial(value)))
    }
}

impl StateSerializer for NativeStateSerializer {
    fn wire_type(&self) -> WireType {
        WireType::Native(self.value_type)
    }

    fn serialize(&self, state: &dyn AccumulatorState) -> Result<Scalar> {
        let snapshot = state.snapshot();
        match snapshot.data_type() {
            None => Ok(Scalar::Null),
            Some(dt) if dt == self.value_type => Ok(snapshot),
            Some(dt) => Err(Error::Invariant(format!(
                "state value type {dt:?} does not match wire type {:?}",
                self.value_type
            ))),
        }
    }

    fn deserialize(&self, wire: &Scalar) -> Result<Box<dyn AccumulatorState>> {
        match self.value_type {
            DataType::Boolean => Self::rebuild::<bool>(wire),
            DataType::Int32 => Self::rebuild::<i32>(wire),
            DataType::Int64 => Self::rebuild::<i64>(wire),
            DataType::Float32 => Self::rebuild::<f32>(wire),
            DataType::Float64 => Self::rebuild::<f64>(wire),
            other => Err(Error::Invariant(format!(
                "native serializer constructed for unsupported type {other:?}"
            ))),
        }
    }
}
