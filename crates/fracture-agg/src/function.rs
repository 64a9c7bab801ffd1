//! Aggregate function descriptors and variant registration.
//!
//! A descriptor composes a state factory, a serializer, and the declared
//! input/intermediate/output types into one immutable, named function.
//! Variants of the same logical function differ only in which
//! factory/serializer pair they bind; choosing one is a registration-time
//! configuration decision, never a per-row one.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fracture_core::error::{Error, Result};
use fracture_core::schema::DataType;

use crate::factory::{StateFactory, StateRepr};
use crate::serializer::{BoxedStateSerializer, NativeStateSerializer, StateSerializer, WireType};
use crate::state::AccumulatorState;

/// Intermediate (wire) type policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntermediatePolicy {
    /// Generic boxed wire representation of the output type.
    Default,
    /// The wire type equals the input type verbatim. Only sound when the
    /// merge is algebraically closed over the input type.
    InputType,
}

/// Registration contract for one aggregate function variant: the only
/// configuration surface for selecting among specializations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub input_type: DataType,
    pub output_type: DataType,
    pub intermediate: IntermediatePolicy,
    pub repr: StateRepr,
}

/// Immutable aggregate function descriptor. Safely shared read-only
/// across every thread executing a query; only the states it creates are
/// mutable, and those are exclusively owned.
#[derive(Debug, Clone)]
pub struct AggregateFunction {
    name: String,
    input_type: DataType,
    output_type: DataType,
    wire_type: WireType,
    repr: StateRepr,
    factory: StateFactory,
    serializer: Arc<dyn StateSerializer>,
}

impl AggregateFunction {
    /// Build a descriptor from a spec, deriving the paired serializer
    /// from the intermediate policy.
    pub fn from_spec(spec: &FunctionSpec) -> Result<Self> {
        let wire_type = match spec.intermediate {
            IntermediatePolicy::Default => WireType::Boxed,
            IntermediatePolicy::InputType => WireType::Native(spec.input_type),
        };
        let serializer: Arc<dyn StateSerializer> = match wire_type {
            WireType::Boxed => Arc::new(BoxedStateSerializer),
            WireType::Native(dt) => Arc::new(NativeStateSerializer::new(dt)?),
        };
        Self::compose(spec, serializer)
    }

    /// Compose a descriptor with an explicit serializer. All pairing
    /// rules are checked here, at registration time:
    /// - the serializer's wire type must equal the declared one;
    /// - a native wire type must equal the input type;
    /// - the wire type and state representation must rebuild each other
    ///   (boxed wire ↔ boxed state, native wire ↔ native state).
    pub fn compose(spec: &FunctionSpec, serializer: Arc<dyn StateSerializer>) -> Result<Self> {
        let wire_type = match spec.intermediate {
            IntermediatePolicy::Default => WireType::Boxed,
            IntermediatePolicy::InputType => WireType::Native(spec.input_type),
        };

        if serializer.wire_type() != wire_type {
            return Err(Error::Config(format!(
                "function '{}': serializer wire type {:?} does not match declared intermediate type {:?}",
                spec.name,
                serializer.wire_type(),
                wire_type
            )));
        }
        if let WireType::Native(dt) = wire_type {
            if dt != spec.input_type {
                return Err(Error::Config(format!(
                    "function '{}': native wire type {:?} must equal the input type {:?}",
                    spec.name, dt, spec.input_type
                )));
            }
        }
        match (wire_type, spec.repr) {
            (WireType::Boxed, StateRepr::Boxed) => {}
            (WireType::Native(_), StateRepr::NativeScalar) => {}
            (wt, repr) => {
                return Err(Error::Config(format!(
                    "function '{}': wire type {wt:?} cannot rebuild a {repr:?} state",
                    spec.name
                )));
            }
        }

        let factory = StateFactory::resolve(spec.input_type, spec.repr)?;

        Ok(Self {
            name: spec.name.clone(),
            input_type: spec.input_type,
            output_type: spec.output_type,
            wire_type,
            repr: spec.repr,
            factory,
            serializer,
        })
    }

    /// MAX over `input`, generic boxed state and wire representation.
    pub fn max(input: DataType) -> Result<Self> {
        Self::from_spec(&FunctionSpec {
            name: "max".into(),
            input_type: input,
            output_type: input,
            intermediate: IntermediatePolicy::Default,
            repr: StateRepr::Boxed,
        })
    }

    /// MAX variant binding the specialized nullable-scalar state with the
    /// wire type overridden to the input type, skipping the generic boxed
    /// conversion on both serialize and deserialize.
    pub fn max_alternative(input: DataType) -> Result<Self> {
        Self::from_spec(&FunctionSpec {
            name: "max".into(),
            input_type: input,
            output_type: input,
            intermediate: IntermediatePolicy::InputType,
            repr: StateRepr::NativeScalar,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_type(&self) -> DataType {
        self.input_type
    }

    pub fn output_type(&self) -> DataType {
        self.output_type
    }

    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    pub fn repr(&self) -> StateRepr {
        self.repr
    }

    /// Fresh accumulator for a newly observed group.
    pub fn new_state(&self) -> Box<dyn AccumulatorState> {
        self.factory.create()
    }

    pub fn serializer(&self) -> &dyn StateSerializer {
        self.serializer.as_ref()
    }
}

/// Name → descriptor map. Which variant a name resolves to is decided
/// here once; row-level code never consults the registry.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<AggregateFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: AggregateFunction) -> Result<()> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(Error::Config(format!(
                "aggregate function '{name}' registered twice"
            )));
        }
        self.functions.insert(name, Arc::new(function));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<AggregateFunction>> {
        self.functions.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fracture_core::types::Scalar;

    #[test]
    fn default_max_uses_boxed_wire_type() {
        let f = AggregateFunction::max(DataType::Int64).unwrap();
        assert_eq!(f.wire_type(), WireType::Boxed);
        assert_eq!(f.repr(), StateRepr::Boxed);
    }

    #[test]
    fn alternative_max_overrides_intermediate_to_input_type() {
        let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();
        assert_eq!(f.wire_type(), WireType::Native(DataType::Int64));
        assert_eq!(f.input_type(), DataType::Int64);
        assert_eq!(f.repr(), StateRepr::NativeScalar);
    }

    #[test]
    fn serializer_wire_type_mismatch_is_config_error() {
        let spec = FunctionSpec {
            name: "max".into(),
            input_type: DataType::Int64,
            output_type: DataType::Int64,
            intermediate: IntermediatePolicy::Default,
            repr: StateRepr::Boxed,
        };
        let native = Arc::new(NativeStateSerializer::new(DataType::Int64).unwrap());
        let err = AggregateFunction::compose(&spec, native).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn alternative_max_for_string_is_config_error() {
        // No native specialization for Utf8; only the boxed path exists.
        let err = AggregateFunction::max_alternative(DataType::Utf8).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut reg = FunctionRegistry::new();
        reg.register(AggregateFunction::max(DataType::Int64).unwrap())
            .unwrap();
        let err = reg
            .register(AggregateFunction::max_alternative(DataType::Int64).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn descriptor_states_flow_end_to_end() {
        let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();
        let mut s = f.new_state();
        s.input(&Scalar::I64(3)).unwrap();
        s.input(&Scalar::I64(7)).unwrap();
        let wire = f.serializer().serialize(s.as_ref()).unwrap();
        let mut back = f.serializer().deserialize(&wire).unwrap();
        assert_eq!(back.output(), Scalar::I64(7));
    }
}
