//! Signal Conventions and Host Interface
//!
//! Port definitions, runtime port values, parameter and light descriptions,
//! and the type-erased [`GraphModule`] trait a host uses to drive a module
//! one frame at a time without knowing its concrete type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a port within a module
pub type PortId = u32;

/// Unique identifier for a parameter within a module
pub type ParamId = u32;

/// Semantic signal classification following hardware modular conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    /// Unipolar control voltage, 0–10V
    CvUnipolar,

    /// Pitch CV following 1V/octave standard, 0V = C4
    VoltPerOctave,
}

/// Definition of a single port (input or output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDef {
    /// Unique identifier within the module
    pub id: PortId,

    /// Human-readable name (e.g., "voct", "out1")
    pub name: String,

    /// Signal type for validation and UI hints
    pub kind: SignalKind,

    /// Value used when no cable is connected (normalled voltage)
    pub default: f64,
}

impl PortDef {
    pub fn new(id: PortId, name: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            default: 0.0,
        }
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }
}

/// Specification of all ports for a module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSpec {
    pub inputs: Vec<PortDef>,
    pub outputs: Vec<PortDef>,
}

impl PortSpec {
    pub fn input_by_name(&self, name: &str) -> Option<&PortDef> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output_by_name(&self, name: &str) -> Option<&PortDef> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn input_by_id(&self, id: PortId) -> Option<&PortDef> {
        self.inputs.iter().find(|p| p.id == id)
    }

    /// Value of an input this frame, falling back to its normalled default
    pub fn input_value(&self, inputs: &PortValues, id: PortId) -> f64 {
        let default = self.input_by_id(id).map_or(0.0, |p| p.default);
        inputs.get_or(id, default)
    }
}

/// Runtime port values container
///
/// An input absent from the map is unpatched.
#[derive(Debug, Clone, Default)]
pub struct PortValues {
    pub values: HashMap<PortId, f64>,
}

impl PortValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PortId) -> Option<f64> {
        self.values.get(&id).copied()
    }

    pub fn get_or(&self, id: PortId, default: f64) -> f64 {
        self.values.get(&id).copied().unwrap_or(default)
    }

    pub fn set(&mut self, id: PortId, value: f64) {
        self.values.insert(id, value);
    }
}

/// Parameter range mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamRange {
    /// Continuous knob, clamped to (min, max)
    Linear { min: f64, max: f64 },

    /// Momentary button, pressed at or above `threshold`
    Momentary { threshold: f64 },
}

impl ParamRange {
    pub fn clamp(&self, value: f64) -> f64 {
        match self {
            ParamRange::Linear { min, max } => value.clamp(*min, *max),
            ParamRange::Momentary { .. } => value.clamp(0.0, 1.0),
        }
    }

    /// Whether a momentary control is held; knobs are never pressed
    pub fn is_pressed(&self, value: f64) -> bool {
        match self {
            ParamRange::Linear { .. } => false,
            ParamRange::Momentary { threshold } => value >= *threshold,
        }
    }
}

/// Parameter definition for UI binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub id: ParamId,
    pub name: String,
    pub range: ParamRange,
}

impl ParamDef {
    pub fn new(id: ParamId, name: impl Into<String>, range: ParamRange) -> Self {
        Self {
            id,
            name: name.into(),
            range,
        }
    }
}

/// Type-erased module interface driven by a host, one frame per `tick`
pub trait GraphModule: Send + Sync {
    /// Returns the module's port specification
    fn port_spec(&self) -> &PortSpec;

    /// Process one frame given port values
    fn tick(&mut self, inputs: &PortValues, outputs: &mut PortValues);

    /// Reset internal state, keeping stored programs
    fn reset(&mut self);

    /// Get parameter definitions for UI binding
    fn params(&self) -> &[ParamDef] {
        &[]
    }

    /// Get a parameter value
    fn get_param(&self, _id: ParamId) -> Option<f64> {
        None
    }

    /// Set a parameter value
    fn set_param(&mut self, _id: ParamId, _value: f64) {}

    /// Number of indicator lights
    fn light_count(&self) -> usize {
        0
    }

    /// Indicator brightness in -1..=1; the sign selects the LED colour
    fn light(&self, _index: usize) -> Option<f64> {
        None
    }

    /// Get module type identifier for serialization
    fn type_id(&self) -> &'static str {
        "unknown"
    }

    /// Serialize module state
    fn serialize_state(&self) -> Option<serde_json::Value> {
        None
    }

    /// Restore module state
    fn deserialize_state(&mut self, _state: &serde_json::Value) -> crate::Result<()> {
        Ok(())
    }
}
