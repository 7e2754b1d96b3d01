//! Serialization and Persistence
//!
//! Module state is stored as JSON. A Chord12 keeps its programs under a
//! single `note_enable` field: a flat, row-major array of `KEYS * SLOTS`
//! integers (index = key * 25 + slot), each 0 or 1.
//!
//! Loading is tolerant: a missing field leaves the programs untouched, a
//! short array overwrites only the cells it covers, and any nonzero entry
//! counts as enabled. Whatever was loaded, every key is clamped back to
//! capacity afterwards.

use crate::chord::{ChordBank, KEYS, SLOTS};
use crate::error::{Error, Result};
use crate::modules::{Chord12, Octave};
use crate::port::{GraphModule, PortSpec};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// JSON field holding the Chord12 enable matrix
pub const NOTE_ENABLE_FIELD: &str = "note_enable";

/// Current rack schema version
pub const RACK_VERSION: u32 = 1;

/// Chord bank programs as a JSON state object
pub fn note_enable_state(bank: &ChordBank) -> Value {
    let mut state = Map::new();
    state.insert(NOTE_ENABLE_FIELD.to_string(), json!(bank.to_flat()));
    Value::Object(state)
}

/// Restore chord bank programs from a JSON state object
///
/// Never fails; malformed input degrades to whatever the bank already held.
pub fn load_note_enable(bank: &mut ChordBank, state: &Value) {
    match state.get(NOTE_ENABLE_FIELD) {
        None => debug!("no {} field in state, keeping programs", NOTE_ENABLE_FIELD),
        Some(Value::Array(values)) => {
            let written = bank.load_flat(values.iter().map(is_enabled_value));
            if values.len() != KEYS * SLOTS {
                warn!(
                    "{} has {} entries, expected {}; loaded {}",
                    NOTE_ENABLE_FIELD,
                    values.len(),
                    KEYS * SLOTS,
                    written
                );
            }
        }
        Some(other) => warn!("{} is not an array: {}", NOTE_ENABLE_FIELD, other),
    }
    bank.enforce_capacity_all();
}

fn is_enabled_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n
            .as_i64()
            .map(|i| i != 0)
            .or_else(|| n.as_u64().map(|u| u != 0))
            .unwrap_or(false),
        _ => false,
    }
}

/// Serializable module instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Unique instance name
    pub name: String,

    /// Module type identifier
    pub module_type: String,

    /// Module-specific state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl ModuleDef {
    pub fn new(name: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_type: module_type.into(),
            state: None,
        }
    }
}

/// Serializable set of module instances with their state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackDef {
    /// Schema version for forward compatibility
    pub version: u32,

    pub modules: Vec<ModuleDef>,
}

impl RackDef {
    pub fn new() -> Self {
        Self {
            version: RACK_VERSION,
            modules: vec![],
        }
    }

    pub fn with_module(mut self, module: ModuleDef) -> Self {
        self.modules.push(module);
        self
    }

    /// Snapshot named module instances
    pub fn capture<'a, I>(modules: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a dyn GraphModule)>,
    {
        let modules = modules
            .into_iter()
            .map(|(name, module)| ModuleDef {
                name: name.to_string(),
                module_type: module.type_id().to_string(),
                state: module.serialize_state(),
            })
            .collect();

        Self {
            version: RACK_VERSION,
            modules,
        }
    }

    /// Instantiate every module and restore its state
    pub fn build(&self, registry: &ModuleRegistry) -> Result<Vec<(String, Box<dyn GraphModule>)>> {
        if self.version > RACK_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                supported: RACK_VERSION,
            });
        }

        let mut built = Vec::with_capacity(self.modules.len());
        for def in &self.modules {
            let mut module = registry
                .instantiate(&def.module_type)
                .ok_or_else(|| Error::UnknownModule(def.module_type.clone()))?;
            if let Some(state) = &def.state {
                module.deserialize_state(state)?;
            }
            debug!("restored {} ({})", def.name, def.module_type);
            built.push((def.name.clone(), module));
        }
        Ok(built)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for RackDef {
    fn default() -> Self {
        Self::new()
    }
}

/// Module factory function type
pub type ModuleFactory = Box<dyn Fn() -> Box<dyn GraphModule> + Send + Sync>;

/// Metadata about a registered module type
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub type_id: String,
    pub name: String,
    pub description: String,
    pub port_spec: PortSpec,
    pub light_count: usize,
}

/// Registry of available module types for instantiation
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
    metadata: HashMap<String, ModuleMetadata>,
}

impl ModuleRegistry {
    /// Create a registry holding the built-in modules
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
            metadata: HashMap::new(),
        };

        registry.register_factory(
            "chord12",
            "Chord12",
            "Twelve programmable chords over a quantized root",
            || Box::new(Chord12::new()),
        );

        registry.register_factory(
            "octave",
            "Octave",
            "Chromatic unison fan-out and octave transposer",
            || Box::new(Octave::new()),
        );

        registry
    }

    /// Register a module factory with metadata
    pub fn register_factory<F>(&mut self, type_id: &str, name: &str, description: &str, factory: F)
    where
        F: Fn() -> Box<dyn GraphModule> + Send + Sync + 'static,
    {
        // Get port spec from a temporary instance
        let temp_instance = factory();
        let port_spec = temp_instance.port_spec().clone();
        let light_count = temp_instance.light_count();

        self.factories
            .insert(type_id.to_string(), Box::new(factory));

        self.metadata.insert(
            type_id.to_string(),
            ModuleMetadata {
                type_id: type_id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                port_spec,
                light_count,
            },
        );
    }

    /// Instantiate a module by type ID
    pub fn instantiate(&self, type_id: &str) -> Option<Box<dyn GraphModule>> {
        self.factories.get(type_id).map(|f| f())
    }

    /// List all registered module types
    pub fn list_modules(&self) -> impl Iterator<Item = &ModuleMetadata> {
        self.metadata.values()
    }

    /// Get metadata for a specific module type
    pub fn get_metadata(&self, type_id: &str) -> Option<&ModuleMetadata> {
        self.metadata.get(type_id)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::CAPACITY;

    #[test]
    fn test_note_enable_round_trip() {
        let mut bank = ChordBank::new();
        bank.set_enabled(0, 0, true);
        bank.set_enabled(3, 7, true);
        bank.set_enabled(11, 24, true);

        let state = note_enable_state(&bank);
        assert_eq!(state[NOTE_ENABLE_FIELD].as_array().unwrap().len(), 300);
        assert_eq!(state[NOTE_ENABLE_FIELD][3 * 25 + 7], 1);

        let mut restored = ChordBank::new();
        load_note_enable(&mut restored, &state);
        assert_eq!(restored.to_flat(), bank.to_flat());
    }

    #[test]
    fn test_load_missing_field_keeps_programs() {
        let mut bank = ChordBank::new();
        bank.set_enabled(2, 2, true);
        load_note_enable(&mut bank, &json!({}));
        assert!(bank.is_enabled(2, 2));

        load_note_enable(&mut bank, &json!({ "note_enable": "garbage" }));
        assert!(bank.is_enabled(2, 2));

        load_note_enable(&mut bank, &Value::Null);
        assert!(bank.is_enabled(2, 2));
    }

    #[test]
    fn test_load_nonzero_is_enabled() {
        let mut bank = ChordBank::new();
        load_note_enable(&mut bank, &json!({ "note_enable": [5, 0, -1, true, "x", 0.5] }));
        assert!(bank.is_enabled(0, 0));
        assert!(!bank.is_enabled(0, 1));
        assert!(bank.is_enabled(0, 2));
        assert!(bank.is_enabled(0, 3));
        assert!(!bank.is_enabled(0, 4));
        assert!(!bank.is_enabled(0, 5));
    }

    #[test]
    fn test_load_large_unsigned_is_enabled() {
        let mut bank = ChordBank::new();
        load_note_enable(&mut bank, &json!({ "note_enable": [u64::MAX, 1u64 << 63, 1, 0] }));
        assert!(bank.is_enabled(0, 0));
        assert!(bank.is_enabled(0, 1));
        assert!(bank.is_enabled(0, 2));
        assert!(!bank.is_enabled(0, 3));
    }

    #[test]
    fn test_load_all_ones_clamps_every_row() {
        let mut bank = ChordBank::new();
        load_note_enable(&mut bank, &json!({ "note_enable": vec![1; 400] }));
        for key in 0..KEYS {
            assert_eq!(bank.enabled_count(key), CAPACITY);
        }
    }

    #[test]
    fn test_rack_round_trip() {
        let mut chord = Chord12::new();
        chord.bank_mut().set_enabled(4, 0, true);
        chord.bank_mut().set_enabled(4, 7, true);
        let octave = Octave::new();

        let rack = RackDef::capture([
            ("chords", &chord as &dyn GraphModule),
            ("spread", &octave as &dyn GraphModule),
        ]);
        let json = rack.to_json().unwrap();
        let loaded = RackDef::from_json(&json).unwrap();
        assert_eq!(loaded.modules.len(), 2);
        assert!(loaded.modules[1].state.is_none());

        let built = loaded.build(&ModuleRegistry::new()).unwrap();
        assert_eq!(built[0].0, "chords");
        assert_eq!(built[0].1.type_id(), "chord12");
        assert_eq!(built[0].1.serialize_state(), chord.serialize_state());
        assert_eq!(built[1].1.type_id(), "octave");
    }

    #[test]
    fn test_rack_unknown_module() {
        let rack = RackDef::new().with_module(ModuleDef::new("x", "vco"));
        let err = rack.build(&ModuleRegistry::new()).err().unwrap();
        assert!(matches!(err, Error::UnknownModule(ref t) if t == "vco"));
    }

    #[test]
    fn test_rack_future_version() {
        let mut rack = RackDef::new();
        rack.version = RACK_VERSION + 1;
        assert!(matches!(
            rack.build(&ModuleRegistry::new()),
            Err(Error::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_rack_invalid_json() {
        assert!(matches!(RackDef::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_registry_metadata() {
        let registry = ModuleRegistry::new();
        assert_eq!(registry.list_modules().count(), 2);

        let meta = registry.get_metadata("chord12").unwrap();
        assert_eq!(meta.port_spec.outputs.len(), CAPACITY);
        assert_eq!(meta.light_count, 49);
        assert!(registry.instantiate("octave").is_some());
        assert!(registry.instantiate("vco").is_none());
    }
}
