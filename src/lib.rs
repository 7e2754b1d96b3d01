//! # Chordbank: Quantizing Chord and Octave CV Utilities
//!
//! `chordbank` implements two control-voltage utility modules for modular
//! synthesis hosts. Both run once per audio frame, read a handful of input
//! voltages and write a fixed set of output voltages and indicator lights.
//!
//! - **Chord12** stores one chord (up to six intervals across two octaves)
//!   for each of the twelve keys and plays the chord of the key picked by a
//!   program CV over a quantized V/Oct root.
//! - **Octave** quantizes a V/Oct input and fans it out into a chromatic
//!   octave of unison voltages plus five octave transpositions.
//!
//! ## Layers
//!
//! - **Core** - [`pitch`], [`trigger`], [`chord`], [`octave`]: pure per-frame
//!   arithmetic on owned state
//! - **Modules** - [`modules`]: typed frame processors
//! - **Host Interface** - [`port`], [`serialize`]: numbered ports, params,
//!   lights and JSON state for a host adapter
//!
//! ## Quick Start
//!
//! ```rust
//! use chordbank::prelude::*;
//!
//! let mut chord = Chord12::new();
//!
//! // Program a major triad for C: hold each button for one frame
//! let mut frame = Chord12Input::default();
//! for slot in [0, 4, 7] {
//!     frame.buttons[slot] = true;
//! }
//! chord.process(&frame);
//!
//! // Play it over A (9 semitones above 0 V)
//! let out = chord.process(&Chord12Input {
//!     voct: 9.0 / 12.0,
//!     ..Chord12Input::default()
//! });
//! assert_eq!(out.voltages[3], SILENCE);
//! ```

pub mod chord;
pub mod error;
pub mod modules;
pub mod octave;
pub mod pitch;
pub mod port;
pub mod serialize;
pub mod trigger;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Core
    pub use crate::chord::{ChordBank, SlotIndicator, CAPACITY, KEYS, SILENCE, SLOTS};
    pub use crate::octave::{spread, Spread, TRANSPOSE, UNISON};
    pub use crate::pitch::{DecodedPitch, NOTE_BIAS_OCTAVES};
    pub use crate::trigger::RisingEdge;

    // Modules
    pub use crate::modules::{
        Chord12, Chord12Input, Chord12Lights, Chord12Output, Octave, OctaveLights, OctaveOutput,
    };

    // Host interface
    pub use crate::port::{
        GraphModule, ParamDef, ParamId, ParamRange, PortDef, PortId, PortSpec, PortValues,
        SignalKind,
    };
    pub use crate::serialize::{ModuleDef, ModuleMetadata, ModuleRegistry, RackDef};

    pub use crate::error::{Error, Result};
}
