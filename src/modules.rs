//! Host-Facing Modules
//!
//! `Chord12` and `Octave` wrap the chord bank and octave spread in a
//! per-frame processor with typed inputs, outputs and indicator lights, and
//! implement [`GraphModule`] so a host can drive them through numbered ports.

use crate::chord::{ChordBank, CAPACITY, KEYS, SILENCE, SLOTS};
use crate::octave::{spread, TRANSPOSE, TRANSPOSE_REACH, UNISON};
use crate::pitch::{DecodedPitch, SEMITONES};
use crate::port::{
    GraphModule, ParamDef, ParamId, ParamRange, PortDef, PortId, PortSpec, PortValues, SignalKind,
};
use crate::serialize::{load_note_enable, note_enable_state};
use std::ops::RangeInclusive;

/// Voltage the program CV input is normalled to, and its full scale
pub const PROGRAM_CV_FULL_SCALE: f64 = 10.0;

/// Button param level at or above which a note button counts as pressed
pub const BUTTON_THRESHOLD: f64 = 0.5;

/// Octaves with an indicator light on the Octave module
pub const OCTAVE_LIGHT_RANGE: RangeInclusive<i32> = -5..=5;

const OCTAVE_LIGHTS: usize = 11;

// Keeps the program knob strictly inside its twelve key bands
const PROGRAM_KNOB_MIN: f64 = 0.0001;
const PROGRAM_KNOB_MAX: f64 = 0.9999;

// Chord12 port and param ids
const PROGRAM_CV_INPUT: PortId = 0;
const VOCT_INPUT: PortId = 1;
const CHORD_OUTPUT: PortId = 10;
const PROGRAM_PARAM: ParamId = 0;
const NOTE_PARAM: ParamId = 1;

// Octave port ids
const OCTAVE_VOCT_INPUT: PortId = 0;
const UNISON_OUTPUT: PortId = 10;
const TRANSPOSE_OUTPUT: PortId = 30;

/// One frame of Chord12 inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord12Input {
    /// Program knob position, 0..1; picks the key being edited
    pub program: f64,
    /// Program CV (0..10 V) picking the key being played; `None` when unpatched
    pub program_cv: Option<f64>,
    /// Root pitch, 1V/oct
    pub voct: f64,
    /// Note button levels
    pub buttons: [bool; SLOTS],
}

impl Default for Chord12Input {
    fn default() -> Self {
        Self {
            program: 0.0,
            program_cv: None,
            voct: 0.0,
            buttons: [false; SLOTS],
        }
    }
}

/// Chord12 indicator lights, values in -1..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord12Lights {
    /// +1 at the played key, -1 at the edited key
    pub program: [f64; KEYS],
    /// Slot states, see [`crate::chord::SlotIndicator`]
    pub notes: [f64; SLOTS],
    /// +1 at the key of the root pitch
    pub fundamental: [f64; KEYS],
}

impl Chord12Lights {
    pub const COUNT: usize = KEYS + SLOTS + KEYS;

    /// Flat index lookup: program lights, then slot lights, then fundamentals
    pub fn get(&self, index: usize) -> Option<f64> {
        self.program
            .iter()
            .chain(&self.notes)
            .chain(&self.fundamental)
            .nth(index)
            .copied()
    }
}

impl Default for Chord12Lights {
    fn default() -> Self {
        Self {
            program: [0.0; KEYS],
            notes: [0.0; SLOTS],
            fundamental: [0.0; KEYS],
        }
    }
}

/// One frame of Chord12 outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord12Output {
    pub voltages: [f64; CAPACITY],
    pub lights: Chord12Lights,
}

impl Default for Chord12Output {
    fn default() -> Self {
        Self {
            voltages: [SILENCE; CAPACITY],
            lights: Chord12Lights::default(),
        }
    }
}

/// Chord12: programmable twelve-key chord generator
///
/// The program knob chooses which key's chord the note buttons edit; the
/// program CV chooses which key's chord is played. Each chord holds up to
/// six intervals over two octaves and is transposed onto the quantized
/// V/Oct input.
pub struct Chord12 {
    bank: ChordBank,
    config: DecodedPitch,
    select: DecodedPitch,
    input: DecodedPitch,
    program: f64,
    buttons: [f64; SLOTS],
    output: Chord12Output,
    spec: PortSpec,
    params: Vec<ParamDef>,
}

impl Chord12 {
    pub fn new() -> Self {
        let mut params = vec![ParamDef::new(
            PROGRAM_PARAM,
            "program",
            ParamRange::Linear { min: 0.0, max: 1.0 },
        )];
        params.extend((0..SLOTS).map(|slot| {
            ParamDef::new(
                NOTE_PARAM + slot as ParamId,
                format!("note{}", slot),
                ParamRange::Momentary {
                    threshold: BUTTON_THRESHOLD,
                },
            )
        }));

        Self {
            bank: ChordBank::new(),
            config: DecodedPitch::default(),
            select: DecodedPitch::default(),
            input: DecodedPitch::default(),
            program: 0.0,
            buttons: [0.0; SLOTS],
            output: Chord12Output::default(),
            spec: PortSpec {
                inputs: vec![
                    PortDef::new(PROGRAM_CV_INPUT, "program_cv", SignalKind::CvUnipolar)
                        .with_default(PROGRAM_CV_FULL_SCALE),
                    PortDef::new(VOCT_INPUT, "voct", SignalKind::VoltPerOctave),
                ],
                outputs: (0..CAPACITY)
                    .map(|i| {
                        PortDef::new(
                            CHORD_OUTPUT + i as PortId,
                            format!("out{}", i + 1),
                            SignalKind::VoltPerOctave,
                        )
                    })
                    .collect(),
            },
            params,
        }
    }

    /// Process one frame
    pub fn process(&mut self, input: &Chord12Input) -> Chord12Output {
        let program = input.program.clamp(PROGRAM_KNOB_MIN, PROGRAM_KNOB_MAX);
        let cv = input.program_cv.unwrap_or(PROGRAM_CV_FULL_SCALE);

        self.config = DecodedPitch::decode(program - 0.5 / SEMITONES as f64);
        self.select = DecodedPitch::decode((cv / PROGRAM_CV_FULL_SCALE).clamp(0.0, 1.0));
        self.input = DecodedPitch::decode(input.voct);

        let lights = &mut self.output.lights;
        lights.program = [0.0; KEYS];
        lights.program[self.select.key] = 1.0;
        lights.program[self.config.key] = -1.0;
        lights.fundamental = [0.0; KEYS];
        lights.fundamental[self.input.key] = 1.0;

        self.bank.set_configured_key(self.config.key);
        self.bank.process_toggles(&input.buttons);
        self.bank.enforce_capacity();

        self.output.voltages = self.bank.project(self.select.key, self.input.quantized);

        let indicators = self.bank.indicator_state(self.select.key, self.config.key);
        for (light, state) in self.output.lights.notes.iter_mut().zip(&indicators) {
            *light = state.light_value();
        }

        self.output
    }

    /// Last frame's outputs
    pub fn output(&self) -> &Chord12Output {
        &self.output
    }

    pub fn bank(&self) -> &ChordBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ChordBank {
        &mut self.bank
    }

    /// Key being edited (from the program knob), as of the last frame
    pub fn configured(&self) -> &DecodedPitch {
        &self.config
    }

    /// Key being played (from the program CV), as of the last frame
    pub fn selected(&self) -> &DecodedPitch {
        &self.select
    }

    /// Quantized root pitch, as of the last frame
    pub fn root(&self) -> &DecodedPitch {
        &self.input
    }

    fn pressed_buttons(&self) -> [bool; SLOTS] {
        let mut pressed = [false; SLOTS];
        let defs = &self.params[NOTE_PARAM as usize..];
        for ((out, def), &level) in pressed.iter_mut().zip(defs).zip(&self.buttons) {
            *out = def.range.is_pressed(level);
        }
        pressed
    }
}

impl Default for Chord12 {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModule for Chord12 {
    fn port_spec(&self) -> &PortSpec {
        &self.spec
    }

    fn tick(&mut self, inputs: &PortValues, outputs: &mut PortValues) {
        let frame = Chord12Input {
            program: self.program,
            program_cv: Some(self.spec.input_value(inputs, PROGRAM_CV_INPUT)),
            voct: self.spec.input_value(inputs, VOCT_INPUT),
            buttons: self.pressed_buttons(),
        };
        let out = self.process(&frame);

        for (i, &v) in out.voltages.iter().enumerate() {
            outputs.set(CHORD_OUTPUT + i as PortId, v);
        }
    }

    fn reset(&mut self) {
        self.bank.reset_triggers();
        self.buttons = [0.0; SLOTS];
        self.output = Chord12Output::default();
    }

    fn params(&self) -> &[ParamDef] {
        &self.params
    }

    fn get_param(&self, id: ParamId) -> Option<f64> {
        match id {
            PROGRAM_PARAM => Some(self.program),
            _ => self.buttons.get((id - NOTE_PARAM) as usize).copied(),
        }
    }

    fn set_param(&mut self, id: ParamId, value: f64) {
        let Some(def) = self.params.iter().find(|p| p.id == id) else {
            return;
        };
        let value = def.range.clamp(value);
        match id {
            PROGRAM_PARAM => self.program = value,
            _ => self.buttons[(id - NOTE_PARAM) as usize] = value,
        }
    }

    fn light_count(&self) -> usize {
        Chord12Lights::COUNT
    }

    fn light(&self, index: usize) -> Option<f64> {
        self.output.lights.get(index)
    }

    fn type_id(&self) -> &'static str {
        "chord12"
    }

    fn serialize_state(&self) -> Option<serde_json::Value> {
        Some(note_enable_state(&self.bank))
    }

    fn deserialize_state(&mut self, state: &serde_json::Value) -> crate::Result<()> {
        load_note_enable(&mut self.bank, state);
        Ok(())
    }
}

/// Octave indicator lights, values in -1..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveLights {
    /// Lit at the input's key
    pub key: [f64; KEYS],
    /// Lit at the input's octave, -5..=+5
    pub octave: [f64; OCTAVE_LIGHTS],
}

impl OctaveLights {
    pub const COUNT: usize = KEYS + OCTAVE_LIGHTS;

    /// Flat index lookup: key lights, then octave lights
    pub fn get(&self, index: usize) -> Option<f64> {
        self.key.iter().chain(&self.octave).nth(index).copied()
    }
}

impl Default for OctaveLights {
    fn default() -> Self {
        Self {
            key: [0.0; KEYS],
            octave: [0.0; OCTAVE_LIGHTS],
        }
    }
}

/// One frame of Octave outputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveOutput {
    pub unison: [f64; UNISON],
    pub transpose: [f64; TRANSPOSE],
    pub lights: OctaveLights,
}

impl Default for OctaveOutput {
    fn default() -> Self {
        Self {
            unison: [0.0; UNISON],
            transpose: [0.0; TRANSPOSE],
            lights: OctaveLights::default(),
        }
    }
}

/// Octave: chromatic unison fan-out and octave transposer
///
/// Lights alternate polarity on odd octaves so adjacent octaves of the same
/// key are visually distinct.
pub struct Octave {
    output: OctaveOutput,
    spec: PortSpec,
}

impl Octave {
    pub fn new() -> Self {
        let unison = (0..UNISON).map(|i| {
            PortDef::new(
                UNISON_OUTPUT + i as PortId,
                format!("unison{}", i),
                SignalKind::VoltPerOctave,
            )
        });
        let transpose = (0..TRANSPOSE).map(|i| {
            PortDef::new(
                TRANSPOSE_OUTPUT + i as PortId,
                format!("transpose{:+}", i as i32 - TRANSPOSE_REACH as i32),
                SignalKind::VoltPerOctave,
            )
        });

        Self {
            output: OctaveOutput::default(),
            spec: PortSpec {
                inputs: vec![PortDef::new(
                    OCTAVE_VOCT_INPUT,
                    "voct",
                    SignalKind::VoltPerOctave,
                )],
                outputs: unison.chain(transpose).collect(),
            },
        }
    }

    /// Process one frame
    pub fn process(&mut self, voct: f64) -> OctaveOutput {
        let s = spread(voct);
        let led = s.pitch.polarity();

        let mut lights = OctaveLights::default();
        lights.key[s.key()] = led;
        if OCTAVE_LIGHT_RANGE.contains(&s.octave()) {
            let index = (s.octave() - OCTAVE_LIGHT_RANGE.start()) as usize;
            lights.octave[index] = led;
        }

        self.output = OctaveOutput {
            unison: s.unison,
            transpose: s.transpose,
            lights,
        };
        self.output
    }

    /// Last frame's outputs
    pub fn output(&self) -> &OctaveOutput {
        &self.output
    }
}

impl Default for Octave {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModule for Octave {
    fn port_spec(&self) -> &PortSpec {
        &self.spec
    }

    fn tick(&mut self, inputs: &PortValues, outputs: &mut PortValues) {
        let out = self.process(self.spec.input_value(inputs, OCTAVE_VOCT_INPUT));

        for (i, &v) in out.unison.iter().enumerate() {
            outputs.set(UNISON_OUTPUT + i as PortId, v);
        }
        for (i, &v) in out.transpose.iter().enumerate() {
            outputs.set(TRANSPOSE_OUTPUT + i as PortId, v);
        }
    }

    fn reset(&mut self) {
        self.output = OctaveOutput::default();
    }

    fn light_count(&self) -> usize {
        OctaveLights::COUNT
    }

    fn light(&self, index: usize) -> Option<f64> {
        self.output.lights.get(index)
    }

    fn type_id(&self) -> &'static str {
        "octave"
    }
}
