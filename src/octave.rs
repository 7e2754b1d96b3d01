//! Octave Spread
//!
//! Fans one quantized pitch out into a chromatic octave of unison voltages
//! and a set of whole-octave transpositions centred on the input.

use crate::pitch::{DecodedPitch, SEMITONES};

/// Number of unison outputs, one per semitone
pub const UNISON: usize = SEMITONES as usize;

/// Octaves of transposition on either side of the input
pub const TRANSPOSE_REACH: usize = 2;

/// Number of transpose outputs (-2..=+2 octaves)
pub const TRANSPOSE: usize = 2 * TRANSPOSE_REACH + 1;

/// Result of spreading one input voltage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub pitch: DecodedPitch,
    /// `quantized + i / 12`
    pub unison: [f64; UNISON],
    /// `quantized + (i - 2)`
    pub transpose: [f64; TRANSPOSE],
}

impl Spread {
    pub fn key(&self) -> usize {
        self.pitch.key
    }

    pub fn octave(&self) -> i32 {
        self.pitch.octave
    }

    pub fn is_odd_octave(&self) -> bool {
        self.pitch.is_odd_octave()
    }
}

/// Decode `voltage` and derive the unison and transpose banks
pub fn spread(voltage: f64) -> Spread {
    let pitch = DecodedPitch::decode(voltage);
    let base = pitch.quantized;

    let mut unison = [0.0; UNISON];
    for (i, out) in unison.iter_mut().enumerate() {
        *out = base + i as f64 / SEMITONES as f64;
    }

    let mut transpose = [0.0; TRANSPOSE];
    for (i, out) in transpose.iter_mut().enumerate() {
        *out = base - TRANSPOSE_REACH as f64 + i as f64;
    }

    Spread {
        pitch,
        unison,
        transpose,
    }
}
