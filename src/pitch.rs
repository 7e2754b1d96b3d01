//! Pitch Decoding
//!
//! Converts a 1V/octave control voltage into a semitone-quantized voltage
//! together with its key (pitch class) and octave.

use libm::floor;

/// Semitones per octave (12-tone equal temperament)
pub const SEMITONES: i32 = 12;

/// Octave bias added before the modulo/division so both stay non-negative.
///
/// Inputs are assumed to lie within +/-1000 V. Outside that range the key is
/// still in `0..12`, but the octave saturates with the note index.
pub const NOTE_BIAS_OCTAVES: i64 = 1000;

const NOTE_BIAS: i64 = NOTE_BIAS_OCTAVES * SEMITONES as i64;

/// A V/Oct voltage decoded into semitone, key and octave
///
/// `quantized == key / 12 + octave` holds for every finite input. NaN and
/// infinite inputs produce an unspecified (but non-panicking) result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecodedPitch {
    /// Input voltage as received
    pub raw: f64,
    /// Input rounded to the nearest 1/12 V
    pub quantized: f64,
    /// Signed semitone index, 0 = 0 V
    pub note: i32,
    /// Pitch class in `0..12`
    pub key: usize,
    /// `floor(note / 12)`
    pub octave: i32,
}

impl DecodedPitch {
    /// Decode a voltage, rounding half-up to the nearest semitone
    pub fn decode(voltage: f64) -> Self {
        let fnote = floor(voltage * SEMITONES as f64 + 0.5);
        let note = fnote as i32;

        let safe = note as i64 + NOTE_BIAS;
        let key = safe.rem_euclid(SEMITONES as i64) as usize;
        let octave = (safe.div_euclid(SEMITONES as i64) - NOTE_BIAS_OCTAVES) as i32;

        Self {
            raw: voltage,
            quantized: note as f64 / SEMITONES as f64,
            note,
            key,
            octave,
        }
    }

    pub fn is_odd_octave(&self) -> bool {
        self.octave & 1 != 0
    }

    /// Indicator polarity: -1 on odd octaves, +1 on even ones
    pub fn polarity(&self) -> f64 {
        if self.is_odd_octave() {
            -1.0
        } else {
            1.0
        }
    }
}
