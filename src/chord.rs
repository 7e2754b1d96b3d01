//! Chord Bank
//!
//! A 12-key by 25-slot enable matrix. Each key's row holds the intervals
//! (in semitones above the root) that make up its chord. Buttons toggle
//! slots in the *configured* row while the outputs read the *selected* row,
//! so a chord can be edited for one key while another one is playing.

use crate::pitch::SEMITONES;
use crate::trigger::RisingEdge;

/// Number of root keys
pub const KEYS: usize = SEMITONES as usize;

/// Number of interval slots per key (two octaves, inclusive)
pub const SLOTS: usize = 25;

/// Maximum enabled slots per key, and number of chord outputs
pub const CAPACITY: usize = 6;

/// Voltage written to chord outputs with no enabled slot behind them
pub const SILENCE: f64 = -10.0;

/// Display state of one slot indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotIndicator {
    #[default]
    Off,
    /// Enabled in the selected (playing) key
    Selected,
    /// Enabled in the configured (editing) key
    Configured,
}

impl SlotIndicator {
    /// Light value: selected shows positive, configured shows negative
    pub fn light_value(&self) -> f64 {
        match self {
            SlotIndicator::Off => 0.0,
            SlotIndicator::Selected => 1.0,
            SlotIndicator::Configured => -1.0,
        }
    }
}

/// Per-key chord storage with edge-triggered editing
#[derive(Debug, Clone)]
pub struct ChordBank {
    enable: [[bool; SLOTS]; KEYS],
    triggers: [RisingEdge; SLOTS],
    configured_key: usize,
}

impl ChordBank {
    pub fn new() -> Self {
        Self {
            enable: [[false; SLOTS]; KEYS],
            triggers: [RisingEdge::new(); SLOTS],
            configured_key: 0,
        }
    }

    /// Select the row that subsequent toggles and capacity checks act on
    pub fn set_configured_key(&mut self, key: usize) {
        self.configured_key = key % KEYS;
    }

    pub fn configured_key(&self) -> usize {
        self.configured_key
    }

    /// Flip every slot whose button rose since the previous frame
    ///
    /// All detectors are updated, whether they fire or not.
    pub fn process_toggles(&mut self, pressed: &[bool; SLOTS]) {
        let row = &mut self.enable[self.configured_key];
        for ((slot, trigger), &level) in row.iter_mut().zip(&mut self.triggers).zip(pressed) {
            if trigger.process(level) {
                *slot = !*slot;
            }
        }
    }

    /// Disable configured-row slots beyond capacity, scanning low to high
    pub fn enforce_capacity(&mut self) {
        clamp_row(&mut self.enable[self.configured_key]);
    }

    /// Clamp every row, e.g. after restoring state
    pub fn enforce_capacity_all(&mut self) {
        for row in &mut self.enable {
            clamp_row(row);
        }
    }

    /// Chord voltages for `selected_key` rooted at `voltage`
    ///
    /// Enabled slots map to `voltage + slot / 12` in ascending slot order;
    /// unused outputs carry [`SILENCE`].
    pub fn project(&self, selected_key: usize, voltage: f64) -> [f64; CAPACITY] {
        let mut out = [SILENCE; CAPACITY];
        for (dst, slot) in out.iter_mut().zip(self.enabled_slots(selected_key)) {
            *dst = voltage + slot as f64 / SEMITONES as f64;
        }
        out
    }

    /// Per-slot indicator states; the configured row wins over the selected one
    pub fn indicator_state(
        &self,
        selected_key: usize,
        configured_key: usize,
    ) -> [SlotIndicator; SLOTS] {
        let selected = &self.enable[selected_key % KEYS];
        let configured = &self.enable[configured_key % KEYS];

        let mut out = [SlotIndicator::Off; SLOTS];
        for (slot, state) in out.iter_mut().enumerate() {
            if configured[slot] {
                *state = SlotIndicator::Configured;
            } else if selected[slot] {
                *state = SlotIndicator::Selected;
            }
        }
        out
    }

    pub fn is_enabled(&self, key: usize, slot: usize) -> bool {
        self.enable
            .get(key)
            .and_then(|row| row.get(slot))
            .copied()
            .unwrap_or(false)
    }

    /// Set a slot directly, bypassing the capacity clamp until the next frame
    pub fn set_enabled(&mut self, key: usize, slot: usize, enabled: bool) {
        if let Some(cell) = self.enable.get_mut(key).and_then(|row| row.get_mut(slot)) {
            *cell = enabled;
        }
    }

    pub fn enabled_count(&self, key: usize) -> usize {
        self.enabled_slots(key).count()
    }

    /// Enabled slot indices of `key`, ascending
    pub fn enabled_slots(&self, key: usize) -> impl Iterator<Item = usize> + '_ {
        self.enable[key % KEYS]
            .iter()
            .enumerate()
            .filter_map(|(slot, &on)| on.then_some(slot))
    }

    /// Row-major flattening, index = key * SLOTS + slot
    pub fn to_flat(&self) -> Vec<u8> {
        self.enable
            .iter()
            .flat_map(|row| row.iter().map(|&on| u8::from(on)))
            .collect()
    }

    /// Overwrite cells from a row-major sequence
    ///
    /// Cells beyond the end of `values` keep their current state; values
    /// beyond `KEYS * SLOTS` are ignored. Returns the number of cells written.
    pub fn load_flat<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = bool>,
    {
        let cells = self.enable.iter_mut().flat_map(|row| row.iter_mut());
        let mut written = 0;
        for (cell, value) in cells.zip(values) {
            *cell = value;
            written += 1;
        }
        written
    }

    /// Clear the matrix and edge history
    pub fn clear(&mut self) {
        self.enable = [[false; SLOTS]; KEYS];
        self.reset_triggers();
    }

    pub fn reset_triggers(&mut self) {
        for trigger in &mut self.triggers {
            trigger.reset();
        }
    }
}

impl Default for ChordBank {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_row(row: &mut [bool; SLOTS]) {
    let mut count = 0;
    for slot in row.iter_mut().filter(|on| **on) {
        count += 1;
        if count > CAPACITY {
            *slot = false;
        }
    }
}
