//! Behavioural properties of the decoder, chord bank and octave spread,
//! exercised through the public API.

use approx::assert_abs_diff_eq;
use chordbank::prelude::*;
use serde_json::json;

fn press(slot: usize) -> [bool; SLOTS] {
    let mut buttons = [false; SLOTS];
    buttons[slot] = true;
    buttons
}

/// Small deterministic LCG so sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

#[test]
fn decoder_round_trips_every_semitone() {
    for n in -5000i32..=5000 {
        let pitch = DecodedPitch::decode(n as f64 / 12.0);
        assert_eq!(pitch.note, n);
        assert_eq!(pitch.key as i32, ((n % 12) + 12) % 12);
        assert_eq!(pitch.octave, (n as f64 / 12.0).floor() as i32);
    }
}

#[test]
fn decoder_rounds_half_up() {
    // 0.625 V is exactly 7.5 semitones
    assert_eq!(DecodedPitch::decode(0.625).note, 8);
    assert_eq!(DecodedPitch::decode(0.625 - 1e-9).note, 7);
    assert_eq!(DecodedPitch::decode(-0.625).note, -7);
}

#[test]
fn capacity_holds_for_every_key_under_random_toggling() {
    let mut bank = ChordBank::new();
    let mut rng = Lcg(42);
    let released = [false; SLOTS];

    for _ in 0..5000 {
        let key = rng.next_u64() as usize % KEYS;
        let slot = rng.next_u64() as usize % SLOTS;
        bank.set_configured_key(key);
        bank.process_toggles(&press(slot));
        bank.enforce_capacity();
        assert!(bank.enabled_count(key) <= CAPACITY);
        bank.process_toggles(&released);
    }

    for key in 0..KEYS {
        assert!(bank.enabled_count(key) <= CAPACITY);
    }
}

#[test]
fn held_button_toggles_once() {
    let mut chord = Chord12::new();
    let held = Chord12Input {
        buttons: press(9),
        ..Chord12Input::default()
    };
    for _ in 0..64 {
        chord.process(&held);
    }
    assert!(chord.bank().is_enabled(0, 9));
    assert_eq!(chord.bank().enabled_count(0), 1);
}

#[test]
fn projection_is_always_complete() {
    let mut bank = ChordBank::new();
    let mut rng = Lcg(7);

    for round in 0..200 {
        let key = rng.next_u64() as usize % KEYS;
        let slot = rng.next_u64() as usize % SLOTS;
        bank.set_enabled(key, slot, !bank.is_enabled(key, slot));
        bank.enforce_capacity_all();

        let v = round as f64 * 0.037 - 3.0;
        let out = bank.project(key, v);
        let enabled: Vec<usize> = bank.enabled_slots(key).collect();

        assert_eq!(out.len(), CAPACITY);
        for (i, value) in out.iter().enumerate() {
            match enabled.get(i) {
                Some(&s) => {
                    assert_abs_diff_eq!(*value, v + s as f64 / 12.0, epsilon = 1e-12);
                }
                None => assert_eq!(*value, SILENCE),
            }
        }
    }
}

#[test]
fn state_survives_save_and_load() {
    let mut chord = Chord12::new();
    let mut rng = Lcg(1234);
    for _ in 0..100 {
        let key = rng.next_u64() as usize % KEYS;
        let slot = rng.next_u64() as usize % SLOTS;
        chord.bank_mut().set_enabled(key, slot, true);
    }
    chord.bank_mut().enforce_capacity_all();

    let state = chord.serialize_state().unwrap();
    let mut restored = Chord12::new();
    restored.deserialize_state(&state).unwrap();
    assert_eq!(restored.bank().to_flat(), chord.bank().to_flat());
}

#[test]
fn degraded_state_never_fails() {
    let cases = [
        json!({}),
        json!({ "note_enable": [] }),
        json!({ "note_enable": [1, 1, 1, 1, 1, 1, 1, 1, 1, 1] }),
        json!({ "note_enable": vec![0; 300] }),
        json!({ "note_enable": vec![1; 1000] }),
        json!({ "note_enable": { "a": 1 } }),
        json!([1, 2, 3]),
    ];

    for state in &cases {
        let mut chord = Chord12::new();
        chord.deserialize_state(state).unwrap();
        for key in 0..KEYS {
            assert!(chord.bank().enabled_count(key) <= CAPACITY);
        }
    }
}

#[test]
fn octave_spread_is_evenly_spaced() {
    for i in -60..60 {
        let v = i as f64 * 0.0831;
        let s = spread(v);
        for pair in s.unison.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 1.0 / 12.0, epsilon = 1e-9);
        }
        for pair in s.transpose.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn registry_drives_modules_through_ports() {
    let registry = ModuleRegistry::new();
    let mut octave = registry.instantiate("octave").unwrap();

    let mut inputs = PortValues::new();
    let mut outputs = PortValues::new();
    let voct = octave.port_spec().input_by_name("voct").unwrap().id;
    let up_one = octave.port_spec().output_by_name("transpose+1").unwrap().id;

    inputs.set(voct, 0.26);
    octave.tick(&inputs, &mut outputs);
    assert_abs_diff_eq!(outputs.get(up_one).unwrap(), 1.25, epsilon = 1e-9);
}
