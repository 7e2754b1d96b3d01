//! Chord Program Save and Restore
//!
//! Programs a few chords into a Chord12, plays one through the host port
//! interface, then saves the rack to JSON and rebuilds it from the registry.
//!
//! Run with: cargo run --example chord_program

use chordbank::prelude::*;

fn main() -> Result<()> {
    let mut chord = Chord12::new();

    // C major for C, D minor for D: tap each slot with the knob on that key
    let programs: [(usize, &[usize]); 2] = [(0, &[0, 4, 7, 12]), (2, &[0, 3, 7, 10])];
    for (key, slots) in programs {
        let knob = (key as f64 + 0.5) / 12.0;
        let mut pressed = Chord12Input {
            program: knob,
            ..Chord12Input::default()
        };
        for &slot in slots {
            pressed.buttons[slot] = true;
        }
        chord.process(&pressed);
        chord.process(&Chord12Input {
            program: knob,
            ..Chord12Input::default()
        });
    }

    // Play the D chord over A2 through numbered ports
    let spec = chord.port_spec().clone();
    let mut inputs = PortValues::new();
    let mut outputs = PortValues::new();
    inputs.set(spec.input_by_name("program_cv").unwrap().id, 2.0 / 12.0 * 10.0);
    inputs.set(spec.input_by_name("voct").unwrap().id, -1.0 + 9.0 / 12.0);
    chord.tick(&inputs, &mut outputs);

    println!("Chord12 outputs (key {}):", chord.selected().key);
    for port in &spec.outputs {
        println!("  {:>5}: {:+.4} V", port.name, outputs.get(port.id).unwrap_or(SILENCE));
    }

    // Save alongside an Octave and restore through the registry
    let octave = Octave::new();
    let rack = RackDef::capture([
        ("chords", &chord as &dyn GraphModule),
        ("spread", &octave as &dyn GraphModule),
    ]);
    let json = rack.to_json()?;
    println!("\nSaved rack: {} bytes", json.len());

    let registry = ModuleRegistry::new();
    for (name, module) in RackDef::from_json(&json)?.build(&registry)? {
        let meta = registry.get_metadata(module.type_id());
        println!(
            "Restored {:<7} {:<8} {} lights",
            name,
            module.type_id(),
            meta.map_or(0, |m| m.light_count)
        );
        assert_eq!(module.serialize_state(), rack_state(&rack, &name));
    }

    Ok(())
}

fn rack_state(rack: &RackDef, name: &str) -> Option<serde_json::Value> {
    rack.modules
        .iter()
        .find(|m| m.name == name)
        .and_then(|m| m.state.clone())
}
