use canto_ports::types::MidiNote;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave-independent pitch in 0..12.
pub fn pitch_class(midi_note: MidiNote) -> MidiNote {
    midi_note.rem_euclid(12)
}

/// Name without octave, e.g. `F#`.
pub fn relative_name(midi_note: MidiNote) -> &'static str {
    NOTE_NAMES[pitch_class(midi_note) as usize]
}

/// Name with octave, e.g. `C4` for 60.
pub fn absolute_name(midi_note: MidiNote) -> String {
    let octave = midi_note.div_euclid(12) - 1;
    format!("{}{}", relative_name(midi_note), octave)
}
