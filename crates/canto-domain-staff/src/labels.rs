use canto_domain_song::{absolute_name, NoteType, TargetNote};
use canto_ports::types::MidiNote;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelStyle {
    Plain,
    Bold,
    Rap,
    Freestyle,
}

impl From<NoteType> for LabelStyle {
    fn from(note_type: NoteType) -> Self {
        match note_type {
            NoteType::Normal => LabelStyle::Plain,
            NoteType::Golden => LabelStyle::Bold,
            NoteType::Rap | NoteType::RapGolden => LabelStyle::Rap,
            NoteType::Freestyle => LabelStyle::Freestyle,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelOptions {
    pub show_lyrics: bool,
    pub show_pitch: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLabel {
    pub text: String,
    pub style: LabelStyle,
}

pub fn target_note_label(note: &TargetNote, opts: LabelOptions) -> NoteLabel {
    let pitch_name = absolute_name(note.midi_note);
    let text = match (opts.show_lyrics, opts.show_pitch) {
        (true, true) => format!("{} ({})", note.text, pitch_name),
        (true, false) => note.text.clone(),
        (false, true) => pitch_name,
        (false, false) => String::new(),
    };
    NoteLabel {
        text,
        style: note.note_type.into(),
    }
}

pub fn recorded_segment_label(midi_note: MidiNote, show_pitch: bool) -> Option<String> {
    show_pitch.then(|| format!(" ({})", absolute_name(midi_note)))
}
