use serde::{Deserialize, Serialize};
use std::fmt;

pub type Beat = f64; // song-relative musical time, monotonic within a song
pub type MidiNote = i32; // 0..=127 in song data, signed for octave arithmetic

pub const MIN_MIDI_NOTE: MidiNote = 0;
pub const MAX_MIDI_NOTE: MidiNote = 127;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentenceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u64);

/// Identifies a target note together with the sentence that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteRef {
    pub sentence: SentenceId,
    pub note: NoteId,
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sentence#{}", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note#{}", self.0)
    }
}

impl fmt::Display for NoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sentence, self.note)
    }
}
