use canto_ports::timing::SongTimingPort;
use canto_ports::types::{Beat, MidiNote, NoteId, NoteRef, SentenceId, MAX_MIDI_NOTE, MIN_MIDI_NOTE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SongError {
    #[error("{0} has no notes")]
    EmptySentence(SentenceId),
    #[error("{note} belongs to {owner}, not {sentence}")]
    ForeignNote {
        note: NoteId,
        owner: SentenceId,
        sentence: SentenceId,
    },
    #[error("{note} ends before it starts ({start_beat} > {end_beat})")]
    InvertedNote {
        note: NoteId,
        start_beat: Beat,
        end_beat: Beat,
    },
    #[error("{note} appears more than once in {sentence}")]
    DuplicateNote { note: NoteId, sentence: SentenceId },
    #[error("{note} has midi note {midi_note} outside 0..=127")]
    MidiNoteOutOfRange { note: NoteId, midi_note: MidiNote },
    #[error("invalid bpm: {0}")]
    InvalidBpm(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NoteType {
    #[default]
    Normal,
    Golden,
    Rap,
    RapGolden,
    Freestyle,
}

impl NoteType {
    pub fn is_freestyle(self) -> bool {
        matches!(self, NoteType::Freestyle)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetNote {
    pub id: NoteId,
    pub sentence: SentenceId,
    pub midi_note: MidiNote,
    pub start_beat: Beat,
    pub end_beat: Beat,
    #[serde(default)]
    pub note_type: NoteType,
    #[serde(default)]
    pub text: String,
}

impl TargetNote {
    pub fn note_ref(&self) -> NoteRef {
        NoteRef {
            sentence: self.sentence,
            note: self.id,
        }
    }

    pub fn is_freestyle(&self) -> bool {
        self.note_type.is_freestyle()
    }

    pub fn has_duration(&self) -> bool {
        self.start_beat != self.end_beat
    }
}

#[derive(Deserialize)]
struct RawSentence {
    id: SentenceId,
    notes: Vec<TargetNote>,
}

/// An ordered, non-empty group of target notes displayed and scored together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSentence")]
pub struct Sentence {
    id: SentenceId,
    notes: Vec<TargetNote>,
    #[serde(skip)]
    min_beat: Beat,
    #[serde(skip)]
    max_beat: Beat,
}

impl TryFrom<RawSentence> for Sentence {
    type Error = SongError;

    fn try_from(raw: RawSentence) -> Result<Self, Self::Error> {
        Sentence::new(raw.id, raw.notes)
    }
}

impl Sentence {
    pub fn new(id: SentenceId, mut notes: Vec<TargetNote>) -> Result<Self, SongError> {
        if notes.is_empty() {
            return Err(SongError::EmptySentence(id));
        }
        let mut seen = HashSet::with_capacity(notes.len());
        for note in &notes {
            if !seen.insert(note.id) {
                return Err(SongError::DuplicateNote {
                    note: note.id,
                    sentence: id,
                });
            }
            if note.sentence != id {
                return Err(SongError::ForeignNote {
                    note: note.id,
                    owner: note.sentence,
                    sentence: id,
                });
            }
            if note.start_beat > note.end_beat {
                return Err(SongError::InvertedNote {
                    note: note.id,
                    start_beat: note.start_beat,
                    end_beat: note.end_beat,
                });
            }
            if !(MIN_MIDI_NOTE..=MAX_MIDI_NOTE).contains(&note.midi_note) {
                return Err(SongError::MidiNoteOutOfRange {
                    note: note.id,
                    midi_note: note.midi_note,
                });
            }
        }
        notes.sort_by(|a, b| a.start_beat.total_cmp(&b.start_beat));

        let min_beat = notes
            .iter()
            .map(|n| n.start_beat)
            .fold(Beat::INFINITY, Beat::min);
        let max_beat = notes
            .iter()
            .map(|n| n.end_beat)
            .fold(Beat::NEG_INFINITY, Beat::max);

        Ok(Self {
            id,
            notes,
            min_beat,
            max_beat,
        })
    }

    pub fn id(&self) -> SentenceId {
        self.id
    }

    pub fn notes(&self) -> &[TargetNote] {
        &self.notes
    }

    pub fn min_beat(&self) -> Beat {
        self.min_beat
    }

    pub fn max_beat(&self) -> Beat {
        self.max_beat
    }

    pub fn note(&self, id: NoteId) -> Option<&TargetNote> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// The note `note` points at, if it belongs to this sentence.
    pub fn lookup(&self, note: NoteRef) -> Option<&TargetNote> {
        if note.sentence != self.id {
            return None;
        }
        self.note(note.note)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// BPM as written in the song file, which counts quarter beats.
    pub bpm: f64,
}

impl SongMeta {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, bpm: f64) -> Result<Self, SongError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SongError::InvalidBpm(bpm));
        }
        Ok(Self {
            title: title.into(),
            artist: artist.into(),
            bpm,
        })
    }

    pub fn beats_per_minute(&self) -> f64 {
        self.bpm * 4.0
    }
}

impl SongTimingPort for SongMeta {
    fn beats_per_second(&self) -> f64 {
        self.beats_per_minute() / 60.0
    }
}
