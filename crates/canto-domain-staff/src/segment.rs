use canto_ports::types::{Beat, MidiNote, NoteRef};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Rounded pitch moved onto the octave of the target note.
    Rounded,
    /// Raw recorded pitch, drawn as detected.
    Actual,
}

/// Identity of a segment: one recorded run on one target note, per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub note: NoteRef,
    start_beat_bits: u64,
    pub kind: SegmentKind,
}

impl SegmentKey {
    pub fn new(note: NoteRef, start_beat: Beat, kind: SegmentKind) -> Self {
        // -0.0 and 0.0 must hash alike.
        let start_beat = if start_beat == 0.0 { 0.0 } else { start_beat };
        Self {
            note,
            start_beat_bits: start_beat.to_bits(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedSegment {
    pub id: SegmentId,
    pub note: NoteRef,
    pub kind: SegmentKind,
    pub midi_note: MidiNote,
    pub start_beat: Beat,
    /// Latest end beat reported by the pitch tracker.
    pub target_end_beat: Beat,
    /// End beat currently drawn; sweeps toward `target_end_beat`.
    pub end_beat: Beat,
    /// Seconds on the frame clock since the segment was created.
    pub lifetime_seconds: f64,
}

impl RecordedSegment {
    pub fn key(&self) -> SegmentKey {
        SegmentKey::new(self.note, self.start_beat, self.kind)
    }

    pub fn is_animating(&self) -> bool {
        self.end_beat < self.target_end_beat
    }
}
