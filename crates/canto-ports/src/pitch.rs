use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchEventKind {
    Started,
    Continued,
}

/// One sample from the upstream pitch tracker.
///
/// `start_beat` identifies the recorded note together with `note`; every
/// Continued event for the same run repeats the start beat and carries the
/// grown `end_beat`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    pub note: NoteRef,
    pub start_beat: Beat,
    pub end_beat: Beat,
    pub recorded_midi_note: MidiNote,
    pub rounded_midi_note: MidiNote,
    pub kind: PitchEventKind,
}

#[derive(thiserror::Error, Debug)]
pub enum PitchTrackerError {
    #[error("input not available: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Pitch tracker stream handle: closing stops event delivery.
pub trait PitchTrackerStream: Send {
    fn close(self: Box<Self>);
}

pub type PitchEventCallback = Arc<dyn Fn(PitchEvent) + Send + Sync + 'static>;

pub trait PitchTrackerPort: Send + Sync {
    /// Implementations may invoke cb from a background thread.
    fn open_tracker(
        &self,
        cb: PitchEventCallback,
    ) -> Result<Box<dyn PitchTrackerStream>, PitchTrackerError>;
}
