use crate::pitch_row::{validate_row_count, DisplayWindow, StaffError};
use crate::reconciler::{ReconcileEvent, ReconcilerConfig, RecordedNoteReconciler};
use crate::segment::{RecordedSegment, SegmentId};
use canto_domain_song::{Sentence, TargetNote};
use canto_ports::pitch::PitchEvent;
use canto_ports::types::{Beat, MidiNote, NoteRef};
use serde::{Deserialize, Serialize};

/// Where a bar goes on the staff, as fractions of the staff's width and height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotePlacement {
    pub row: i32,
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

/// Linear position of `beat` between `min_beat` and `max_beat`.
///
/// A sentence without beat extent maps every beat to 0.
pub fn beat_fraction(beat: Beat, min_beat: Beat, max_beat: Beat) -> f64 {
    let beats_in_sentence = max_beat - min_beat;
    if beats_in_sentence <= 0.0 {
        return 0.0;
    }
    (beat - min_beat) / beats_in_sentence
}

#[derive(Debug)]
struct Displayed {
    sentence: Sentence,
    window: DisplayWindow,
}

/// The sentence currently on the staff and the recorded segments drawn over it.
#[derive(Debug)]
pub struct SentenceWindow {
    row_count: u32,
    displayed: Option<Displayed>,
    reconciler: RecordedNoteReconciler,
}

impl SentenceWindow {
    pub fn new(row_count: u32, cfg: ReconcilerConfig) -> Result<Self, StaffError> {
        validate_row_count(row_count)?;
        Ok(Self {
            row_count,
            displayed: None,
            reconciler: RecordedNoteReconciler::new(cfg),
        })
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Rebuilds the display window of the current sentence for the new row count.
    pub fn set_row_count(&mut self, row_count: u32) -> Result<(), StaffError> {
        validate_row_count(row_count)?;
        if let Some(displayed) = self.displayed.as_mut() {
            displayed.window = DisplayWindow::new(row_count, displayed.window.avg_midi_note())?;
        }
        self.row_count = row_count;
        Ok(())
    }

    pub fn set_reconciler_config(&mut self, cfg: ReconcilerConfig) {
        self.reconciler.set_config(cfg);
    }

    /// Replaces the displayed sentence and discards every recorded segment.
    pub fn set_sentence(&mut self, sentence: Option<Sentence>) -> Result<(), StaffError> {
        self.reconciler.clear();
        self.displayed = match sentence {
            Some(sentence) => {
                let window = DisplayWindow::for_notes(self.row_count, sentence.notes())?;
                Some(Displayed { sentence, window })
            }
            None => None,
        };
        Ok(())
    }

    pub fn sentence(&self) -> Option<&Sentence> {
        self.displayed.as_ref().map(|d| &d.sentence)
    }

    pub fn display_window(&self) -> Option<&DisplayWindow> {
        self.displayed.as_ref().map(|d| &d.window)
    }

    /// True when `note` belongs to the current sentence and is drawn on the staff.
    pub fn is_displayed(&self, note: NoteRef) -> bool {
        self.sentence()
            .and_then(|s| s.lookup(note))
            .is_some_and(is_drawn)
    }

    pub fn place(&self, midi_note: MidiNote, start_beat: Beat, end_beat: Beat) -> Option<NotePlacement> {
        let displayed = self.displayed.as_ref()?;
        let min_beat = displayed.sentence.min_beat();
        let max_beat = displayed.sentence.max_beat();
        let (y_start, y_end) = displayed.window.vertical_band(midi_note);
        Some(NotePlacement {
            row: displayed.window.row(midi_note),
            x_start: beat_fraction(start_beat, min_beat, max_beat),
            x_end: beat_fraction(end_beat, min_beat, max_beat),
            y_start,
            y_end,
        })
    }

    /// Target notes to draw: freestyle and zero-length notes are left out.
    pub fn note_placements(&self) -> Vec<(&TargetNote, NotePlacement)> {
        let Some(sentence) = self.sentence() else {
            return Vec::new();
        };
        sentence
            .notes()
            .iter()
            .filter(|note| is_drawn(note))
            .filter_map(|note| {
                self.place(note.midi_note, note.start_beat, note.end_beat)
                    .map(|placement| (note, placement))
            })
            .collect()
    }

    pub fn segment_placement(&self, id: SegmentId) -> Option<NotePlacement> {
        let segment = self.reconciler.segment(id)?;
        self.place(segment.midi_note, segment.start_beat, segment.end_beat)
    }

    pub fn on_pitch_event(
        &mut self,
        event: &PitchEvent,
        initial_lifetime_seconds: f64,
        beats_per_second: f64,
    ) -> Vec<ReconcileEvent> {
        let sentence = self.displayed.as_ref().map(|d| &d.sentence);
        self.reconciler
            .on_pitch_event(sentence, event, initial_lifetime_seconds, beats_per_second)
    }

    pub fn advance(&mut self, frame_seconds: f64, beats_per_second: f64) -> Vec<SegmentId> {
        self.reconciler.advance(frame_seconds, beats_per_second)
    }

    pub fn segments(&self) -> &[RecordedSegment] {
        self.reconciler.segments()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&RecordedSegment> {
        self.reconciler.segment(id)
    }
}

fn is_drawn(note: &TargetNote) -> bool {
    !note.is_freestyle() && note.has_duration()
}
