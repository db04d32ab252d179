use crate::interpolation::{advance_all, advance_segment};
use crate::pitch_row::reoctave;
use crate::segment::{RecordedSegment, SegmentId, SegmentKey, SegmentKind};
use canto_domain_song::Sentence;
use canto_ports::pitch::PitchEvent;
use canto_ports::types::{Beat, MidiNote, NoteRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Also draw the raw recorded pitch when it differs from the rounded one.
    pub display_rounded_and_actual: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Note of a sentence that is no longer displayed, delivered late by mic delay.
    StaleSentence,
    Freestyle,
    UnknownNote,
    ZeroDuration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileEvent {
    Dropped {
        note: NoteRef,
        reason: DropReason,
    },
    Created {
        segment: SegmentId,
    },
    Extended {
        segment: SegmentId,
        target_end_beat: Beat,
        /// The drawn end was pulled back to the new target end.
        clamped: bool,
    },
}

/// Folds pitch tracker events into recorded segments.
///
/// The first event of a recorded run creates its segment(s); later events
/// for the same (note, start beat) only move the target end. Segments live
/// until `clear`.
#[derive(Debug, Default)]
pub struct RecordedNoteReconciler {
    cfg: ReconcilerConfig,
    segments: Vec<RecordedSegment>,
    index: HashMap<SegmentKey, SegmentId>,
}

impl RecordedNoteReconciler {
    pub fn new(cfg: ReconcilerConfig) -> Self {
        Self {
            cfg,
            segments: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn set_config(&mut self, cfg: ReconcilerConfig) {
        self.cfg = cfg;
    }

    pub fn segments(&self) -> &[RecordedSegment] {
        &self.segments
    }

    /// Ages all segments by one frame; returns the ones whose drawn end moved.
    pub fn advance(&mut self, frame_seconds: f64, beats_per_second: f64) -> Vec<SegmentId> {
        advance_all(&mut self.segments, frame_seconds, beats_per_second)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&RecordedSegment> {
        self.segments.get(id.0 as usize)
    }

    pub fn segments_for(&self, note: NoteRef) -> impl Iterator<Item = &RecordedSegment> + '_ {
        self.segments.iter().filter(move |segment| segment.note == note)
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.index.clear();
    }

    /// `initial_lifetime_seconds` pre-ages new segments so a portion is drawn at once.
    pub fn on_pitch_event(
        &mut self,
        displayed: Option<&Sentence>,
        event: &PitchEvent,
        initial_lifetime_seconds: f64,
        beats_per_second: f64,
    ) -> Vec<ReconcileEvent> {
        let note_ref = event.note;
        let Some(sentence) = displayed.filter(|s| s.id() == note_ref.sentence) else {
            return vec![dropped(note_ref, DropReason::StaleSentence)];
        };
        let Some(target) = sentence.note(note_ref.note) else {
            return vec![dropped(note_ref, DropReason::UnknownNote)];
        };
        if target.is_freestyle() {
            return vec![dropped(note_ref, DropReason::Freestyle)];
        }

        let rounded_key = SegmentKey::new(note_ref, event.start_beat, SegmentKind::Rounded);
        if self.index.contains_key(&rounded_key) {
            return self.extend(note_ref, event.start_beat, event.end_beat);
        }

        if event.start_beat == event.end_beat {
            return vec![dropped(note_ref, DropReason::ZeroDuration)];
        }

        let mut events = Vec::with_capacity(2);
        let displayed_midi = reoctave(event.rounded_midi_note, target.midi_note);
        let id = self.create(
            event,
            SegmentKind::Rounded,
            displayed_midi,
            initial_lifetime_seconds,
            beats_per_second,
        );
        events.push(ReconcileEvent::Created { segment: id });

        if self.cfg.display_rounded_and_actual && event.recorded_midi_note != event.rounded_midi_note {
            let id = self.create(
                event,
                SegmentKind::Actual,
                event.recorded_midi_note,
                initial_lifetime_seconds,
                beats_per_second,
            );
            events.push(ReconcileEvent::Created { segment: id });
        }

        events
    }

    fn create(
        &mut self,
        event: &PitchEvent,
        kind: SegmentKind,
        midi_note: MidiNote,
        initial_lifetime_seconds: f64,
        beats_per_second: f64,
    ) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        let mut segment = RecordedSegment {
            id,
            note: event.note,
            kind,
            midi_note,
            start_beat: event.start_beat,
            target_end_beat: event.end_beat,
            end_beat: event.start_beat,
            lifetime_seconds: initial_lifetime_seconds,
        };
        advance_segment(&mut segment, initial_lifetime_seconds, beats_per_second);
        tracing::trace!(segment = id.0, note = %event.note, ?kind, midi_note, "recorded segment created");

        self.index.insert(segment.key(), id);
        self.segments.push(segment);
        id
    }

    fn extend(&mut self, note: NoteRef, start_beat: Beat, end_beat: Beat) -> Vec<ReconcileEvent> {
        let mut events = Vec::with_capacity(2);
        for kind in [SegmentKind::Rounded, SegmentKind::Actual] {
            let Some(&id) = self.index.get(&SegmentKey::new(note, start_beat, kind)) else {
                continue;
            };
            let Some(segment) = self.segments.get_mut(id.0 as usize) else {
                continue;
            };
            if end_beat < segment.target_end_beat {
                tracing::warn!(
                    segment = id.0,
                    %note,
                    previous = segment.target_end_beat,
                    end_beat,
                    "recorded note end moved backwards"
                );
            }
            segment.target_end_beat = end_beat;
            let clamped = segment.end_beat > end_beat;
            if clamped {
                segment.end_beat = end_beat;
            }
            events.push(ReconcileEvent::Extended {
                segment: id,
                target_end_beat: end_beat,
                clamped,
            });
        }
        events
    }
}

fn dropped(note: NoteRef, reason: DropReason) -> ReconcileEvent {
    tracing::trace!(%note, ?reason, "pitch event dropped");
    ReconcileEvent::Dropped { note, reason }
}
