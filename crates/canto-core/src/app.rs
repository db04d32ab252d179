use crate::diagnostics::{export_diagnostics, StaffSnapshot};
use crate::ipc::{Command, Event};
use canto_domain_song::{Sentence, SongError, SongMeta};
use canto_domain_staff::{
    recorded_segment_label, target_note_label, LabelOptions, ReconcileEvent,
    ReconcilerConfig, SegmentId, SentenceWindow, StaffError,
};
use canto_ports::pitch::{PitchEvent, PitchTrackerError, PitchTrackerPort, PitchTrackerStream};
use canto_ports::storage::{SettingsDto, StorageError, StoragePort};
use canto_ports::timing::SongTimingPort;
use canto_ports::types::{NoteRef, SentenceId};
use parking_lot::Mutex;
use rtrb::{Consumer, RingBuffer};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

const PITCH_QUEUE_CAPACITY: usize = 2048;
const RECENT_PITCH_EVENTS: usize = 20;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] StaffError),
    #[error("pitch tracker error: {0}")]
    PitchTracker(#[from] PitchTrackerError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("song error: {0}")]
    Song(#[from] SongError),
    #[error("no pitch tracker available")]
    NoPitchTracker,
}

/// Owns the staff of one singer and serializes everything that mutates it.
///
/// Commands (including sentence changes), submitted pitch events and
/// `tick` all run on the caller's thread. A connected pitch tracker only
/// pushes into a ring buffer that `tick` drains in arrival order.
pub struct StaffCore {
    pitch_port: Option<Box<dyn PitchTrackerPort>>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    beats_per_second: f64,
    window: SentenceWindow,
    last_frame_seconds: f64,
    pitch_stream: Option<Box<dyn PitchTrackerStream>>,
    pitch_queue_rx: Option<Consumer<PitchEvent>>,
    pending: VecDeque<PitchEvent>,
    events: VecDeque<Event>,
    recent_pitch_events: VecDeque<PitchEvent>,
}

impl StaffCore {
    pub fn new(
        pitch_port: Option<Box<dyn PitchTrackerPort>>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Result<Self, AppError> {
        let settings = match storage.as_ref().map(|storage| storage.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                tracing::warn!(%err, "failed to load settings, using defaults");
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };

        let window = SentenceWindow::new(settings.note_row_count, reconciler_config(&settings))?;

        Ok(Self {
            pitch_port,
            storage,
            settings,
            beats_per_second: 0.0,
            window,
            last_frame_seconds: 0.0,
            pitch_stream: None,
            pitch_queue_rx: None,
            pending: VecDeque::new(),
            events: VecDeque::new(),
            recent_pitch_events: VecDeque::with_capacity(RECENT_PITCH_EVENTS),
        })
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::LoadSong { meta } => {
                let meta = SongMeta::new(meta.title, meta.artist, meta.bpm)?;
                self.set_timing(&meta);
                self.events.push_back(Event::SongLoaded {
                    title: meta.title,
                    beats_per_second: self.beats_per_second,
                });
            }
            Command::DisplaySentence { sentence } => {
                self.display_sentence(Some(sentence))?;
            }
            Command::ClearDisplay => {
                self.display_sentence(None)?;
            }
            Command::SetNoteRowCount { count } => {
                self.window.set_row_count(count)?;
                self.settings.note_row_count = count;
                self.emit_settings();
                self.save_settings();
                self.redraw();
            }
            Command::SetDisplayRoundedAndActual { enabled } => {
                self.settings.display_rounded_and_actual_recorded_notes = enabled;
                self.window.set_reconciler_config(reconciler_config(&self.settings));
                self.emit_settings();
                self.save_settings();
            }
            Command::SetShowPitchOfNotes { enabled } => {
                self.settings.show_pitch_of_notes = enabled;
                self.emit_settings();
                self.save_settings();
                self.redraw();
            }
            Command::SetShowLyricsOnNotes { enabled } => {
                self.settings.show_lyrics_on_notes = enabled;
                self.emit_settings();
                self.save_settings();
                self.redraw();
            }
            Command::ConnectPitchTracker => {
                self.open_pitch_tracker()?;
            }
            Command::DisconnectPitchTracker => {
                self.close_pitch_tracker();
            }
            Command::NotifyPerfectNote { note } => {
                self.perfect_note(note);
            }
            Command::NotifyPerfectSentence { sentence } => {
                if is_current(&self.window, sentence) {
                    self.events.push_back(Event::PerfectSentence { sentence });
                }
            }
            Command::ExportDiagnostics { path } => {
                export_diagnostics(
                    Path::new(&path),
                    &self.settings,
                    &self.snapshot(),
                    self.recent_pitch_events.iter().copied().collect(),
                )?;
            }
        }
        Ok(())
    }

    /// Queues an event from a pitch tracker running on this thread.
    pub fn submit_pitch_event(&mut self, event: PitchEvent) {
        self.pending.push_back(event);
    }

    /// Advances one display frame of `frame_seconds` real time.
    pub fn tick(&mut self, frame_seconds: f64) {
        let frame_seconds = if frame_seconds.is_finite() {
            frame_seconds.max(0.0)
        } else {
            0.0
        };
        self.last_frame_seconds = frame_seconds;
        self.advance_segments(frame_seconds);
        self.drain_pitch_queue();
        self.process_pitch_events();
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn set_timing(&mut self, timing: &dyn SongTimingPort) {
        self.beats_per_second = timing.beats_per_second();
    }

    pub fn beats_per_second(&self) -> f64 {
        self.beats_per_second
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn window(&self) -> &SentenceWindow {
        &self.window
    }

    pub fn snapshot(&self) -> StaffSnapshot {
        StaffSnapshot {
            sentence: self.window.sentence().map(|s| s.id()),
            display_window: self.window.display_window().copied(),
            beats_per_second: self.beats_per_second,
            segments: self.window.segments().to_vec(),
        }
    }

    fn display_sentence(&mut self, sentence: Option<Sentence>) -> Result<(), AppError> {
        self.window.set_sentence(sentence)?;
        self.events.push_back(Event::DisplayCleared);
        if let Some(sentence) = self.window.sentence() {
            tracing::debug!(
                sentence = %sentence.id(),
                notes = sentence.notes().len(),
                "sentence displayed"
            );
        }
        self.emit_sentence();
        Ok(())
    }

    fn open_pitch_tracker(&mut self) -> Result<(), AppError> {
        self.close_pitch_tracker();
        let Some(port) = self.pitch_port.as_ref() else {
            return Err(AppError::NoPitchTracker);
        };

        let (producer, consumer) = RingBuffer::new(PITCH_QUEUE_CAPACITY);
        let producer = Arc::new(Mutex::new(producer));
        let cb = Arc::new(move |event: PitchEvent| {
            if producer.lock().push(event).is_err() {
                tracing::warn!(note = %event.note, "pitch event queue full, event dropped");
            }
        });

        let stream = port.open_tracker(cb)?;
        self.pitch_stream = Some(stream);
        self.pitch_queue_rx = Some(consumer);
        tracing::info!("pitch tracker connected");
        self.events.push_back(Event::PitchTrackerUpdated { connected: true });
        Ok(())
    }

    fn close_pitch_tracker(&mut self) {
        let Some(stream) = self.pitch_stream.take() else {
            return;
        };
        stream.close();
        // keep what already arrived
        self.drain_pitch_queue();
        self.pitch_queue_rx = None;
        tracing::info!("pitch tracker disconnected");
        self.events.push_back(Event::PitchTrackerUpdated { connected: false });
    }

    fn drain_pitch_queue(&mut self) {
        let Some(consumer) = self.pitch_queue_rx.as_mut() else {
            return;
        };
        while let Ok(event) = consumer.pop() {
            self.pending.push_back(event);
        }
    }

    fn process_pitch_events(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            self.record_recent_pitch_event(event);
            let outcomes =
                self.window
                    .on_pitch_event(&event, self.last_frame_seconds, self.beats_per_second);
            for outcome in outcomes {
                self.handle_reconcile_event(outcome);
            }
        }
    }

    fn handle_reconcile_event(&mut self, outcome: ReconcileEvent) {
        match outcome {
            ReconcileEvent::Created { segment } => {
                if let Some(event) = self.segment_created(segment) {
                    self.events.push_back(event);
                }
            }
            ReconcileEvent::Extended {
                segment,
                clamped: true,
                ..
            } => {
                if let Some(placement) = self.window.segment_placement(segment) {
                    self.events
                        .push_back(Event::RecordedSegmentAdvanced { segment, placement });
                }
            }
            ReconcileEvent::Extended { .. } | ReconcileEvent::Dropped { .. } => {}
        }
    }

    fn advance_segments(&mut self, frame_seconds: f64) {
        let moved = self.window.advance(frame_seconds, self.beats_per_second);
        for segment in moved {
            if let Some(placement) = self.window.segment_placement(segment) {
                self.events
                    .push_back(Event::RecordedSegmentAdvanced { segment, placement });
            }
        }
    }

    fn perfect_note(&mut self, note: NoteRef) {
        if self.window.is_displayed(note) {
            self.events.push_back(Event::PerfectNote { note });
        }
    }

    fn emit_sentence(&mut self) {
        let (Some(sentence), Some(display)) = (self.window.sentence(), self.window.display_window())
        else {
            return;
        };
        self.events.push_back(Event::SentenceDisplayed {
            sentence: sentence.id(),
            avg_midi_note: display.avg_midi_note(),
            row_count: display.row_count(),
            min_beat: sentence.min_beat(),
            max_beat: sentence.max_beat(),
        });

        let opts = LabelOptions {
            show_lyrics: self.settings.show_lyrics_on_notes,
            show_pitch: self.settings.show_pitch_of_notes,
        };
        for (note, placement) in self.window.note_placements() {
            self.events.push_back(Event::NoteDisplayed {
                note: note.note_ref(),
                midi_note: note.midi_note,
                label: target_note_label(note, opts),
                placement,
            });
        }
    }

    fn segment_created(&self, segment: SegmentId) -> Option<Event> {
        let recorded = self.window.segment(segment)?;
        let placement = self.window.segment_placement(segment)?;
        Some(Event::RecordedSegmentCreated {
            segment,
            note: recorded.note,
            kind: recorded.kind,
            midi_note: recorded.midi_note,
            label: recorded_segment_label(recorded.midi_note, self.settings.show_pitch_of_notes),
            placement,
        })
    }

    /// Replays the whole staff after a layout or label change.
    fn redraw(&mut self) {
        self.events.push_back(Event::DisplayCleared);
        self.emit_sentence();
        let segments: Vec<SegmentId> = self.window.segments().iter().map(|s| s.id).collect();
        for segment in segments {
            if let Some(event) = self.segment_created(segment) {
                self.events.push_back(event);
            }
        }
    }

    fn emit_settings(&mut self) {
        self.events.push_back(Event::SettingsUpdated {
            settings: self.settings.clone(),
        });
    }

    fn record_recent_pitch_event(&mut self, event: PitchEvent) {
        if self.recent_pitch_events.len() >= RECENT_PITCH_EVENTS {
            self.recent_pitch_events.pop_front();
        }
        self.recent_pitch_events.push_back(event);
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                tracing::warn!(%err, "failed to save settings");
            }
        }
    }
}

impl Drop for StaffCore {
    fn drop(&mut self) {
        if let Some(stream) = self.pitch_stream.take() {
            stream.close();
        }
    }
}

fn reconciler_config(settings: &SettingsDto) -> ReconcilerConfig {
    ReconcilerConfig {
        display_rounded_and_actual: settings.display_rounded_and_actual_recorded_notes,
    }
}

fn is_current(window: &SentenceWindow, sentence: SentenceId) -> bool {
    window.sentence().map(|s| s.id()) == Some(sentence)
}
