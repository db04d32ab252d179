use canto_domain_song::{Sentence, SongMeta};
use canto_domain_staff::{NoteLabel, NotePlacement, SegmentId, SegmentKind};
use canto_ports::storage::SettingsDto;
use canto_ports::types::{Beat, MidiNote, NoteRef, SentenceId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadSong { meta: SongMeta },
    DisplaySentence { sentence: Sentence },
    ClearDisplay,
    SetNoteRowCount { count: u32 },
    SetDisplayRoundedAndActual { enabled: bool },
    SetShowPitchOfNotes { enabled: bool },
    SetShowLyricsOnNotes { enabled: bool },
    ConnectPitchTracker,
    DisconnectPitchTracker,
    NotifyPerfectNote { note: NoteRef },
    NotifyPerfectSentence { sentence: SentenceId },
    ExportDiagnostics { path: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    SongLoaded {
        title: String,
        beats_per_second: f64,
    },
    SettingsUpdated {
        settings: SettingsDto,
    },
    PitchTrackerUpdated {
        connected: bool,
    },
    /// Everything on the staff is gone; the events that follow redraw it.
    DisplayCleared,
    SentenceDisplayed {
        sentence: SentenceId,
        avg_midi_note: MidiNote,
        row_count: u32,
        min_beat: Beat,
        max_beat: Beat,
    },
    NoteDisplayed {
        note: NoteRef,
        midi_note: MidiNote,
        label: NoteLabel,
        placement: NotePlacement,
    },
    /// Also sent for every live segment when the staff is redrawn.
    RecordedSegmentCreated {
        segment: SegmentId,
        note: NoteRef,
        kind: SegmentKind,
        midi_note: MidiNote,
        label: Option<String>,
        placement: NotePlacement,
    },
    RecordedSegmentAdvanced {
        segment: SegmentId,
        placement: NotePlacement,
    },
    PerfectNote {
        note: NoteRef,
    },
    PerfectSentence {
        sentence: SentenceId,
    },
}
