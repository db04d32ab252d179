use canto_cli::{replay, Action, ReplayAction, ReplayOptions, Script};
use canto_core::{Command, Event, StaffCore};
use canto_ports::types::SentenceId;
use pretty_assertions::assert_eq;

const SCRIPT: &str = r#"{
  "song": { "title": "Test", "bpm": 30.0 },
  "sentences": [
    { "id": 1, "notes": [
      { "id": 1, "sentence": 1, "midi_note": 60, "start_beat": 0.0, "end_beat": 4.0, "text": "la" }
    ] }
  ],
  "timeline": [
    { "at_seconds": 0.5, "action": { "type": "Pitch", "payload": {
      "note": { "sentence": 1, "note": 1 }, "start_beat": 0.0, "end_beat": 1.0,
      "recorded_midi_note": 60, "rounded_midi_note": 60, "kind": "Started" } } },
    { "at_seconds": 0.0, "action": { "type": "ShowSentence", "payload": { "id": 1 } } },
    { "at_seconds": 0.75, "action": { "type": "NotifyPerfectNote", "payload": { "note": { "sentence": 1, "note": 1 } } } },
    { "at_seconds": 1.0, "action": { "type": "SetNoteRowCount", "payload": { "count": 8 } } }
  ]
}"#;

fn run(script: Script, fps: u32) -> (Vec<Event>, canto_cli::ReplayStats) {
    let mut core = StaffCore::new(None, None).expect("core starts");
    let mut events = Vec::new();
    let opts = ReplayOptions {
        fps,
        ..ReplayOptions::default()
    };
    let stats = replay(&mut core, script, opts, |event| {
        events.push(event);
        Ok(())
    })
    .expect("replay runs");
    (events, stats)
}

fn kind(event: &Event) -> &'static str {
    match event {
        Event::SongLoaded { .. } => "SongLoaded",
        Event::SettingsUpdated { .. } => "SettingsUpdated",
        Event::PitchTrackerUpdated { .. } => "PitchTrackerUpdated",
        Event::DisplayCleared => "DisplayCleared",
        Event::SentenceDisplayed { .. } => "SentenceDisplayed",
        Event::NoteDisplayed { .. } => "NoteDisplayed",
        Event::RecordedSegmentCreated { .. } => "RecordedSegmentCreated",
        Event::RecordedSegmentAdvanced { .. } => "RecordedSegmentAdvanced",
        Event::PerfectNote { .. } => "PerfectNote",
        Event::PerfectSentence { .. } => "PerfectSentence",
    }
}

#[test]
fn script_actions_parse_as_replay_or_core() {
    let script = Script::from_json(SCRIPT).expect("script parses");
    assert_eq!(script.sentences.len(), 1);
    assert!(matches!(
        script.timeline[0].action,
        Action::Replay(ReplayAction::Pitch(_))
    ));
    assert!(matches!(
        script.timeline[1].action,
        Action::Replay(ReplayAction::ShowSentence { id: SentenceId(1) })
    ));
    assert!(matches!(
        script.timeline[3].action,
        Action::Core(Command::SetNoteRowCount { count: 8 })
    ));
}

#[test]
fn negative_timestamps_are_rejected() {
    let data = r#"{ "song": { "bpm": 30.0 }, "timeline": [
        { "at_seconds": -1.0, "action": { "type": "ClearDisplay" } } ] }"#;
    assert!(Script::from_json(data).is_err());
}

#[test]
fn replay_applies_timeline_in_time_order() {
    let script = Script::from_json(SCRIPT).expect("script parses");
    let (events, stats) = run(script, 4);

    let kinds: Vec<_> = events.iter().map(kind).collect();
    assert_eq!(
        kinds,
        vec![
            "SongLoaded",
            "DisplayCleared",
            "SentenceDisplayed",
            "NoteDisplayed",
            "RecordedSegmentCreated",
            "PerfectNote",
            "RecordedSegmentAdvanced",
        ]
    );
    assert_eq!(stats.failed_actions, 1);
    assert_eq!(stats.events, events.len() as u64);
}

#[test]
fn replay_runs_until_segments_settle() {
    let script = Script::from_json(SCRIPT).expect("script parses");
    let (events, stats) = run(script, 4);

    let last_end = events
        .iter()
        .filter_map(|event| match event {
            Event::RecordedSegmentCreated { placement, .. }
            | Event::RecordedSegmentAdvanced { placement, .. } => Some(placement.x_end),
            _ => None,
        })
        .last();
    assert_eq!(last_end, Some(0.25));
    assert_eq!(stats.frames, 5);
}

#[test]
fn zero_fps_is_an_error() {
    let script = Script::from_json(SCRIPT).expect("script parses");
    let mut core = StaffCore::new(None, None).expect("core starts");
    let opts = ReplayOptions {
        fps: 0,
        ..ReplayOptions::default()
    };
    assert!(replay(&mut core, script, opts, |_| Ok(())).is_err());
}
