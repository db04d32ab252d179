use canto_domain_song::{absolute_name, pitch_class, NoteType, Sentence, SongError, SongMeta, TargetNote};
use canto_ports::timing::SongTimingPort;
use canto_ports::types::{NoteId, SentenceId};
use pretty_assertions::assert_eq;

fn note(id: u64, sentence: u32, midi_note: i32, start: f64, end: f64) -> TargetNote {
    TargetNote {
        id: NoteId(id),
        sentence: SentenceId(sentence),
        midi_note,
        start_beat: start,
        end_beat: end,
        note_type: NoteType::Normal,
        text: String::new(),
    }
}

#[test]
fn sentence_derives_beat_range_from_notes() {
    let sentence = Sentence::new(
        SentenceId(1),
        vec![note(2, 1, 62, 4.0, 6.0), note(1, 1, 60, 2.0, 3.0)],
    )
    .expect("valid sentence");

    assert_eq!(sentence.min_beat(), 2.0);
    assert_eq!(sentence.max_beat(), 6.0);
    assert_eq!(sentence.notes()[0].id, NoteId(1));
}

#[test]
fn empty_sentence_is_rejected() {
    let err = Sentence::new(SentenceId(3), Vec::new()).unwrap_err();
    assert_eq!(err, SongError::EmptySentence(SentenceId(3)));
}

#[test]
fn note_owned_by_another_sentence_is_rejected() {
    let err = Sentence::new(SentenceId(1), vec![note(1, 2, 60, 0.0, 1.0)]).unwrap_err();
    assert!(matches!(err, SongError::ForeignNote { .. }));
}

#[test]
fn duplicate_note_ids_are_rejected() {
    let err = Sentence::new(
        SentenceId(4),
        vec![note(1, 4, 60, 0.0, 1.0), note(2, 4, 62, 1.0, 2.0), note(1, 4, 64, 2.0, 3.0)],
    )
    .unwrap_err();
    assert_eq!(
        err,
        SongError::DuplicateNote {
            note: NoteId(1),
            sentence: SentenceId(4),
        }
    );

    let json = r#"{"id":1,"notes":[
        {"id":7,"sentence":1,"midi_note":60,"start_beat":0.0,"end_beat":1.0},
        {"id":7,"sentence":1,"midi_note":62,"start_beat":1.0,"end_beat":2.0}]}"#;
    assert!(serde_json::from_str::<Sentence>(json).is_err());
}

#[test]
fn out_of_range_midi_note_is_rejected() {
    let err = Sentence::new(SentenceId(1), vec![note(1, 1, 128, 0.0, 1.0)]).unwrap_err();
    assert!(matches!(err, SongError::MidiNoteOutOfRange { midi_note: 128, .. }));
}

#[test]
fn deserialized_sentence_is_validated() {
    let ok = r#"{"id":1,"notes":[{"id":7,"sentence":1,"midi_note":60,"start_beat":0.0,"end_beat":2.0}]}"#;
    let sentence: Sentence = serde_json::from_str(ok).expect("valid json sentence");
    assert_eq!(sentence.max_beat(), 2.0);
    assert_eq!(sentence.notes()[0].note_type, NoteType::Normal);

    let empty = r#"{"id":1,"notes":[]}"#;
    assert!(serde_json::from_str::<Sentence>(empty).is_err());
}

#[test]
fn lookup_checks_sentence_and_note() {
    let sentence = Sentence::new(SentenceId(1), vec![note(1, 1, 60, 0.0, 1.0)]).expect("valid");
    assert_eq!(
        sentence.lookup(sentence.notes()[0].note_ref()).map(|n| n.midi_note),
        Some(60)
    );
    assert!(sentence
        .lookup(canto_ports::types::NoteRef {
            sentence: SentenceId(2),
            note: NoteId(1),
        })
        .is_none());
    assert!(sentence
        .lookup(canto_ports::types::NoteRef {
            sentence: SentenceId(1),
            note: NoteId(9),
        })
        .is_none());
}

#[test]
fn song_meta_converts_file_bpm_to_beats_per_second() {
    let meta = SongMeta::new("Title", "Artist", 300.0).expect("valid bpm");
    assert_eq!(meta.beats_per_second(), 20.0);
    assert!(SongMeta::new("Title", "Artist", 0.0).is_err());
}

#[test]
fn pitch_names_are_absolute() {
    assert_eq!(absolute_name(60), "C4");
    assert_eq!(absolute_name(69), "A4");
    assert_eq!(absolute_name(61), "C#4");
    assert_eq!(absolute_name(0), "C-1");
    assert_eq!(pitch_class(-1), 11);
}
