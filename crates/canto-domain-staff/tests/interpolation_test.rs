use canto_domain_staff::{advance_all, advance_segment, RecordedSegment, SegmentId, SegmentKind};
use canto_ports::types::{NoteId, NoteRef, SentenceId};
use pretty_assertions::assert_eq;

fn segment(id: u32, start: f64, target_end: f64) -> RecordedSegment {
    RecordedSegment {
        id: SegmentId(id),
        note: NoteRef {
            sentence: SentenceId(1),
            note: NoteId(1),
        },
        kind: SegmentKind::Rounded,
        midi_note: 60,
        start_beat: start,
        target_end_beat: target_end,
        end_beat: start,
        lifetime_seconds: 0.0,
    }
}

#[test]
fn end_sweeps_at_tempo_and_clamps_at_target() {
    let mut seg = segment(0, 0.0, 4.0);

    assert!(advance_segment(&mut seg, 1.0, 2.0));
    assert_eq!(seg.end_beat, 2.0);

    assert!(advance_segment(&mut seg, 3.0, 2.0));
    assert_eq!(seg.end_beat, 4.0);
    assert!(!seg.is_animating());
}

#[test]
fn end_never_passes_target() {
    let mut seg = segment(0, 8.0, 10.5);
    for step in 0..200 {
        advance_segment(&mut seg, step as f64 * 0.05, 3.3);
        assert!(seg.end_beat <= seg.target_end_beat);
    }
    assert_eq!(seg.end_beat, 10.5);
}

#[test]
fn inert_segments_keep_aging_and_resume_when_target_grows() {
    let mut segments = vec![segment(0, 0.0, 1.0), segment(1, 0.0, 10.0)];

    let moved = advance_all(&mut segments, 1.0, 2.0);
    assert_eq!(moved, vec![SegmentId(0), SegmentId(1)]);
    assert_eq!(segments[0].end_beat, 1.0);
    assert_eq!(segments[1].end_beat, 2.0);

    let moved = advance_all(&mut segments, 1.0, 2.0);
    assert_eq!(moved, vec![SegmentId(1)]);
    assert_eq!(segments[0].lifetime_seconds, 2.0);

    segments[0].target_end_beat = 8.0;
    let moved = advance_all(&mut segments, 1.0, 2.0);
    assert_eq!(moved, vec![SegmentId(0), SegmentId(1)]);
    assert_eq!(segments[0].end_beat, 6.0);
}
