use crate::segment::{RecordedSegment, SegmentId};

/// Recomputes the drawn end of `segment` from the real time since its creation.
///
/// The end sweeps at song tempo from the start beat and never passes the
/// target end. Returns true when the drawn end moved.
pub fn advance_segment(segment: &mut RecordedSegment, elapsed_seconds: f64, beats_per_second: f64) -> bool {
    let swept = segment.start_beat + elapsed_seconds * beats_per_second;
    let end_beat = swept.min(segment.target_end_beat);
    if end_beat == segment.end_beat {
        return false;
    }
    segment.end_beat = end_beat;
    true
}

/// Ages every segment by one frame and advances the ones still growing.
pub fn advance_all(
    segments: &mut [RecordedSegment],
    frame_seconds: f64,
    beats_per_second: f64,
) -> Vec<SegmentId> {
    let mut moved = Vec::new();
    for segment in segments.iter_mut() {
        segment.lifetime_seconds += frame_seconds;
        if !segment.is_animating() {
            continue;
        }
        let elapsed = segment.lifetime_seconds;
        if advance_segment(segment, elapsed, beats_per_second) {
            moved.push(segment.id);
        }
    }
    moved
}
