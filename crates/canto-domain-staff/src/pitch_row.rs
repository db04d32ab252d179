use canto_domain_song::{pitch_class, TargetNote};
use canto_ports::types::{MidiNote, MAX_MIDI_NOTE, MIN_MIDI_NOTE};
use serde::{Deserialize, Serialize};

/// One row for every note of an octave.
pub const MIN_NOTE_ROW_COUNT: u32 = 12;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffError {
    #[error("note row count must be >= 12 (one row for each note in an octave), got {0}")]
    RowCountTooSmall(u32),
}

pub fn validate_row_count(row_count: u32) -> Result<(), StaffError> {
    if row_count < MIN_NOTE_ROW_COUNT {
        return Err(StaffError::RowCountTooSmall(row_count));
    }
    Ok(())
}

/// Vertical layout of one sentence: rows centred on the average pitch.
///
/// Notes are placed on and between the drawn staff lines. The middle row
/// (`row_count / 2`) holds the average pitch, and any pitch outside the
/// half-window bounds is moved by whole octaves until it fits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    row_count: u32,
    avg_midi_note: MidiNote,
    min_midi_note: MidiNote,
    max_midi_note: MidiNote,
    note_height: f64,
}

impl DisplayWindow {
    pub fn new(row_count: u32, avg_midi_note: MidiNote) -> Result<Self, StaffError> {
        validate_row_count(row_count)?;
        // 13 rows still reach 6 each way.
        let half = (row_count / 2) as MidiNote;
        Ok(Self {
            row_count,
            avg_midi_note,
            min_midi_note: avg_midi_note - half,
            max_midi_note: avg_midi_note + half,
            note_height: 1.0 / row_count as f64,
        })
    }

    pub fn for_notes<'a>(
        row_count: u32,
        notes: impl IntoIterator<Item = &'a TargetNote>,
    ) -> Result<Self, StaffError> {
        Self::new(row_count, average_midi_note(notes))
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn avg_midi_note(&self) -> MidiNote {
        self.avg_midi_note
    }

    pub fn min_midi_note(&self) -> MidiNote {
        self.min_midi_note
    }

    pub fn max_midi_note(&self) -> MidiNote {
        self.max_midi_note
    }

    pub fn note_height(&self) -> f64 {
        self.note_height
    }

    /// Moves `midi_note` by octaves into `[min_midi_note, max_midi_note]`.
    ///
    /// Pitches that would have to leave 0..=127 to fit stay clipped at the
    /// edge of the MIDI range instead.
    pub fn wrap(&self, midi_note: MidiNote) -> MidiNote {
        let mut wrapped = midi_note;
        while wrapped > self.max_midi_note && wrapped > MIN_MIDI_NOTE {
            wrapped -= 12;
        }
        while wrapped < self.min_midi_note && wrapped < MAX_MIDI_NOTE {
            wrapped += 12;
        }
        wrapped
    }

    pub fn row(&self, midi_note: MidiNote) -> i32 {
        let offset = self.wrap(midi_note) - self.avg_midi_note;
        (self.row_count / 2) as i32 + offset
    }

    /// Bottom and top of the bar for `midi_note` as fractions of the staff height.
    pub fn vertical_band(&self, midi_note: MidiNote) -> (f64, f64) {
        let centre = self.row(midi_note) as f64 / self.row_count as f64;
        (centre - self.note_height, centre + self.note_height)
    }
}

/// Truncated mean pitch of the non-freestyle notes, 0 when there are none.
pub fn average_midi_note<'a>(notes: impl IntoIterator<Item = &'a TargetNote>) -> MidiNote {
    let (sum, count) = notes
        .into_iter()
        .filter(|note| !note.is_freestyle())
        .fold((0i64, 0i64), |(sum, count), note| {
            (sum + note.midi_note as i64, count + 1)
        });
    if count == 0 {
        0
    } else {
        (sum / count) as MidiNote
    }
}

/// Signed distance in semitones from the pitch class of `from` to the pitch class of `to`.
///
/// The result lies in `-5..=6`; a tritone resolves upwards to `+6`.
pub fn signed_pitch_class_distance(from: MidiNote, to: MidiNote) -> MidiNote {
    let up = (to - from).rem_euclid(12);
    if up > 6 {
        up - 12
    } else {
        up
    }
}

/// Moves `rounded_midi_note` onto the octave of `target_midi_note`.
///
/// The pitch class is kept; only the octave changes.
pub fn reoctave(rounded_midi_note: MidiNote, target_midi_note: MidiNote) -> MidiNote {
    let displayed = target_midi_note + signed_pitch_class_distance(target_midi_note, rounded_midi_note);
    if pitch_class(displayed) != pitch_class(rounded_midi_note) {
        tracing::error!(
            rounded = rounded_midi_note,
            target = target_midi_note,
            displayed,
            "displayed midi note does not correspond to the rounded recorded midi note"
        );
    }
    displayed
}

