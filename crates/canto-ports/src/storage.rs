use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTE_ROW_COUNT: u32 = 16;

fn default_note_row_count() -> u32 {
    DEFAULT_NOTE_ROW_COUNT
}

fn default_show_lyrics_on_notes() -> bool {
    true
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    #[serde(default = "default_note_row_count")]
    pub note_row_count: u32,
    pub display_rounded_and_actual_recorded_notes: bool,
    pub show_pitch_of_notes: bool,
    #[serde(default = "default_show_lyrics_on_notes")]
    pub show_lyrics_on_notes: bool,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            note_row_count: DEFAULT_NOTE_ROW_COUNT,
            display_rounded_and_actual_recorded_notes: false,
            show_pitch_of_notes: false,
            show_lyrics_on_notes: true,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
