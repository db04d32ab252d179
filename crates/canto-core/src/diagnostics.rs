use canto_domain_staff::{DisplayWindow, RecordedSegment};
use canto_ports::pitch::PitchEvent;
use canto_ports::storage::{SettingsDto, StorageError};
use canto_ports::types::SentenceId;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct StaffSnapshot {
    pub sentence: Option<SentenceId>,
    pub display_window: Option<DisplayWindow>,
    pub beats_per_second: f64,
    pub segments: Vec<RecordedSegment>,
}

#[derive(Serialize)]
struct RecentPitchEvents {
    events: Vec<PitchEvent>,
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    snapshot: &StaffSnapshot,
    recent_events: Vec<PitchEvent>,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "Canto".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(&dir.join("staff_snapshot.json"), snapshot)?;
    write_json(
        &dir.join("recent_pitch_events.json"),
        &RecentPitchEvents {
            events: recent_events,
        },
    )?;

    tracing::info!(path = %dir.display(), "diagnostics exported");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
