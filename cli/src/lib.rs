//! Scripted replay of a singing session through [`StaffCore`].
//!
//! A script names the song, the sentences it may display and a timeline of
//! actions keyed by wall-clock seconds. The replay runs a fixed-rate frame
//! clock, applies every action that is due, ticks the core and hands each
//! drained event to a sink.

use anyhow::{bail, Context, Result};
use canto_core::{Command, Event, StaffCore};
use canto_domain_song::{Sentence, SongMeta};
use canto_ports::pitch::PitchEvent;
use canto_ports::types::SentenceId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Script {
    pub song: SongMeta,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineEntry {
    pub at_seconds: f64,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Replay(ReplayAction),
    Core(Command),
}

/// Actions that only exist in scripts.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ReplayAction {
    Pitch(PitchEvent),
    ShowSentence { id: SentenceId },
}

impl Script {
    pub fn from_json(data: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(data).context("invalid replay script")?;
        for entry in &script.timeline {
            if !entry.at_seconds.is_finite() || entry.at_seconds < 0.0 {
                bail!("timeline entry at {} seconds is out of range", entry.at_seconds);
            }
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&data)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReplayOptions {
    pub fps: u32,
    pub max_seconds: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            max_seconds: 600.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReplayStats {
    pub frames: u64,
    pub events: u64,
    pub failed_actions: u64,
}

pub fn replay<F>(core: &mut StaffCore, script: Script, opts: ReplayOptions, mut sink: F) -> Result<ReplayStats>
where
    F: FnMut(Event) -> Result<()>,
{
    if opts.fps == 0 {
        bail!("fps must be positive");
    }
    let frame_seconds = 1.0 / f64::from(opts.fps);

    core.handle_command(Command::LoadSong { meta: script.song })
        .context("failed to load song")?;

    let sentences: HashMap<SentenceId, Sentence> = script
        .sentences
        .into_iter()
        .map(|sentence| (sentence.id(), sentence))
        .collect();

    let mut timeline = script.timeline;
    timeline.sort_by(|a, b| a.at_seconds.total_cmp(&b.at_seconds));
    let mut timeline = timeline.into_iter().peekable();

    let mut stats = ReplayStats::default();
    loop {
        let now = stats.frames as f64 * frame_seconds;
        if now > opts.max_seconds {
            tracing::warn!(now, "replay stopped at time limit");
            break;
        }

        while let Some(entry) = timeline.next_if(|entry| entry.at_seconds <= now) {
            if !apply(core, &sentences, entry.action) {
                stats.failed_actions += 1;
            }
        }

        core.tick(frame_seconds);
        for event in core.drain_events() {
            sink(event)?;
            stats.events += 1;
        }
        stats.frames += 1;

        let animating = core.window().segments().iter().any(|s| s.is_animating());
        if timeline.peek().is_none() && !animating {
            break;
        }
    }

    tracing::info!(
        frames = stats.frames,
        events = stats.events,
        failed_actions = stats.failed_actions,
        "replay finished"
    );
    Ok(stats)
}

fn apply(core: &mut StaffCore, sentences: &HashMap<SentenceId, Sentence>, action: Action) -> bool {
    let cmd = match action {
        Action::Replay(ReplayAction::Pitch(event)) => {
            core.submit_pitch_event(event);
            return true;
        }
        Action::Replay(ReplayAction::ShowSentence { id }) => match sentences.get(&id) {
            Some(sentence) => Command::DisplaySentence {
                sentence: sentence.clone(),
            },
            None => {
                tracing::warn!(sentence = %id, "script references unknown sentence");
                return false;
            }
        },
        Action::Core(cmd) => cmd,
    };

    match core.handle_command(cmd) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "command failed");
            false
        }
    }
}
