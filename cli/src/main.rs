use anyhow::Result;
use canto_cli::{replay, ReplayOptions, Script};
use canto_core::StaffCore;
use canto_infra_storage_fs::FsStorage;
use canto_ports::storage::StoragePort;
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canto-replay")]
#[command(about = "Replay a scripted singing session and print staff events as JSON lines")]
#[command(version)]
struct Cli {
    /// Replay script (JSON)
    #[arg(short, long)]
    script: PathBuf,

    /// Display frames per second
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,

    /// Settings directory (defaults to the user config dir)
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Stop after this many seconds of replay time
    #[arg(long, default_value = "600")]
    max_seconds: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("canto-replay {} starting", env!("CARGO_PKG_VERSION"));

    let script = Script::load(&cli.script)?;
    let storage = match cli.settings_dir {
        Some(dir) => FsStorage::new(dir),
        None => FsStorage::default(),
    };
    tracing::info!(dir = %storage.base_dir().display(), "using settings directory");
    let storage: Option<Box<dyn StoragePort>> = Some(Box::new(storage));
    let mut core = StaffCore::new(None, storage)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let opts = ReplayOptions {
        fps: cli.fps,
        max_seconds: cli.max_seconds,
    };
    replay(&mut core, script, opts, |event| {
        serde_json::to_writer(&mut out, &event)?;
        out.write_all(b"\n")?;
        Ok(())
    })?;
    out.flush()?;
    Ok(())
}
