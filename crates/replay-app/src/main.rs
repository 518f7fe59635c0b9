//! Replay - variable-speed player for growing recordings
//!
//! Plays one clip at a fixed tick rate. Control commands (`PAUSE`,
//! `SPEED <x>`, `SEEK [+|-||]<n>`) are read line by line from stdin.

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::Receiver;
use replay_engine::{ReplayConfig, ReplayProducer, SeekTarget};
use std::fmt::Display;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "replay", version, about = "Variable-speed replay of recorded clips")]
struct Cli {
    /// Essence file, or clip name inside the media folder
    clip: String,

    /// Folder clip names are resolved against
    #[arg(long = "media-folder")]
    media_folder: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start position: absolute frame, or |N for N frames before the live end
    #[arg(long)]
    seek: Option<String>,

    /// Initial playback speed
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    speed: f64,

    /// Stop after this many ticks (0 runs until stdin closes)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Output ticks per second
    #[arg(long, default_value_t = 25.0)]
    fps: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        anyhow::bail!("--fps must be a positive number, got {}", cli.fps);
    }

    let mut config = match &cli.config {
        Some(path) => ReplayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReplayConfig::default(),
    };
    if let Some(folder) = cli.media_folder {
        config.media_folder = folder;
    }

    let start = cli
        .seek
        .as_deref()
        .map(SeekTarget::parse_start)
        .transpose()
        .context("parsing --seek")?;

    let essence = PathBuf::from(&cli.clip);
    let mut producer = if essence.is_file() {
        ReplayProducer::open(&essence, start, &config)
    } else {
        ReplayProducer::open_clip(&cli.clip, start, &config)
    }
    .with_context(|| format!("opening clip {}", cli.clip))?;
    producer.set_speed(cli.speed)?;

    let control = producer.control();
    let done = spawn_command_reader(BufReader::new(std::io::stdin()), move |line| {
        control.call(line)
    });
    let period = Duration::from_secs_f64(1.0 / cli.fps);
    let report_every = cli.fps.round().max(1.0) as u64;
    info!("Playing {} at {} fps", cli.clip, cli.fps);

    let mut next_tick = Instant::now();
    let mut tick = 0u64;
    loop {
        let frame = producer.receive();
        tick += 1;
        if tick % report_every == 0 {
            let status = producer.status();
            println!(
                "{} {}x{} entry {} repeats {}{}",
                status,
                frame.width,
                frame.height,
                status.entry,
                status.repeats,
                if status.end_of_data { " (end of data)" } else { "" }
            );
        }

        if cli.ticks > 0 && tick >= cli.ticks {
            break;
        }
        if cli.ticks == 0 && done.try_recv().is_ok() {
            break;
        }

        next_tick += period;
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            next_tick = now;
        }
    }

    producer.print();
    Ok(())
}

/// Forward command lines to `submit`; the returned channel fires at EOF.
fn spawn_command_reader<R, F, E>(input: R, mut submit: F) -> Receiver<()>
where
    R: BufRead + Send + 'static,
    F: FnMut(&str) -> std::result::Result<(), E> + Send + 'static,
    E: Display,
{
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Reading commands failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match submit(&line) {
                Ok(()) => info!("Queued '{}'", line.trim()),
                Err(e) => warn!("Rejected '{}': {}", line.trim(), e),
            }
        }
        let _ = done_tx.send(());
    });
    done_rx
}
