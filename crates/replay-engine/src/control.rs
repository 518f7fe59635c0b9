//! Cross-thread control handle and shared status.

use crate::command::{ReplayCommand, SeekTarget};
use crossbeam_channel::Sender;
use parking_lot::RwLock;
use replay_core::{ReplayError, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Snapshot of a producer, refreshed after every tick and command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayStatus {
    /// Essence file name
    pub clip: String,
    /// Source frame currently shown
    pub frame: u64,
    /// Index entry the next fresh read starts at
    pub entry: u64,
    /// Signed playback speed
    pub speed: f64,
    /// Ticks produced so far
    pub ticks: u64,
    /// Ticks that reused the previous frame
    pub repeats: u64,
    /// Whether the last fresh read found nothing
    pub end_of_data: bool,
    /// Duration of the last tick in microseconds
    pub last_tick_us: u64,
}

impl fmt::Display for ReplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replay[{}|{}|{}]", self.clip, self.frame, self.speed)
    }
}

/// Cloneable handle for steering a producer from other threads.
///
/// Commands are validated here and applied by the producer at the start of
/// its next tick.
#[derive(Clone)]
pub struct ReplayControl {
    commands: Sender<ReplayCommand>,
    status: Arc<RwLock<ReplayStatus>>,
}

impl ReplayControl {
    pub(crate) fn new(commands: Sender<ReplayCommand>, status: Arc<RwLock<ReplayStatus>>) -> Self {
        Self { commands, status }
    }

    /// Parse and queue one text command.
    pub fn call(&self, line: &str) -> Result<()> {
        let command: ReplayCommand = line.parse()?;
        self.send(command)
    }

    /// Queue an already parsed command.
    pub fn send(&self, command: ReplayCommand) -> Result<()> {
        if let ReplayCommand::Speed(speed) = command {
            if !speed.is_finite() {
                return Err(ReplayError::InvalidArgument(format!(
                    "Speed must be finite, got {}",
                    speed
                )));
            }
        }
        self.commands
            .send(command)
            .map_err(|_| ReplayError::Disconnected)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(ReplayCommand::Pause)
    }

    pub fn set_speed(&self, speed: f64) -> Result<()> {
        self.send(ReplayCommand::Speed(speed))
    }

    pub fn seek(&self, target: SeekTarget) -> Result<()> {
        self.send(ReplayCommand::Seek(target))
    }

    /// Latest published status.
    pub fn status(&self) -> ReplayStatus {
        self.status.read().clone()
    }
}
