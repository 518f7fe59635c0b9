//! Replay Engine - variable-speed playback of growing recordings
//!
//! This crate ties index navigation and field composition together:
//! - `speed`: signed speed and the values derived from it
//! - `command`: the PAUSE / SPEED / SEEK text protocol
//! - `regime`: what a tick does at the current speed
//! - `carry`: fractional-speed field cross-fading
//! - `playhead`: index cursor paired with its essence reader
//! - `producer`: the per-tick orchestrator
//! - `control`: cross-thread handle and status snapshot
//! - `config`: JSON configuration

pub mod carry;
pub mod command;
pub mod config;
pub mod control;
pub mod playhead;
pub mod producer;
pub mod regime;
pub mod speed;

pub use command::{ReplayCommand, SeekTarget};
pub use config::ReplayConfig;
pub use control::{ReplayControl, ReplayStatus};
pub use producer::ReplayProducer;
pub use regime::Regime;
pub use speed::{PlaybackState, SpeedController};
