//! Playback speed state.
//!
//! Speed, divider, multiplier and direction depend on each other, so they
//! live in one `Copy` value that is replaced whole on every change.

use replay_core::{ReplayError, Result};
use serde::Serialize;
use tracing::info;

/// Derived playback parameters for one speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    speed: f64,
    divider: u32,
    multiplier: u32,
    reverse: bool,
}

impl PlaybackState {
    /// Normal forward playback.
    pub const NORMAL: Self = Self {
        speed: 1.0,
        divider: 1,
        multiplier: 1,
        reverse: false,
    };

    /// Frozen on the last frame.
    pub const PAUSED: Self = Self {
        speed: 0.0,
        divider: 0,
        multiplier: 0,
        reverse: false,
    };

    /// Derive the full state for a signed speed.
    pub fn from_speed(speed: f64) -> Self {
        let abs = speed.abs();
        let divider = if speed != 0.0 {
            (1.0 / abs).floor() as u32
        } else {
            0
        };
        Self {
            speed,
            divider,
            multiplier: abs.floor() as u32,
            reverse: speed < 0.0,
        }
    }

    /// Signed speed, 0 when paused.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn abs_speed(&self) -> f64 {
        self.speed.abs()
    }

    /// Ticks each source frame is held for in slow motion.
    #[inline]
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// Source entries skipped per tick in fast motion.
    #[inline]
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    #[inline]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.speed == 0.0
    }

    /// Source units (frames, or field pairs) advanced per produced frame,
    /// never less than one.
    #[inline]
    pub fn stride(&self) -> u64 {
        self.multiplier.max(1) as u64
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Holds the current [`PlaybackState`] and applies speed commands.
#[derive(Debug, Clone, Default)]
pub struct SpeedController {
    state: PlaybackState,
}

impl SpeedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Freeze on the last composed frame.
    pub fn pause(&mut self) -> PlaybackState {
        self.state = PlaybackState::PAUSED;
        info!("Playback paused");
        self.state
    }

    /// Switch to a new signed speed.
    pub fn set_speed(&mut self, speed: f64) -> Result<PlaybackState> {
        if !speed.is_finite() {
            return Err(ReplayError::InvalidArgument(format!(
                "Speed must be finite, got {}",
                speed
            )));
        }
        self.state = PlaybackState::from_speed(speed);
        info!(
            "Playback speed {} (divider {}, multiplier {}{})",
            speed,
            self.state.divider,
            self.state.multiplier,
            if self.state.reverse { ", reverse" } else { "" }
        );
        Ok(self.state)
    }
}
