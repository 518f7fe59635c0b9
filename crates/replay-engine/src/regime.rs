//! Per-tick production regime.

use crate::speed::PlaybackState;
use replay_core::FieldMode;

/// Speeds below this hold each source frame for `divider` ticks.
pub const SLOW_HOLD_BELOW: f64 = 0.5;

/// What one tick does, decided before any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Paused: repeat the last frame.
    Paused,
    /// Paused right after a seek: show the frame at the new position once.
    SeekRefresh,
    /// Slow motion between two source frames: repeat the last frame.
    SlowHold,
    /// Interlaced speed strictly between 0.5 and 1: cross-fade fields
    /// through the carry.
    FractionalBlend,
    /// Read, compose and step the playhead.
    StandardStep,
}

impl Regime {
    /// Pick the regime for the tick numbered `tick` (counting every tick).
    pub fn select(
        state: &PlaybackState,
        field_mode: FieldMode,
        just_seeked: bool,
        tick: u64,
    ) -> Self {
        if state.is_paused() {
            return if just_seeked {
                Self::SeekRefresh
            } else {
                Self::Paused
            };
        }

        let abs = state.abs_speed();
        if abs < SLOW_HOLD_BELOW {
            let divider = state.divider().max(1) as u64;
            return if tick % divider != 0 {
                Self::SlowHold
            } else {
                Self::StandardStep
            };
        }

        if abs > SLOW_HOLD_BELOW && abs < 1.0 && field_mode.is_interlaced() {
            return Self::FractionalBlend;
        }

        Self::StandardStep
    }

    /// Whether the tick reuses the previous frame without touching the index.
    #[inline]
    pub fn repeats(self) -> bool {
        matches!(self, Self::Paused | Self::SlowHold)
    }
}
