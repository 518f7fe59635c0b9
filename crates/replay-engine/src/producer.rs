//! The replay producer: one composed frame per tick.

use crate::carry::{fractional_step, FieldCarry};
use crate::command::{ReplayCommand, SeekTarget};
use crate::config::ReplayConfig;
use crate::control::{ReplayControl, ReplayStatus};
use crate::playhead::Playhead;
use crate::regime::Regime;
use crate::speed::{PlaybackState, SpeedController};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use replay_compose::FieldCompositor;
use replay_core::{FrameBuffer, PixelFormat, Result, SharedFrameBuffer};
use replay_media::{
    ClipPaths, EssenceReader, IndexHeader, IndexNavigator, PayloadDecoder, RawBgraDecoder,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Plays one recorded clip at a variable speed.
///
/// Call [`receive`](Self::receive) once per output tick. Speed and position
/// are changed either directly (`call`, `set_speed`, `seek`, ...) or through
/// a [`ReplayControl`] handle from another thread.
pub struct ReplayProducer {
    clip: String,
    playhead: Playhead,
    compositor: FieldCompositor,
    speed: SpeedController,
    carry: Option<FieldCarry>,
    just_seeked: bool,
    last_frame: SharedFrameBuffer,
    shown_entry: u64,
    ticks: u64,
    repeats: u64,
    end_of_data: bool,
    last_tick_us: u64,
    commands: Receiver<ReplayCommand>,
    sender: Sender<ReplayCommand>,
    status: Arc<RwLock<ReplayStatus>>,
}

impl ReplayProducer {
    /// Open the clip whose essence lives at `essence`; the index sits next to
    /// it with the configured extension.
    pub fn open<P: AsRef<Path>>(
        essence: P,
        start: Option<SeekTarget>,
        config: &ReplayConfig,
    ) -> Result<Self> {
        let paths = ClipPaths::for_essence(essence, &config.index_extension);
        Self::open_with_decoder(&paths, start, config, Box::new(RawBgraDecoder))
    }

    /// Open a clip by name inside the configured media folder.
    pub fn open_clip(name: &str, start: Option<SeekTarget>, config: &ReplayConfig) -> Result<Self> {
        let paths = ClipPaths::resolve(
            &config.media_folder,
            name,
            &config.extensions,
            &config.index_extension,
        )?;
        Self::open_with_decoder(&paths, start, config, Box::new(RawBgraDecoder))
    }

    /// Open a clip whose payloads need a specific decoder.
    ///
    /// Blocks while the index is still empty, for at most the configured
    /// open timeout.
    pub fn open_with_decoder(
        paths: &ClipPaths,
        start: Option<SeekTarget>,
        config: &ReplayConfig,
        decoder: Box<dyn PayloadDecoder>,
    ) -> Result<Self> {
        config.validate()?;
        let essence = EssenceReader::open_with_decoder(&paths.essence, decoder)?;
        let index = IndexNavigator::open(&paths.index, &config.open_policy())?
            .with_from_end_margin(config.from_end_margin);

        let header = *index.header();
        let compositor = FieldCompositor::new(header.field_mode, config.blend_precision);
        let black = FrameBuffer::new(header.width, header.height, PixelFormat::Bgra8);
        let (sender, commands) = unbounded();

        let mut producer = Self {
            clip: paths.clip_name(),
            playhead: Playhead::new(index, essence),
            compositor,
            speed: SpeedController::new(),
            carry: None,
            just_seeked: false,
            last_frame: Arc::new(black),
            shown_entry: 0,
            ticks: 0,
            repeats: 0,
            end_of_data: false,
            last_tick_us: 0,
            commands,
            sender,
            status: Arc::new(RwLock::new(ReplayStatus::default())),
        };

        if let Some(target) = start {
            producer.seek(target)?;
        }
        producer.publish();

        info!(
            "Replay of {} ready: {}x{} {}, {:?} blend",
            producer.clip,
            header.width,
            header.height,
            header.field_mode,
            config.blend_precision
        );
        Ok(producer)
    }

    /// Produce the frame for the next tick.
    ///
    /// Never fails: running out of data or a failed read shows the previous
    /// frame again.
    ///
    /// # Panics
    ///
    /// If two fields of the clip decode to different geometries.
    pub fn receive(&mut self) -> SharedFrameBuffer {
        let started = Instant::now();
        self.drain_commands();

        let state = self.speed.state();
        let regime = Regime::select(
            &state,
            self.compositor.field_mode(),
            self.just_seeked,
            self.ticks,
        );
        self.just_seeked = false;

        let produced = match regime {
            Regime::Paused | Regime::SlowHold => None,
            Regime::FractionalBlend => self.fractional(&state),
            Regime::SeekRefresh | Regime::StandardStep => {
                self.carry = None;
                self.standard(&state)
            }
        };

        match produced {
            Some((frame, entry)) => {
                self.last_frame = Arc::new(frame);
                self.shown_entry = entry;
                self.end_of_data = false;
            }
            None => {
                self.repeats += 1;
                if !regime.repeats() {
                    self.end_of_data = true;
                }
            }
        }

        self.ticks += 1;
        self.last_tick_us = started.elapsed().as_micros() as u64;
        trace!(
            "Tick {} {:?}: entry {}, {} us",
            self.ticks,
            regime,
            self.playhead.position(),
            self.last_tick_us
        );
        self.publish();
        Arc::clone(&self.last_frame)
    }

    /// Parse and apply a text command right away.
    pub fn call(&mut self, line: &str) -> Result<()> {
        let command: ReplayCommand = line.parse()?;
        self.apply(command)
    }

    /// Apply a parsed command right away.
    pub fn apply(&mut self, command: ReplayCommand) -> Result<()> {
        match command {
            ReplayCommand::Pause => {
                self.pause();
                Ok(())
            }
            ReplayCommand::Speed(speed) => self.set_speed(speed),
            ReplayCommand::Seek(target) => self.seek(target).map(|_| ()),
        }
    }

    /// Freeze on the current frame.
    pub fn pause(&mut self) {
        self.speed.pause();
        self.publish();
    }

    /// Change the signed playback speed; 0 pauses.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        let previous = self.speed.state();
        let state = self.speed.set_speed(speed)?;
        if state.speed() > 0.0 {
            self.playhead.clear_rewind_guard();
        }
        if state.reverse() != previous.reverse() {
            self.carry = None;
        }
        self.publish();
        Ok(())
    }

    /// Move the playhead; `target` counts frames. Returns the new index entry.
    pub fn seek(&mut self, target: SeekTarget) -> Result<u64> {
        let per_frame = self.compositor.field_mode().entries_per_frame();
        let entry = self
            .playhead
            .seek(target.amount.saturating_mul(per_frame), target.mode)?;
        self.carry = None;
        self.just_seeked = true;
        self.publish();
        info!("Seek {} on {} -> entry {}", target, self.clip, entry);
        Ok(entry)
    }

    /// Handle for steering this producer from other threads.
    pub fn control(&self) -> ReplayControl {
        ReplayControl::new(self.sender.clone(), Arc::clone(&self.status))
    }

    pub fn status(&self) -> ReplayStatus {
        self.status.read().clone()
    }

    /// Frame returned by the last tick (black before the first one).
    pub fn last_frame(&self) -> SharedFrameBuffer {
        Arc::clone(&self.last_frame)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.speed.state()
    }

    pub fn header(&self) -> &IndexHeader {
        self.playhead.header()
    }

    /// Index entry the next fresh read starts at.
    pub fn position(&self) -> u64 {
        self.playhead.position()
    }

    /// Log the one-line status.
    pub fn print(&self) {
        info!("{}", self.status());
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            if let Err(e) = self.apply(command) {
                warn!("Command '{}' on {} failed: {}", command, self.clip, e);
            }
        }
    }

    fn standard(&mut self, state: &PlaybackState) -> Option<(FrameBuffer, u64)> {
        let reverse = state.reverse();
        let stride = state.stride() as i64;

        if !self.compositor.field_mode().is_interlaced() {
            let source = self.playhead.read_entry()?;
            self.playhead
                .step(if reverse { -1 - stride } else { stride - 1 });
            // parity of the running frame count after the step
            let odd = (source.entry + stride as u64) % 2 == 1;
            let frame = self.compositor.progressive(source.buffer, odd);
            return Some((frame, source.entry));
        }

        if state.divider() > 1 {
            let source = self.playhead.read_entry()?;
            if reverse {
                self.playhead.step(-2);
            }
            return Some((self.compositor.single_field(&source.buffer), source.entry));
        }

        self.playhead.align_to_frame(reverse);
        let first = self.playhead.read_entry()?;
        let Some(second) = self.playhead.read_entry() else {
            self.playhead.step(-1);
            return None;
        };
        self.playhead
            .step(if reverse { -2 - 2 * stride } else { 2 * (stride - 1) });
        let frame = composed(self.compositor.interlace(&first.buffer, &second.buffer));
        Some((frame, first.entry))
    }

    fn fractional(&mut self, state: &PlaybackState) -> Option<(FrameBuffer, u64)> {
        let reverse = state.reverse();
        if self.carry.is_none() && !reverse {
            self.playhead.align_to_frame(false);
        }

        let mut fields = self.playhead.fields(reverse);
        let frame = composed(fractional_step(
            &mut self.carry,
            &mut fields,
            state.abs_speed(),
            &self.compositor,
        ))?;

        let entry = if self.playhead.is_before_start() {
            0
        } else if reverse {
            self.playhead.position() + 1
        } else {
            self.playhead.position().saturating_sub(1)
        };
        Some((frame, entry))
    }

    fn publish(&self) {
        let per_frame = self.compositor.field_mode().entries_per_frame();
        let mut status = self.status.write();
        status.clip.clone_from(&self.clip);
        status.frame = self.shown_entry / per_frame;
        status.entry = self.playhead.position();
        status.speed = self.speed.state().speed();
        status.ticks = self.ticks;
        status.repeats = self.repeats;
        status.end_of_data = self.end_of_data;
        status.last_tick_us = self.last_tick_us;
    }
}

impl Drop for ReplayProducer {
    fn drop(&mut self) {
        debug!(
            "Closing replay of {} after {} ticks",
            self.clip, self.ticks
        );
    }
}

/// Unwrap a composition result.
///
/// # Panics
///
/// On any error: the only failure is a geometry mismatch between fields of
/// one clip, which no later tick can recover from.
fn composed<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("Field composition failed: {}", e),
    }
}
