use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::interp::{AnimationState, InterpolatedFrame, Interpolator};
use crate::clock::time::TimeSource;
use crate::config::AnimationConfig;
use crate::data::dataset::Dataset;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SolarError, SolarResult};
use crate::render::surface::{RenderCtx, RenderSurface, SurfaceInfo};
use crate::scene::mapper::{SceneMapper, SceneParameters};
use crate::scene::rotation::RotationAccumulator;

/// Timing options for [`AnimationClock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockOpts {
    /// Dwell time per year.
    pub slot: Duration,
    /// Tick cadence.
    pub fps: Fps,
    /// Rotation step per tick, in degrees.
    pub rotation_step_deg: f64,
    /// Easing of slot progress.
    pub ease: Ease,
    /// Canvas announced to surfaces.
    pub canvas: Canvas,
}

impl ClockOpts {
    /// Extract clock options from a validated configuration.
    pub fn from_config(cfg: &AnimationConfig) -> SolarResult<Self> {
        Ok(Self {
            slot: cfg.slot_duration()?,
            fps: Fps::new(cfg.fps.num, cfg.fps.den)?,
            rotation_step_deg: cfg.rotation_step_deg,
            ease: cfg.ease,
            canvas: cfg.canvas,
        })
    }
}

/// Externally visible clock state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    /// Not started, or stopped.
    Idle,
    /// Ticking.
    Running,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Idle,
    Running { start: Duration, slot_start: Duration },
}

/// Cloneable handle that requests a stop from outside the tick loop.
///
/// The request is honored before the next tick; an in-flight tick is never interrupted.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a stop. Calling it more than once has no further effect.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested and not yet honored.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume a pending request; returns whether there was one.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Bounds for [`AnimationClock::run`]. Unbounded fields run until stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunLimit {
    /// Maximum number of ticks.
    pub max_ticks: Option<u64>,
    /// Maximum time since `start` at which a tick may still fire.
    pub max_elapsed: Option<Duration>,
}

impl RunLimit {
    /// Stop after `n` ticks.
    pub fn ticks(n: u64) -> Self {
        Self {
            max_ticks: Some(n),
            max_elapsed: None,
        }
    }

    /// Stop once `d` has elapsed since start.
    pub fn elapsed(d: Duration) -> Self {
        Self {
            max_ticks: None,
            max_elapsed: Some(d),
        }
    }
}

/// Counters accumulated since the last `start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ClockStats {
    /// Ticks processed.
    pub ticks: u64,
    /// Slot boundaries crossed.
    pub slot_advances: u64,
    /// Times the index wrapped back to the first record.
    pub loops: u64,
    /// Ticks whose render failed.
    pub render_failures: u64,
}

/// Result of one processed tick.
#[derive(Debug)]
pub struct TickReport {
    /// Frame number of this tick.
    pub frame: FrameIndex,
    /// Animation state used for this tick.
    pub state: AnimationState,
    /// Interpolated value.
    pub interpolated: InterpolatedFrame,
    /// Scene handed to the surface.
    pub scene: SceneParameters,
    /// Render failure for this tick, if any. The clock keeps running regardless.
    pub render_error: Option<SolarError>,
}

/// Single-threaded driver that owns all mutable animation state.
///
/// Each tick derives elapsed time from its [`TimeSource`], advances the slot index when a
/// slot boundary is crossed (keeping the remainder so there is no drift), interpolates,
/// advances the rotation accumulator, maps the scene and renders it.
pub struct AnimationClock<T: TimeSource> {
    dataset: Dataset,
    interp: Interpolator,
    mapper: SceneMapper,
    opts: ClockOpts,
    time: T,
    phase: Phase,
    state: AnimationState,
    rotation: RotationAccumulator,
    stop: StopHandle,
    stats: ClockStats,
}

impl<T: TimeSource> AnimationClock<T> {
    /// Create an idle clock.
    ///
    /// Zero slot duration or an invalid rotation step are [`SolarError::Config`] errors.
    pub fn new(dataset: Dataset, mapper: SceneMapper, opts: ClockOpts, time: T) -> SolarResult<Self> {
        let interp = Interpolator::new(opts.slot, opts.ease)?;
        let rotation = RotationAccumulator::new(opts.rotation_step_deg)?;
        Fps::new(opts.fps.num, opts.fps.den)?;
        Ok(Self {
            dataset,
            interp,
            mapper,
            opts,
            time,
            phase: Phase::Idle,
            state: AnimationState::default(),
            rotation,
            stop: StopHandle::default(),
            stats: ClockStats::default(),
        })
    }

    /// Build clock, mapper and interpolator from a configuration.
    pub fn from_config(dataset: Dataset, cfg: &AnimationConfig, time: T) -> SolarResult<Self> {
        cfg.validate()?;
        let mapper = SceneMapper::from_config(cfg, &dataset);
        Self::new(dataset, mapper, ClockOpts::from_config(cfg)?, time)
    }

    /// Idle -> Running. Resets the animation to the first record and clears counters.
    ///
    /// A stop requested through a [`StopHandle`] beforehand stays pending and ends the run
    /// before its first tick. Returns `false` (and does nothing) when already running.
    pub fn start(&mut self) -> bool {
        if matches!(self.phase, Phase::Running { .. }) {
            return false;
        }
        let now = self.time.now();
        self.phase = Phase::Running {
            start: now,
            slot_start: now,
        };
        self.state = AnimationState::default();
        self.stats = ClockStats::default();
        tracing::debug!(year = self.dataset.first_year(), "clock started");
        true
    }

    /// Running -> Idle. Idempotent; returns whether a transition happened.
    pub fn stop(&mut self) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Running { .. } => {
                self.phase = Phase::Idle;
                tracing::debug!(ticks = self.stats.ticks, "clock stopped");
                true
            }
        }
    }

    /// Handle for requesting a stop from outside the tick loop.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current state.
    pub fn clock_state(&self) -> ClockState {
        match self.phase {
            Phase::Idle => ClockState::Idle,
            Phase::Running { .. } => ClockState::Running,
        }
    }

    /// Animation state as of the last tick.
    pub fn animation_state(&self) -> AnimationState {
        self.state
    }

    /// Rotation accumulator.
    pub fn rotation(&self) -> &RotationAccumulator {
        &self.rotation
    }

    /// Counters since the last `start`.
    pub fn stats(&self) -> ClockStats {
        self.stats
    }

    /// The dataset being animated.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Timing options.
    pub fn opts(&self) -> &ClockOpts {
        &self.opts
    }

    /// Borrow the time source.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Mutably borrow the time source (e.g. to move a [`crate::ManualTime`]).
    pub fn time_mut(&mut self) -> &mut T {
        &mut self.time
    }

    /// Process one tick.
    ///
    /// Returns `Ok(None)` when idle or when a stop was requested (the clock becomes idle).
    /// A render failure does not make this fail: it is logged, counted and returned in the
    /// report.
    pub fn tick(&mut self, surface: &mut dyn RenderSurface) -> SolarResult<Option<TickReport>> {
        let Phase::Running {
            start,
            mut slot_start,
        } = self.phase
        else {
            return Ok(None);
        };
        if self.stop.take() {
            self.stop();
            return Ok(None);
        }

        let now = self.time.now();
        let slot = self.interp.slot();
        let mut elapsed = now.saturating_sub(slot_start);
        while elapsed >= slot {
            elapsed -= slot;
            slot_start += slot;
            self.state.current_index = self.dataset.next_index(self.state.current_index);
            self.stats.slot_advances += 1;
            if self.state.current_index == 0 {
                self.stats.loops += 1;
                tracing::debug!(loops = self.stats.loops, "dataset loop complete");
            }
        }
        self.state.elapsed_in_slot = elapsed;
        self.phase = Phase::Running { start, slot_start };

        let interpolated = self.interp.interpolate(&self.dataset, &self.state)?;
        let scene = self.mapper.map_to_scene(&interpolated, &self.rotation);
        self.rotation.advance();

        let frame = FrameIndex(self.stats.ticks);
        let ctx = RenderCtx {
            frame,
            elapsed: now.saturating_sub(start),
            from_year: interpolated.from_year,
            to_year: interpolated.to_year,
            progress: interpolated.progress,
        };
        let render_error = match surface.render(&ctx, &scene) {
            Ok(()) => None,
            Err(e) => {
                self.stats.render_failures += 1;
                tracing::warn!(frame = frame.0, error = %e, "render failed; continuing");
                Some(e)
            }
        };
        self.stats.ticks += 1;

        Ok(Some(TickReport {
            frame,
            state: self.state,
            interpolated,
            scene,
            render_error,
        }))
    }

    /// Run the cooperative tick loop until stopped or `limit` is reached.
    ///
    /// The next tick is scheduled only after the previous render has returned. When a render
    /// overruns the cadence the schedule slips rather than bursting to catch up.
    #[tracing::instrument(skip(self, surface), fields(years = self.dataset.len()))]
    pub fn run(&mut self, surface: &mut dyn RenderSurface, limit: RunLimit) -> SolarResult<ClockStats> {
        self.start();
        let start = match self.phase {
            Phase::Running { start, .. } => start,
            Phase::Idle => self.time.now(),
        };
        surface.begin(&SurfaceInfo {
            fps: self.opts.fps,
            canvas: self.opts.canvas,
        })?;

        let interval = self.opts.fps.frame_duration();
        let mut deadline = start;
        let mut ticks = 0u64;
        let result = loop {
            if limit.max_ticks.is_some_and(|max| ticks >= max) {
                break Ok(());
            }
            if limit
                .max_elapsed
                .is_some_and(|max| deadline.saturating_sub(start) >= max)
            {
                break Ok(());
            }
            if self.stop.take() {
                tracing::debug!(ticks, "stop requested");
                break Ok(());
            }

            self.time.sleep_until(deadline);
            match self.tick(surface) {
                Ok(Some(_)) => ticks += 1,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }

            deadline += interval;
            let now = self.time.now();
            if deadline < now {
                deadline = now;
            }
        };

        self.stop();
        let finished = surface.finish();
        result?;
        finished?;
        tracing::info!(
            ticks = self.stats.ticks,
            loops = self.stats.loops,
            render_failures = self.stats.render_failures,
            "animation run finished"
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/clock.rs"]
mod tests;
