use super::*;
use crate::clock::time::ManualTime;
use crate::config::{ClusterConfig, ContourConfig};
use crate::scene::mapper::Normalization;
use crate::scene::rotation::forward_delta_deg;

#[derive(Default)]
struct Recorder {
    began: Option<SurfaceInfo>,
    finished: u32,
    frames: Vec<(RenderCtx, SceneParameters)>,
    fail_every: Option<u64>,
    stop_at: Option<(u64, StopHandle)>,
}

impl RenderSurface for Recorder {
    fn begin(&mut self, info: &SurfaceInfo) -> SolarResult<()> {
        self.began = Some(*info);
        Ok(())
    }

    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()> {
        self.frames.push((*ctx, *scene));
        if let Some((at, handle)) = &self.stop_at
            && ctx.frame.0 == *at
        {
            handle.stop();
        }
        match self.fail_every {
            Some(n) if ctx.frame.0 % n == 0 => Err(SolarError::render("surface lost")),
            _ => Ok(()),
        }
    }

    fn finish(&mut self) -> SolarResult<()> {
        self.finished += 1;
        Ok(())
    }
}

fn opts(slot_ms: u64, fps: u32) -> ClockOpts {
    ClockOpts {
        slot: Duration::from_millis(slot_ms),
        fps: Fps::new(fps, 1).unwrap(),
        rotation_step_deg: 30.0,
        ease: Ease::Linear,
        canvas: Canvas {
            width: 64,
            height: 48,
        },
    }
}

fn clock(pairs: &[(i32, f64)], slot_ms: u64, fps: u32) -> AnimationClock<ManualTime> {
    let ds = Dataset::from_pairs(pairs).unwrap();
    let mapper = SceneMapper::new(
        Normalization::Auto,
        &ds,
        ClusterConfig::default(),
        ContourConfig::default(),
    );
    AnimationClock::new(ds, mapper, opts(slot_ms, fps), ManualTime::new()).unwrap()
}

fn tick_at(c: &mut AnimationClock<ManualTime>, s: &mut Recorder, ms: u64) -> TickReport {
    c.time_mut().set(Duration::from_millis(ms));
    c.tick(s).unwrap().unwrap()
}

#[test]
fn two_year_example_blends_and_loops() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 1);
    let mut s = Recorder::default();
    assert!(c.start());

    let r = tick_at(&mut c, &mut s, 0);
    assert_eq!((r.state.current_index, r.interpolated.value), (0, 100.0));

    let r = tick_at(&mut c, &mut s, 1000);
    assert_eq!(r.interpolated.progress, 0.5);
    assert_eq!(r.interpolated.value, 125.0);

    let r = tick_at(&mut c, &mut s, 2000);
    assert_eq!(r.state.current_index, 1);
    assert_eq!(r.interpolated.value, 150.0);
    assert_eq!((r.interpolated.from_year, r.interpolated.to_year), (1979, 1978));

    let r = tick_at(&mut c, &mut s, 3000);
    assert_eq!(r.interpolated.value, 125.0);

    let r = tick_at(&mut c, &mut s, 4000);
    assert_eq!(r.state.current_index, 0);
    assert_eq!(r.interpolated.value, 100.0);
    assert_eq!(c.stats().loops, 1);
    assert_eq!(c.stats().slot_advances, 2);
}

#[test]
fn slot_remainder_is_carried_over() {
    let mut c = clock(&[(2000, 1.0), (2001, 2.0), (2002, 3.0)], 2000, 1);
    let mut s = Recorder::default();
    c.start();

    let r = tick_at(&mut c, &mut s, 2500);
    assert_eq!(r.state.current_index, 1);
    assert_eq!(r.state.elapsed_in_slot, Duration::from_millis(500));

    let r = tick_at(&mut c, &mut s, 4200);
    assert_eq!(r.state.current_index, 2);
    assert_eq!(r.state.elapsed_in_slot, Duration::from_millis(200));
}

#[test]
fn long_gap_advances_several_slots() {
    let mut c = clock(&[(2000, 1.0), (2001, 2.0), (2002, 3.0)], 2000, 1);
    let mut s = Recorder::default();
    c.start();

    let r = tick_at(&mut c, &mut s, 13_000);
    assert_eq!(r.state.current_index, 0);
    assert_eq!(r.state.elapsed_in_slot, Duration::from_secs(1));
    assert_eq!(c.stats().slot_advances, 6);
    assert_eq!(c.stats().loops, 2);
}

#[test]
fn n_advances_return_to_first_index() {
    let pairs = [(1990, 1.0), (1991, 4.0), (1992, 2.0), (1993, 8.0), (1994, 5.0)];
    let mut c = clock(&pairs, 1000, 1);
    let mut s = Recorder::default();
    c.start();
    let mut seen = Vec::new();
    for k in 0..=pairs.len() as u64 {
        seen.push(tick_at(&mut c, &mut s, k * 1000).state.current_index);
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4, 0]);
}

#[test]
fn idle_clock_does_not_tick() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 1);
    let mut s = Recorder::default();
    assert_eq!(c.clock_state(), ClockState::Idle);
    assert!(c.tick(&mut s).unwrap().is_none());
    assert!(s.frames.is_empty());
}

#[test]
fn start_and_stop_are_idempotent() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 1);
    let mut s = Recorder::default();
    assert!(c.start());
    assert!(!c.start());
    assert_eq!(c.clock_state(), ClockState::Running);
    assert!(c.stop());
    assert!(!c.stop());
    assert_eq!(c.clock_state(), ClockState::Idle);
    assert!(c.tick(&mut s).unwrap().is_none());
}

#[test]
fn stop_handle_is_honored_before_next_tick() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 1);
    let mut s = Recorder::default();
    c.start();
    tick_at(&mut c, &mut s, 0);
    let h = c.stop_handle();
    h.stop();
    h.stop();
    assert!(c.tick(&mut s).unwrap().is_none());
    assert_eq!(c.clock_state(), ClockState::Idle);
    assert_eq!(s.frames.len(), 1);
}

#[test]
fn run_ticks_at_fixed_cadence() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 4);
    let mut s = Recorder::default();
    let stats = c.run(&mut s, RunLimit::elapsed(Duration::from_secs(2))).unwrap();

    assert_eq!(stats.ticks, 8);
    let elapsed: Vec<Duration> = s.frames.iter().map(|(ctx, _)| ctx.elapsed).collect();
    let expected: Vec<Duration> = (0..8).map(|i| Duration::from_millis(i * 250)).collect();
    assert_eq!(elapsed, expected);
    let frames: Vec<u64> = s.frames.iter().map(|(ctx, _)| ctx.frame.0).collect();
    assert_eq!(frames, (0..8).collect::<Vec<_>>());

    let info = s.began.unwrap();
    assert_eq!(info.fps, Fps::new(4, 1).unwrap());
    assert_eq!(info.canvas.width, 64);
    assert_eq!(s.finished, 1);
    assert_eq!(c.clock_state(), ClockState::Idle);
}

#[test]
fn rotation_is_monotonic_across_dataset_wraparound() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 500, 10);
    let mut s = Recorder::default();
    let stats = c.run(&mut s, RunLimit::ticks(60)).unwrap();
    assert!(stats.loops >= 2);

    let angles: Vec<f64> = s.frames.iter().map(|(_, sc)| sc.wave.rotation_deg).collect();
    assert_eq!(angles[0], 0.0);
    for w in angles.windows(2) {
        let d = forward_delta_deg(w[0], w[1]);
        assert!((d - 30.0).abs() < 1e-9, "jump of {d} degrees");
    }
}

#[test]
fn render_failures_are_counted_and_ticking_continues() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 30);
    let mut s = Recorder {
        fail_every: Some(3),
        ..Recorder::default()
    };
    let stats = c.run(&mut s, RunLimit::ticks(10)).unwrap();
    assert_eq!(stats.ticks, 10);
    assert_eq!(stats.render_failures, 4);
    assert_eq!(s.frames.len(), 10);
}

#[test]
fn failed_tick_reports_its_render_error() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 30);
    let mut s = Recorder {
        fail_every: Some(1),
        ..Recorder::default()
    };
    c.start();
    let r = tick_at(&mut c, &mut s, 0);
    assert!(matches!(r.render_error, Some(SolarError::Render(_))));
    let r = tick_at(&mut c, &mut s, 10);
    assert!(r.render_error.is_some());
    assert_eq!(c.stats().ticks, 2);
}

#[test]
fn stop_requested_during_render_ends_run() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 30);
    let mut s = Recorder {
        stop_at: Some((4, c.stop_handle())),
        ..Recorder::default()
    };
    let stats = c.run(&mut s, RunLimit::default()).unwrap();
    assert_eq!(stats.ticks, 5);
    assert_eq!(s.frames.len(), 5);
    assert_eq!(s.finished, 1);
    assert_eq!(c.clock_state(), ClockState::Idle);
}

#[test]
fn stop_requested_before_run_is_honored() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 30);
    let mut s = Recorder::default();
    let h = c.stop_handle();
    h.stop();

    let stats = c.run(&mut s, RunLimit::ticks(50)).unwrap();
    assert_eq!(stats.ticks, 0);
    assert!(s.frames.is_empty());
    assert_eq!(s.finished, 1);
    assert!(!h.is_stop_requested());

    let stats = c.run(&mut s, RunLimit::ticks(3)).unwrap();
    assert_eq!(stats.ticks, 3);
}

#[test]
fn stop_requested_before_start_ends_first_tick() {
    let mut c = clock(&[(1978, 100.0), (1979, 150.0)], 2000, 1);
    let mut s = Recorder::default();
    c.stop_handle().stop();
    assert!(c.start());
    assert!(c.tick(&mut s).unwrap().is_none());
    assert_eq!(c.clock_state(), ClockState::Idle);

    assert!(c.start());
    assert!(c.tick(&mut s).unwrap().is_some());
}

#[test]
fn zero_slot_is_rejected_at_construction() {
    let ds = Dataset::from_pairs(&[(1978, 100.0), (1979, 150.0)]).unwrap();
    let mapper = SceneMapper::new(
        Normalization::Auto,
        &ds,
        ClusterConfig::default(),
        ContourConfig::default(),
    );
    let mut o = opts(0, 30);
    o.slot = Duration::ZERO;
    let err = AnimationClock::new(ds, mapper, o, ManualTime::new())
        .err()
        .unwrap();
    assert!(matches!(err, SolarError::Config(_)));
}

#[test]
fn from_config_uses_configured_timing() {
    let ds = Dataset::from_pairs(&[(1978, 100.0), (1979, 150.0)]).unwrap();
    let cfg = AnimationConfig {
        slot_secs: 0.5,
        fps: Fps::new(2, 1).unwrap(),
        ..AnimationConfig::default()
    };
    let mut c = AnimationClock::from_config(ds, &cfg, ManualTime::new()).unwrap();
    let mut s = Recorder::default();
    let stats = c.run(&mut s, RunLimit::ticks(4)).unwrap();
    assert_eq!(stats.slot_advances, 3);
    assert_eq!(c.opts().slot, Duration::from_millis(500));
}
