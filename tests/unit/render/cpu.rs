use std::time::Duration;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Fps, FrameIndex};
use crate::scene::mapper::WaveShape;

fn canvas() -> Canvas {
    Canvas {
        width: 400,
        height: 400,
    }
}

fn scene(displacement: f64) -> SceneParameters {
    SceneParameters {
        value: 1.0,
        normalized: 0.5,
        cluster: ClusterShape {
            displacement,
            spread_x: 20.0,
            spread_y: 15.0,
            point_count: 60,
        },
        wave: WaveShape {
            amplitude: 8.0,
            layers: 3,
            samples: 96,
            rotation_deg: 12.0,
        },
    }
}

fn ctx(frame: u64) -> RenderCtx {
    RenderCtx {
        frame: FrameIndex(frame),
        elapsed: Duration::from_millis(frame * 33),
        from_year: 2000,
        to_year: 2001,
        progress: 0.25,
    }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn frame_matches_canvas_and_has_white_background() {
    let mut surface = CpuSurface::new(canvas(), 11, InMemorySink::new());
    let frame = surface.render_frame(&ctx(0), &scene(1.9)).unwrap();
    assert_eq!((frame.width, frame.height), (400, 400));
    assert_eq!(frame.data.len(), 400 * 400 * 4);
    assert!(frame.premultiplied);
    assert_eq!(pixel(&frame, 0, 0), [255, 255, 255, 255]);
    assert_eq!(pixel(&frame, 399, 0), [255, 255, 255, 255]);
}

#[test]
fn same_seed_and_scene_rasterize_identically() {
    let mut a = CpuSurface::new(canvas(), 11, InMemorySink::new());
    let mut b = CpuSurface::new(canvas(), 11, InMemorySink::new());
    let fa = a.render_frame(&ctx(3), &scene(1.9)).unwrap();
    let fb = b.render_frame(&ctx(3), &scene(1.9)).unwrap();
    assert_eq!(fa.data, fb.data);

    let again = a.render_frame(&ctx(3), &scene(1.9)).unwrap();
    assert_eq!(fa.data, again.data);
}

#[test]
fn displacement_changes_pixels() {
    let mut surface = CpuSurface::new(canvas(), 11, InMemorySink::new());
    let low = surface.render_frame(&ctx(0), &scene(0.8)).unwrap();
    let high = surface.render_frame(&ctx(0), &scene(3.0)).unwrap();
    assert_ne!(low.data, high.data);
}

#[test]
fn scene_is_drawn_over_background() {
    let mut surface = CpuSurface::new(canvas(), 11, InMemorySink::new());
    let frame = surface.render_frame(&ctx(0), &scene(1.9)).unwrap();
    let non_white = frame
        .data
        .chunks_exact(4)
        .filter(|px| px[..] != [255u8; 4])
        .count();
    assert!(non_white > 100);
}

#[test]
fn surface_forwards_frames_to_sink() {
    let mut surface = CpuSurface::new(canvas(), 5, InMemorySink::new());
    surface
        .begin(&SurfaceInfo {
            fps: Fps::new(30, 1).unwrap(),
            canvas: canvas(),
        })
        .unwrap();
    surface.render(&ctx(0), &scene(1.0)).unwrap();
    surface.render(&ctx(1), &scene(1.1)).unwrap();
    surface.finish().unwrap();

    let sink = surface.into_sink();
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (400, 400));
    assert_eq!(cfg.background, [255, 255, 255, 255]);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
}

#[test]
fn oversized_canvas_is_rejected() {
    let mut surface = CpuSurface::new(
        Canvas {
            width: 70_000,
            height: 10,
        },
        1,
        InMemorySink::new(),
    );
    let err = surface.render_frame(&ctx(0), &scene(1.0)).unwrap_err();
    assert!(matches!(err, SolarError::Config(_)));
}
