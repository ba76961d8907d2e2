use super::*;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        background: [10, 20, 30, 255],
    }
}

#[test]
fn transparent_pixels_take_the_background() {
    let mut px = vec![0u8, 0, 0, 0];
    flatten_over(&mut px, [10, 20, 30, 255], true);
    assert_eq!(px, vec![10, 20, 30, 255]);
}

#[test]
fn opaque_pixels_are_untouched() {
    let mut px = vec![1u8, 2, 3, 255];
    flatten_over(&mut px, [10, 20, 30, 255], true);
    assert_eq!(px, vec![1, 2, 3, 255]);
}

#[test]
fn straight_alpha_is_premultiplied_before_blending() {
    let mut straight = vec![255u8, 0, 0, 128];
    flatten_over(&mut straight, [0, 0, 255, 255], false);
    let mut premul = vec![128u8, 0, 0, 128];
    flatten_over(&mut premul, [0, 0, 255, 255], true);
    assert_eq!(straight, premul);
    assert_eq!(premul, vec![128, 0, 127, 255]);
}

#[test]
fn command_describes_raw_input_and_output() {
    let opts = FfmpegSinkOpts::new("target/ffmpeg_unit/out.mp4");
    let cmd = encoder_command(&opts, cfg(64, 48));
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(args.first().map(String::as_str), Some("-y"));
    assert!(args.windows(2).any(|w| w == ["-s", "64x48"]));
    assert!(args.windows(2).any(|w| w == ["-r", "30/1"]));
    assert!(args.windows(2).any(|w| w == ["-i", "pipe:0"]));
    assert_eq!(
        args.last().map(String::as_str),
        Some("target/ffmpeg_unit/out.mp4")
    );
}

#[test]
fn odd_canvas_is_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit/odd.mp4"));
    let err = sink.begin(cfg(63, 64)).unwrap_err();
    assert!(matches!(err, SolarError::Config(_)));
    assert_eq!(sink.frames_written(), 0);
}

#[test]
fn push_before_begin_is_a_render_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit/none.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert!(err.is_transient());
    assert!(sink.end().is_err());
}
