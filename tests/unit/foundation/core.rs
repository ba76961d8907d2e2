use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn secs_to_frames_rounds_down_and_saturates() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_floor(1.5), 45);
    assert_eq!(fps.secs_to_frames_floor(0.99), 29);
    assert_eq!(fps.secs_to_frames_floor(-2.0), 0);
    assert_eq!(fps.secs_to_frames_floor(1e30), u64::MAX);
}

#[test]
fn fps_frame_duration_matches_rate() {
    let fps = Fps::new(2, 1).unwrap();
    assert_eq!(fps.frame_duration(), Duration::from_millis(500));
}
