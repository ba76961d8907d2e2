use super::*;

#[test]
fn every_advance_moves_forward_by_the_step() {
    let mut rot = RotationAccumulator::new(7.5).unwrap();
    for _ in 0..200 {
        let before = rot.degrees();
        rot.advance();
        let delta = forward_delta_deg(before, rot.degrees());
        assert!((delta - 7.5).abs() < 1e-9, "delta={delta}");
        assert!((0.0..360.0).contains(&rot.degrees()));
    }
    assert_eq!(rot.ticks(), 200);
    assert_eq!(rot.unwrapped_degrees(), 1500.0);
}

#[test]
fn angle_wraps_modulo_360() {
    let mut rot = RotationAccumulator::new(90.0).unwrap();
    for _ in 0..4 {
        rot.advance();
    }
    assert_eq!(rot.degrees(), 0.0);
    rot.advance();
    assert_eq!(rot.degrees(), 90.0);
    assert!((rot.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn invalid_steps_are_config_errors() {
    for step in [0.0, -1.0, 360.0, f64::NAN] {
        assert!(matches!(
            RotationAccumulator::new(step),
            Err(SolarError::Config(_))
        ));
    }
}
