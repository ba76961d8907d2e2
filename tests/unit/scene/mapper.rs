use super::*;

fn dataset() -> Dataset {
    Dataset::from_pairs(&[(1978, 100.0), (1979, 150.0), (1980, 200.0)]).unwrap()
}

fn frame(value: f64) -> InterpolatedFrame {
    InterpolatedFrame {
        value,
        progress: 0.0,
        from_year: 1978,
        to_year: 1979,
    }
}

fn mapper(normalization: Normalization) -> SceneMapper {
    SceneMapper::new(
        normalization,
        &dataset(),
        ClusterConfig::default(),
        ContourConfig::default(),
    )
}

#[test]
fn auto_normalization_uses_dataset_range() {
    let m = mapper(Normalization::Auto);
    assert_eq!(m.range(), (100.0, 200.0));
    assert_eq!(m.normalize(100.0), 0.0);
    assert_eq!(m.normalize(150.0), 0.5);
    assert_eq!(m.normalize(200.0), 1.0);
}

#[test]
fn fixed_normalization_clamps_outside_values() {
    let m = mapper(Normalization::Fixed {
        min: 120.0,
        max: 140.0,
    });
    assert_eq!(m.normalize(100.0), 0.0);
    assert_eq!(m.normalize(130.0), 0.5);
    assert_eq!(m.normalize(500.0), 1.0);
}

#[test]
fn degenerate_range_maps_to_midpoint() {
    let m = mapper(Normalization::Fixed { min: 5.0, max: 5.0 });
    assert_eq!(m.normalize(5.0), 0.5);
    assert_eq!(m.normalize(-100.0), 0.5);
}

#[test]
fn displacement_and_amplitude_follow_value() {
    let m = mapper(Normalization::Auto);
    let rot = RotationAccumulator::new(1.0).unwrap();
    let lo = m.map_to_scene(&frame(100.0), &rot);
    let hi = m.map_to_scene(&frame(200.0), &rot);
    assert!((lo.cluster.displacement - DISPLACEMENT_MIN).abs() < 1e-12);
    assert!((hi.cluster.displacement - (DISPLACEMENT_MIN + DISPLACEMENT_GAIN)).abs() < 1e-12);
    assert_eq!(lo.wave.amplitude, 4.0);
    assert_eq!(hi.wave.amplitude, 12.0);
    assert_eq!(hi.cluster.point_count, 480);
    assert_eq!(hi.wave.layers, 22);
}

#[test]
fn mapping_is_monotonic_and_continuous() {
    let m = mapper(Normalization::Auto);
    let rot = RotationAccumulator::new(1.0).unwrap();
    let mut prev = m.map_to_scene(&frame(100.0), &rot);
    for i in 1..=1000 {
        let v = 100.0 + f64::from(i) * 0.1;
        let cur = m.map_to_scene(&frame(v), &rot);
        assert!(cur.cluster.displacement >= prev.cluster.displacement);
        assert!(cur.wave.amplitude >= prev.wave.amplitude);
        assert!(cur.cluster.displacement - prev.cluster.displacement < 0.01);
        prev = cur;
    }
}

#[test]
fn equal_values_give_identical_scenes() {
    let m = mapper(Normalization::Auto);
    let rot = RotationAccumulator::new(3.0).unwrap();
    assert_eq!(
        m.map_to_scene(&frame(137.25), &rot),
        m.map_to_scene(&frame(137.25), &rot)
    );
}

#[test]
fn rotation_comes_from_accumulator_only() {
    let m = mapper(Normalization::Auto);
    let mut rot = RotationAccumulator::new(10.0).unwrap();
    rot.advance();
    rot.advance();
    let a = m.map_to_scene(&frame(100.0), &rot);
    let b = m.map_to_scene(&frame(200.0), &rot);
    assert_eq!(a.wave.rotation_deg, 20.0);
    assert_eq!(b.wave.rotation_deg, 20.0);
}
