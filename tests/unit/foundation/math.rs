use super::*;

#[test]
fn rng_is_deterministic_per_seed() {
    let mut a = Rng64::new(7);
    let mut b = Rng64::new(7);
    for _ in 0..16 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
    let mut c = Rng64::new(8);
    assert_ne!(Rng64::new(7).next_u64(), c.next_u64());
}

#[test]
fn unit_interval_samples_stay_in_range() {
    let mut rng = Rng64::new(42);
    for _ in 0..1000 {
        let v = rng.next_f64_01();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn gaussian_samples_are_roughly_standard() {
    let mut rng = Rng64::new(1978);
    let n = 20_000;
    let samples: Vec<f64> = (0..n).map(|_| rng.next_gaussian()).collect();
    assert!(samples.iter().all(|v| v.is_finite()));
    let mean = samples.iter().sum::<f64>() / n as f64;
    let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    assert!(mean.abs() < 0.05, "mean={mean}");
    assert!((var - 1.0).abs() < 0.1, "var={var}");
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = [64u8, 32, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[10, 20, 30, 255]);
    assert_eq!(&px[8..], &[0, 0, 0, 0]);
    assert_eq!(mul_div255_u16(255, 128), 128);
}
