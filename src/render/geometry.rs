use std::f64::consts::TAU;

use crate::foundation::math::Rng64;

/// Peak height of a dot at the cluster center, before displacement.
const PEAK_HEIGHT: f64 = 160.0;
/// Standard deviation of the per-dot height noise.
const HEIGHT_NOISE: f64 = 24.0;
/// Envelope radius used for angular bins that received no dots.
const EMPTY_BIN_RADIUS: f64 = 80.0;
/// Circular smoothing radius (in bins) for envelope radius and height.
const SMOOTH_RADIUS: usize = 3;

/// One dot of the cluster, relative to the cluster center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ClusterPoint {
    pub(crate) x: f64,
    pub(crate) y: f64,
    /// Undisplaced height; the frame's displacement multiplies it.
    pub(crate) z_base: f64,
    pub(crate) phase: f64,
}

/// Seeded Gaussian point cloud. Positions never change between frames.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PointCloud {
    pub(crate) points: Vec<ClusterPoint>,
}

impl PointCloud {
    pub(crate) fn generate(seed: u64, count: u32, spread_x: f64, spread_y: f64) -> Self {
        let mut rng = Rng64::new(seed);
        let points = (0..count)
            .map(|_| {
                let x = (rng.next_gaussian() * spread_x).round();
                let y = (rng.next_gaussian() * spread_y).round();
                let dist = x.hypot(y);
                let z_base = (PEAK_HEIGHT - dist + rng.next_gaussian() * HEIGHT_NOISE)
                    .trunc()
                    .max(0.0);
                let phase = rng.next_f64_01() * TAU;
                ClusterPoint {
                    x,
                    y,
                    z_base,
                    phase,
                }
            })
            .collect();
        Self { points }
    }
}

/// Angular envelope of a point cloud, sampled at `samples` evenly spaced angles.
///
/// Heights are stored undisplaced so one envelope serves every frame of a run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Envelope {
    pub(crate) radius: Vec<f64>,
    pub(crate) z_base: Vec<f64>,
    pub(crate) density: Vec<f64>,
}

impl Envelope {
    pub(crate) fn from_cloud(cloud: &PointCloud, samples: usize) -> Self {
        let samples = samples.max(1);
        let mut sum_r = vec![0.0; samples];
        let mut sum_z = vec![0.0; samples];
        let mut count = vec![0u32; samples];

        for p in &cloud.points {
            let theta = p.y.atan2(p.x).rem_euclid(TAU);
            let bin = ((theta / TAU) * samples as f64) as usize % samples;
            sum_r[bin] += p.x.hypot(p.y);
            sum_z[bin] += p.z_base;
            count[bin] += 1;
        }

        let mut radius = vec![EMPTY_BIN_RADIUS; samples];
        let mut z_base = vec![0.0; samples];
        for i in 0..samples {
            if count[i] > 0 {
                radius[i] = sum_r[i] / f64::from(count[i]);
                z_base[i] = sum_z[i] / f64::from(count[i]);
            }
        }

        let max_count = count.iter().copied().max().unwrap_or(0).max(1);
        let density = count
            .iter()
            .map(|&n| f64::from(n) / f64::from(max_count))
            .collect();

        Self {
            radius: smooth_circular(&radius, SMOOTH_RADIUS),
            z_base: smooth_circular(&z_base, SMOOTH_RADIUS),
            density,
        }
    }

    pub(crate) fn samples(&self) -> usize {
        self.radius.len()
    }
}

/// Box filter over a ring buffer.
fn smooth_circular(values: &[f64], radius: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let window = 2 * radius + 1;
    (0..n)
        .map(|i| {
            let sum: f64 = (0..window)
                .map(|k| values[(i + n * window + k - radius) % n])
                .sum();
            sum / window as f64
        })
        .collect()
}

/// Per-ring styling derived from the layer index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RingStyle {
    pub(crate) alpha: u8,
    pub(crate) scale: f64,
    pub(crate) gap: f64,
    pub(crate) wiggle: f64,
    pub(crate) lift: f64,
}

impl RingStyle {
    /// Inner layers are opaque and tight; outer layers fade and spread.
    pub(crate) fn for_layer(layer: u32, layers: u32) -> Self {
        let layers_f = f64::from(layers.max(1));
        let layer_f = f64::from(layer);
        let alpha = (30.0 + ((layers_f - layer_f) * (160.0 / layers_f)).trunc()).clamp(10.0, 255.0);
        Self {
            alpha: alpha as u8,
            scale: 1.0 + layer_f * 0.03,
            gap: 6.0 + layer_f * 1.2,
            wiggle: 0.8 * layer_f,
            lift: layer_f * 1.6,
        }
    }
}

/// Vertical shimmer offset of a dot at `elapsed_secs`.
pub(crate) fn shimmer(elapsed_secs: f64, phase: f64, x: f64) -> f64 {
    ((elapsed_secs * 3.0 + phase + x * 0.02).sin() * 32.0).trunc()
}

/// Dot radius for a given shimmer offset.
pub(crate) fn dot_radius(dz: f64) -> f64 {
    (5.0 + dz / 20.0).trunc().clamp(3.0, 8.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
