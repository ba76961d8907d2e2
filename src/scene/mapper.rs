use crate::animation::interp::InterpolatedFrame;
use crate::config::{AnimationConfig, ClusterConfig, ContourConfig};
use crate::data::dataset::Dataset;
use crate::scene::rotation::RotationAccumulator;

/// Lowest cluster displacement multiplier (normalized value 0).
pub const DISPLACEMENT_MIN: f64 = 0.8;
/// Displacement added at normalized value 1.
pub const DISPLACEMENT_GAIN: f64 = 2.2;

/// How raw values are normalized into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalization {
    /// Use the dataset's observed min/max.
    Auto,
    /// Use a fixed range.
    Fixed {
        /// Value mapped to 0.
        min: f64,
        /// Value mapped to 1.
        max: f64,
    },
}

/// Shape of the dot cluster for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ClusterShape {
    /// Height multiplier applied to every dot.
    pub displacement: f64,
    /// Horizontal spread in pixels.
    pub spread_x: f64,
    /// Vertical spread in pixels.
    pub spread_y: f64,
    /// Number of dots.
    pub point_count: u32,
}

/// Shape of the contour waves for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct WaveShape {
    /// Wiggle amplitude in pixels.
    pub amplitude: f64,
    /// Number of rings.
    pub layers: u32,
    /// Angular samples per ring.
    pub samples: u32,
    /// Ring rotation in degrees, `[0, 360)`.
    pub rotation_deg: f64,
}

/// Visual description of one frame, independent of any rendering technology.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SceneParameters {
    /// Interpolated raw value.
    pub value: f64,
    /// Value normalized into `[0, 1]`.
    pub normalized: f64,
    /// Dot cluster.
    pub cluster: ClusterShape,
    /// Contour waves.
    pub wave: WaveShape,
}

/// Pure mapping from interpolated values to [`SceneParameters`].
///
/// Every output is a linear (hence monotonic and continuous) function of the value, so two
/// frames with equal values map to identical scenes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneMapper {
    min: f64,
    max: f64,
    cluster: ClusterConfig,
    contour: ContourConfig,
}

impl SceneMapper {
    /// Build a mapper, resolving [`Normalization::Auto`] against `dataset`.
    pub fn new(
        normalization: Normalization,
        dataset: &Dataset,
        cluster: ClusterConfig,
        contour: ContourConfig,
    ) -> Self {
        let (min, max) = match normalization {
            Normalization::Auto => dataset.value_range(),
            Normalization::Fixed { min, max } => (min, max),
        };
        Self {
            min,
            max,
            cluster,
            contour,
        }
    }

    /// Build a mapper from a full configuration.
    pub fn from_config(cfg: &AnimationConfig, dataset: &Dataset) -> Self {
        Self::new(
            cfg.normalization(),
            dataset,
            cfg.cluster.clone(),
            cfg.contour.clone(),
        )
    }

    /// Resolved normalization range.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Normalize `value` into `[0, 1]`; a degenerate range maps everything to `0.5`.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Map one frame to scene parameters.
    pub fn map_to_scene(
        &self,
        frame: &InterpolatedFrame,
        rotation: &RotationAccumulator,
    ) -> SceneParameters {
        let normalized = self.normalize(frame.value);
        SceneParameters {
            value: frame.value,
            normalized,
            cluster: ClusterShape {
                displacement: DISPLACEMENT_MIN + normalized * DISPLACEMENT_GAIN,
                spread_x: self.cluster.spread_x,
                spread_y: self.cluster.spread_y,
                point_count: self.cluster.point_count,
            },
            wave: WaveShape {
                amplitude: self.contour.amplitude_base + normalized * self.contour.amplitude_gain,
                layers: self.contour.layers,
                samples: self.contour.samples,
                rotation_deg: rotation.degrees(),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mapper.rs"]
mod tests;
