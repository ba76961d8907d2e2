use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::interp::slot_duration_from_secs;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SolarError, SolarResult};
use crate::scene::mapper::Normalization;

/// Animation configuration document (JSON).
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Dwell time per year, in seconds.
    pub slot_secs: f64,
    /// Tick cadence.
    pub fps: Fps,
    /// Rotation added to the wave accumulator on every tick, in degrees.
    pub rotation_step_deg: f64,
    /// Fixed `[min, max]` for value normalization; `None` uses the dataset's observed range.
    pub normalization: Option<[f64; 2]>,
    /// Easing applied to slot progress.
    pub ease: Ease,
    /// Output canvas.
    pub canvas: Canvas,
    /// Dot cluster shape.
    pub cluster: ClusterConfig,
    /// Contour wave shape.
    pub contour: ContourConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            slot_secs: 2.0,
            fps: Fps::default(),
            rotation_step_deg: 1.2,
            normalization: None,
            ease: Ease::Linear,
            canvas: Canvas::default(),
            cluster: ClusterConfig::default(),
            contour: ContourConfig::default(),
        }
    }
}

/// Dot cluster parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    /// Number of dots.
    pub point_count: u32,
    /// Horizontal standard deviation of the cluster, in pixels.
    pub spread_x: f64,
    /// Vertical standard deviation of the cluster, in pixels.
    pub spread_y: f64,
    /// Seed for the cluster geometry.
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            point_count: 480,
            spread_x: 80.0,
            spread_y: 60.0,
            seed: 0x50_1A_12,
        }
    }
}

/// Contour wave parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContourConfig {
    /// Number of concentric rings.
    pub layers: u32,
    /// Angular samples per ring.
    pub samples: u32,
    /// Wiggle amplitude at the lowest normalized value, in pixels.
    pub amplitude_base: f64,
    /// Additional amplitude at the highest normalized value, in pixels.
    pub amplitude_gain: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            layers: 22,
            samples: 480,
            amplitude_base: 4.0,
            amplitude_gain: 8.0,
        }
    }
}

impl AnimationConfig {
    /// Parse a configuration from a JSON reader. The result is validated.
    pub fn from_reader<R: std::io::Read>(r: R) -> SolarResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SolarError::serde(format!("parse animation config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk. The result is validated.
    pub fn from_path(path: impl AsRef<Path>) -> SolarResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SolarError::config(format!("open animation config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field; all failures are [`SolarError::Config`].
    pub fn validate(&self) -> SolarResult<()> {
        slot_duration_from_secs(self.slot_secs)?;
        Fps::new(self.fps.num, self.fps.den)?;
        if !self.rotation_step_deg.is_finite()
            || self.rotation_step_deg <= 0.0
            || self.rotation_step_deg >= 360.0
        {
            return Err(SolarError::config(format!(
                "rotation_step_deg must be in (0, 360), got {}",
                self.rotation_step_deg
            )));
        }
        if let Some([min, max]) = self.normalization
            && (!min.is_finite() || !max.is_finite() || min >= max)
        {
            return Err(SolarError::config(format!(
                "normalization range must satisfy min < max, got [{min}, {max}]"
            )));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SolarError::config("canvas width/height must be non-zero"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(SolarError::config(format!(
                "canvas {}x{} exceeds the {} pixel limit",
                self.canvas.width,
                self.canvas.height,
                u16::MAX
            )));
        }
        if self.cluster.point_count == 0 {
            return Err(SolarError::config("cluster.point_count must be > 0"));
        }
        if !(self.cluster.spread_x.is_finite() && self.cluster.spread_x > 0.0)
            || !(self.cluster.spread_y.is_finite() && self.cluster.spread_y > 0.0)
        {
            return Err(SolarError::config("cluster spreads must be positive"));
        }
        if self.contour.layers == 0 || self.contour.samples < 3 {
            return Err(SolarError::config(
                "contour needs at least 1 layer and 3 samples",
            ));
        }
        if !self.contour.amplitude_base.is_finite()
            || !self.contour.amplitude_gain.is_finite()
            || self.contour.amplitude_gain < 0.0
        {
            return Err(SolarError::config(
                "contour amplitudes must be finite with a non-negative gain",
            ));
        }
        Ok(())
    }

    /// Slot duration as a [`Duration`].
    pub fn slot_duration(&self) -> SolarResult<Duration> {
        slot_duration_from_secs(self.slot_secs)
    }

    /// Interval between ticks.
    pub fn tick_interval(&self) -> SolarResult<Duration> {
        Ok(Fps::new(self.fps.num, self.fps.den)?.frame_duration())
    }

    /// Normalization policy for the scene mapper.
    pub fn normalization(&self) -> Normalization {
        match self.normalization {
            Some([min, max]) => Normalization::Fixed { min, max },
            None => Normalization::Auto,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
