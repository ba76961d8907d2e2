use crate::foundation::error::{SolarError, SolarResult};

/// Wave rotation angle, advanced by a fixed step once per tick.
///
/// The angle is kept in `[0, 360)` and moves forward by exactly `step_deg` (mod 360) on every
/// advance. It never looks at the data index, so looping the dataset cannot make it jump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationAccumulator {
    degrees: f64,
    step_deg: f64,
    ticks: u64,
}

impl RotationAccumulator {
    /// Start at 0 degrees. `step_deg` must be in `(0, 360)`.
    pub fn new(step_deg: f64) -> SolarResult<Self> {
        if !step_deg.is_finite() || step_deg <= 0.0 || step_deg >= 360.0 {
            return Err(SolarError::config(format!(
                "rotation step must be in (0, 360) degrees, got {step_deg}"
            )));
        }
        Ok(Self {
            degrees: 0.0,
            step_deg,
            ticks: 0,
        })
    }

    /// Advance by one step.
    pub fn advance(&mut self) {
        self.degrees = (self.degrees + self.step_deg).rem_euclid(360.0);
        self.ticks += 1;
    }

    /// Current angle in `[0, 360)`.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Current angle in radians.
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Per-tick step.
    pub fn step_deg(&self) -> f64 {
        self.step_deg
    }

    /// Number of advances so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Total rotation since start, without wrapping.
    pub fn unwrapped_degrees(&self) -> f64 {
        self.ticks as f64 * self.step_deg
    }
}

/// Forward angular distance from `from` to `to`, in `[0, 360)`.
pub fn forward_delta_deg(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(360.0)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/rotation.rs"]
mod tests;
