use std::time::Duration;

use crate::animation::ease::Ease;
use crate::data::dataset::Dataset;
use crate::foundation::error::{SolarError, SolarResult};

/// Linear blend between two values of the same kind.
pub trait Lerp: Sized {
    /// Blend `a` toward `b` by `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        // Exact at both endpoints: t=0 yields a, t=1 yields b.
        a * (1.0 - t) + b * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        <f64 as Lerp>::lerp(&f64::from(*a), &f64::from(*b), t) as f32
    }
}

/// Position of the animation within the dataset.
///
/// Owned and mutated by the clock; everything else receives it read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    /// Index of the year being blended away from.
    pub current_index: usize,
    /// Time spent in the current slot.
    pub elapsed_in_slot: Duration,
}

impl AnimationState {
    /// State at the beginning of slot `current_index`.
    pub fn at(current_index: usize) -> Self {
        Self {
            current_index,
            elapsed_in_slot: Duration::ZERO,
        }
    }
}

/// Blended value for one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolatedFrame {
    /// Blended value.
    pub value: f64,
    /// Raw (un-eased) progress through the slot, in `[0, 1]`.
    pub progress: f64,
    /// Year at the start of the slot.
    pub from_year: i32,
    /// Year the slot blends toward (wraps to the first year).
    pub to_year: i32,
}

/// Slot-duration bound interpolator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolator {
    slot: Duration,
    ease: Ease,
}

impl Interpolator {
    /// Create an interpolator; a zero slot duration is a configuration error.
    pub fn new(slot: Duration, ease: Ease) -> SolarResult<Self> {
        if slot.is_zero() {
            return Err(SolarError::config("slot duration must be > 0"));
        }
        Ok(Self { slot, ease })
    }

    /// Slot duration.
    pub fn slot(&self) -> Duration {
        self.slot
    }

    /// Easing curve.
    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Compute the frame for `state`.
    pub fn interpolate(
        &self,
        dataset: &Dataset,
        state: &AnimationState,
    ) -> SolarResult<InterpolatedFrame> {
        let i = state.current_index;
        let from = dataset.get(i).ok_or_else(|| {
            SolarError::data(format!(
                "animation index {i} out of range for {} records",
                dataset.len()
            ))
        })?;
        let j = dataset.next_index(i);
        let to = &dataset.records()[j];

        let progress = (state.elapsed_in_slot.as_secs_f64() / self.slot.as_secs_f64()).clamp(0.0, 1.0);
        let value = f64::lerp(&from.value, &to.value, self.ease.apply(progress));
        Ok(InterpolatedFrame {
            value,
            progress,
            from_year: from.year,
            to_year: to.year,
        })
    }
}

/// Linear interpolation of `dataset` at `state` for a slot of length `slot`.
///
/// Fails with [`SolarError::Config`] when `slot` is zero.
pub fn interpolate(
    dataset: &Dataset,
    state: &AnimationState,
    slot: Duration,
) -> SolarResult<InterpolatedFrame> {
    Interpolator::new(slot, Ease::Linear)?.interpolate(dataset, state)
}

/// Convert a configured slot length in seconds into a [`Duration`].
///
/// Zero, negative and non-finite values are configuration errors.
pub fn slot_duration_from_secs(secs: f64) -> SolarResult<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SolarError::config(format!(
            "slot duration must be a positive number of seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| SolarError::config(format!("slot duration {secs}s: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
