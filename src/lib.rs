//! Solarwave turns a yearly time series into a looping, time-driven animation.
//!
//! The pipeline is deterministic end to end:
//!
//! - Load a [`Dataset`] (CSV, one value per year)
//! - Drive an [`AnimationClock`] that blends between consecutive years with an [`Interpolator`]
//! - Map every blended value to [`SceneParameters`] with a [`SceneMapper`]
//! - Present the scene on a [`RenderSurface`], e.g. a [`CpuSurface`] streaming into a
//!   [`FrameSink`]
//!
//! Offline renders use [`ManualTime`], so identical inputs always produce identical frames.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Animation clock and time sources.
pub mod clock;
mod config;
pub(crate) mod data;
/// Encoding sinks.
pub mod encode;
/// Rendering surfaces.
pub mod render;
pub(crate) mod scene;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{SolarError, SolarResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::interp::{
    AnimationState, InterpolatedFrame, Interpolator, Lerp, interpolate, slot_duration_from_secs,
};
pub use crate::config::{AnimationConfig, ClusterConfig, ContourConfig};
pub use crate::data::dataset::{Dataset, YearRecord};
pub use crate::data::loader::{Aggregate, LoadOpts, load_csv_path, load_csv_reader};
pub use crate::scene::mapper::{
    ClusterShape, DISPLACEMENT_GAIN, DISPLACEMENT_MIN, Normalization, SceneMapper,
    SceneParameters, WaveShape,
};
pub use crate::scene::rotation::{RotationAccumulator, forward_delta_deg};

pub use crate::clock::clock::{
    AnimationClock, ClockOpts, ClockState, ClockStats, RunLimit, StopHandle, TickReport,
};
pub use crate::clock::time::{ManualTime, MonotonicTime, TimeSource};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, PngSequenceSink, SinkConfig, ensure_parent_dir, write_png,
};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::surface::{FrameRGBA, RenderCtx, RenderSurface, SurfaceInfo};
pub use crate::render::trace::TraceSurface;
