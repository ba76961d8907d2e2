//! Render surfaces.
//!
//! A surface receives one [`SceneParameters`](crate::SceneParameters) per clock tick.

/// CPU raster surface powered by `vello_cpu`.
pub mod cpu;
mod geometry;
/// Surface contract and shared frame types.
pub mod surface;
/// Structured-log surface for live runs.
pub mod trace;
