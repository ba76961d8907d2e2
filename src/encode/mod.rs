//! Frame sinks.
//!
//! Sinks consume rendered frames in tick order and are driven by [`crate::CpuSurface`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
