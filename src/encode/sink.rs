use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SolarError, SolarResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Opaque background the surface paints under every frame (straight RGBA8).
    ///
    /// Sinks that cannot carry alpha flatten frames over this color.
    pub background: [u8; 4],
}

/// Enforces strictly increasing frame indices for one sink.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FrameOrder {
    last: Option<FrameIndex>,
}

impl FrameOrder {
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    pub(crate) fn accept(&mut self, idx: FrameIndex, sink: &str) -> SolarResult<()> {
        if self.last.is_some_and(|last| idx <= last) {
            return Err(SolarError::render(format!(
                "{sink} received frame {} after frame {}",
                idx.0,
                self.last.map_or(0, |l| l.0)
            )));
        }
        self.last = Some(idx);
        Ok(())
    }
}

/// Sink contract for consuming rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SolarResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SolarResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> SolarResult<()>;
}

/// In-memory sink for tests and single-frame rendering.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Take ownership of the captured frames.
    pub fn into_frames(self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SolarResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SolarResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SolarResult<()> {
        Ok(())
    }
}

/// Writes every frame as `frame_NNNNNN.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    scratch: Vec<u8>,
    written: u64,
    order: FrameOrder,
}

impl PngSequenceSink {
    /// Create a sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scratch: Vec::new(),
            written: 0,
            order: FrameOrder::default(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the PNG for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> SolarResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SolarError::render(format!(
                "create frame directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written = 0;
        self.order.reset();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SolarResult<()> {
        self.order.accept(idx, "png sink")?;
        write_png(&self.frame_path(idx), frame, &mut self.scratch)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> SolarResult<()> {
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "png sequence complete");
        Ok(())
    }
}

/// Create the directory that will hold `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> SolarResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                SolarError::render(format!(
                    "create output directory '{}': {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

/// Encode one frame as a straight-alpha PNG at `path`, creating its directory.
pub fn write_png(path: &Path, frame: &FrameRGBA, scratch: &mut Vec<u8>) -> SolarResult<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(SolarError::render(format!(
            "frame data is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    ensure_parent_dir(path)?;
    scratch.clear();
    scratch.extend_from_slice(&frame.data);
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(scratch);
    }
    image::save_buffer_with_format(
        path,
        scratch.as_slice(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| SolarError::render(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
