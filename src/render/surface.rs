use std::time::Duration;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::SolarResult;
use crate::scene::mapper::SceneParameters;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by [`crate::CpuSurface`] are **premultiplied alpha**.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Static information handed to a surface before the first tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    /// Tick cadence.
    pub fps: Fps,
    /// Requested canvas.
    pub canvas: Canvas,
}

/// Per-tick context that accompanies the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCtx {
    /// Tick number since `start` (0-based).
    pub frame: FrameIndex,
    /// Time since `start`.
    pub elapsed: Duration,
    /// Year being blended away from.
    pub from_year: i32,
    /// Year being blended toward.
    pub to_year: i32,
    /// Raw slot progress.
    pub progress: f64,
}

/// Anything that can present a scene.
///
/// `render` failures are reported per tick; the clock keeps ticking after a failed frame.
pub trait RenderSurface {
    /// Called once before the first tick of a run.
    fn begin(&mut self, _info: &SurfaceInfo) -> SolarResult<()> {
        Ok(())
    }

    /// Present one scene.
    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()>;

    /// Called once after the last tick of a run.
    fn finish(&mut self) -> SolarResult<()> {
        Ok(())
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn begin(&mut self, info: &SurfaceInfo) -> SolarResult<()> {
        (**self).begin(info)
    }

    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()> {
        (**self).render(ctx, scene)
    }

    fn finish(&mut self) -> SolarResult<()> {
        (**self).finish()
    }
}
