use crate::foundation::error::{SolarError, SolarResult};
use crate::render::surface::{RenderCtx, RenderSurface, SurfaceInfo};
use crate::scene::mapper::SceneParameters;

/// Surface that reports scenes through `tracing` instead of drawing them.
///
/// Logs every `every`-th tick at info level; used by live runs without a display.
#[derive(Debug)]
pub struct TraceSurface {
    every: u64,
    rendered: u64,
    last: Option<SceneParameters>,
}

impl TraceSurface {
    /// Log once every `every` ticks.
    pub fn new(every: u64) -> SolarResult<Self> {
        if every == 0 {
            return Err(SolarError::config("trace interval must be at least 1"));
        }
        Ok(Self {
            every,
            rendered: 0,
            last: None,
        })
    }

    /// Scenes received so far.
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Most recent scene.
    pub fn last(&self) -> Option<&SceneParameters> {
        self.last.as_ref()
    }
}

impl RenderSurface for TraceSurface {
    fn begin(&mut self, info: &SurfaceInfo) -> SolarResult<()> {
        self.rendered = 0;
        self.last = None;
        tracing::info!(
            fps = info.fps.as_f64(),
            width = info.canvas.width,
            height = info.canvas.height,
            "trace surface ready"
        );
        Ok(())
    }

    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()> {
        if ctx.frame.0.is_multiple_of(self.every) {
            tracing::info!(
                frame = ctx.frame.0,
                from = ctx.from_year,
                to = ctx.to_year,
                progress = ctx.progress,
                value = scene.value,
                displacement = scene.cluster.displacement,
                amplitude = scene.wave.amplitude,
                rotation = scene.wave.rotation_deg,
                "tick"
            );
        }
        self.rendered += 1;
        self.last = Some(*scene);
        Ok(())
    }

    fn finish(&mut self) -> SolarResult<()> {
        tracing::info!(rendered = self.rendered, "trace surface finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/trace.rs"]
mod tests;
