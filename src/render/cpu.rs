use vello_cpu::kurbo::{Affine, BezPath, Circle, Rect, Shape as _, Stroke};
use vello_cpu::peniko::Color;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::Canvas;
use crate::foundation::error::{SolarError, SolarResult};
use crate::render::geometry::{Envelope, PointCloud, RingStyle, dot_radius, shimmer};
use crate::render::surface::{FrameRGBA, RenderCtx, RenderSurface, SurfaceInfo};
use crate::scene::mapper::{ClusterShape, SceneParameters};

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const CONNECTOR: [u8; 4] = [180, 230, 255, 255];
const CONNECTOR_WIDTH: f64 = 2.0;
const ACCENT: [u8; 3] = [255, 80, 160];
const RING_WIDTH: f64 = 1.0;
/// The cluster sits below the canvas center to leave headroom for the dots.
const CENTER_DROP: f64 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct GeometryKey {
    point_count: u32,
    spread_x: u64,
    spread_y: u64,
    samples: u32,
}

impl GeometryKey {
    fn new(cluster: &ClusterShape, samples: u32) -> Self {
        Self {
            point_count: cluster.point_count,
            spread_x: cluster.spread_x.to_bits(),
            spread_y: cluster.spread_y.to_bits(),
            samples,
        }
    }
}

struct Geometry {
    key: GeometryKey,
    cloud: PointCloud,
    envelope: Envelope,
}

/// Raster surface powered by `vello_cpu`, forwarding each frame to a [`FrameSink`].
///
/// The point cloud is generated once from `seed` and reused, so a given seed and scene always
/// rasterize to the same pixels.
pub struct CpuSurface<S: FrameSink> {
    canvas: Canvas,
    seed: u64,
    sink: S,
    geometry: Option<Geometry>,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl<S: FrameSink> CpuSurface<S> {
    /// Create a surface rendering `canvas`-sized frames into `sink`.
    pub fn new(canvas: Canvas, seed: u64, sink: S) -> Self {
        Self {
            canvas,
            seed,
            sink,
            geometry: None,
            ctx: None,
            pixmap: None,
        }
    }

    /// Borrow the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Recover the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Rasterize one scene without touching the sink.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx,
        scene: &SceneParameters,
    ) -> SolarResult<FrameRGBA> {
        let (w, h) = canvas_dims(self.canvas)?;
        self.ensure_geometry(scene);
        let Some(geometry) = self.geometry.as_ref() else {
            return Err(SolarError::render("scene geometry unavailable"));
        };

        let (mut rc, mut pixmap) = match (self.ctx.take(), self.pixmap.take()) {
            (Some(rc), Some(pm)) if rc.width() == w && rc.height() == h => (rc, pm),
            _ => (
                vello_cpu::RenderContext::new(w, h),
                vello_cpu::Pixmap::new(w, h),
            ),
        };
        rc.reset();

        let center_x = f64::from(w) / 2.0;
        let center_y = f64::from(h) / 2.0 + CENTER_DROP;

        rc.set_transform(Affine::IDENTITY);
        rc.set_paint(rgba(BACKGROUND));
        rc.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        rc.set_transform(Affine::translate((center_x, center_y)));
        draw_rings(&mut rc, geometry, scene);
        draw_cluster(&mut rc, geometry, scene, ctx.elapsed.as_secs_f64());

        rc.flush();
        rc.render_to_pixmap(&mut pixmap);

        let frame = FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        self.ctx = Some(rc);
        self.pixmap = Some(pixmap);
        Ok(frame)
    }

    fn ensure_geometry(&mut self, scene: &SceneParameters) {
        let key = GeometryKey::new(&scene.cluster, scene.wave.samples);
        if self.geometry.as_ref().is_some_and(|g| g.key == key) {
            return;
        }
        let cloud = PointCloud::generate(
            self.seed,
            key.point_count,
            scene.cluster.spread_x,
            scene.cluster.spread_y,
        );
        let envelope = Envelope::from_cloud(&cloud, scene.wave.samples as usize);
        tracing::debug!(
            points = cloud.points.len(),
            samples = envelope.samples(),
            "generated cluster geometry"
        );
        self.geometry = Some(Geometry {
            key,
            cloud,
            envelope,
        });
    }
}

impl<S: FrameSink> RenderSurface for CpuSurface<S> {
    fn begin(&mut self, info: &SurfaceInfo) -> SolarResult<()> {
        self.canvas = info.canvas;
        canvas_dims(self.canvas)?;
        self.sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: info.fps,
            background: BACKGROUND,
        })
    }

    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()> {
        let frame = self.render_frame(ctx, scene)?;
        self.sink.push_frame(ctx.frame, &frame)
    }

    fn finish(&mut self) -> SolarResult<()> {
        self.sink.end()
    }
}

fn canvas_dims(canvas: Canvas) -> SolarResult<(u16, u16)> {
    let w = u16::try_from(canvas.width).ok().filter(|w| *w > 0);
    let h = u16::try_from(canvas.height).ok().filter(|h| *h > 0);
    match (w, h) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(SolarError::config(format!(
            "canvas {}x{} must be non-zero and fit in u16",
            canvas.width, canvas.height
        ))),
    }
}

fn rgba(c: [u8; 4]) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}

fn draw_rings(rc: &mut vello_cpu::RenderContext, geometry: &Geometry, scene: &SceneParameters) {
    let env = &geometry.envelope;
    let samples = env.samples();
    if samples < 3 {
        return;
    }
    let rot = scene.wave.rotation_deg.to_radians();
    let displacement = scene.cluster.displacement;
    rc.set_stroke(Stroke::new(RING_WIDTH));

    for layer in 0..scene.wave.layers {
        let style = RingStyle::for_layer(layer, scene.wave.layers);
        let amplitude = scene.wave.amplitude + style.wiggle;
        // Integer lobe counts keep each ring closed at theta = 2pi.
        let lobes = f64::from(2 + layer % 3);

        let mut path = BezPath::new();
        for i in 0..samples {
            let theta = (i as f64 / samples as f64) * std::f64::consts::TAU;
            let env_z = env.z_base[i] * displacement;
            let bulge = (env.density[i] - 0.45) * 40.0 + env_z * 0.08;
            let r = env.radius[i] * style.scale
                + f64::from(layer) * style.gap
                + (theta * lobes + rot).sin() * amplitude
                + bulge;
            let y_off = -env_z * 0.12 - style.lift;
            let theta_rot = theta + rot;
            let p = (r * theta_rot.cos(), r * theta_rot.sin() + y_off);
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();

        rc.set_paint(Color::from_rgba8(ACCENT[0], ACCENT[1], ACCENT[2], style.alpha));
        rc.stroke_path(&path);
    }
}

fn draw_cluster(
    rc: &mut vello_cpu::RenderContext,
    geometry: &Geometry,
    scene: &SceneParameters,
    elapsed_secs: f64,
) {
    let displacement = scene.cluster.displacement;
    for p in &geometry.cloud.points {
        let z = (p.z_base * displacement).trunc();
        let dz = shimmer(elapsed_secs, p.phase, p.x);
        let top = (p.x, p.y - (z + dz));

        let mut connector = BezPath::new();
        connector.move_to((p.x, p.y));
        connector.line_to(top);
        rc.set_stroke(Stroke::new(CONNECTOR_WIDTH));
        rc.set_paint(rgba(CONNECTOR));
        rc.stroke_path(&connector);

        rc.set_paint(Color::from_rgba8(ACCENT[0], ACCENT[1], ACCENT[2], 255));
        rc.fill_path(&Circle::new(top, dot_radius(dz)).to_path(0.1));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
