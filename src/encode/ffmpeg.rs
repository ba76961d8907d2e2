use std::io::{Read as _, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig, ensure_parent_dir};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SolarError, SolarResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Write to `out_path`, replacing any existing file.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// H.264 MP4 sink backed by the system `ffmpeg`.
///
/// Frames are flattened over [`SinkConfig::background`] and piped as raw RGBA. Setup problems
/// (odd canvas, missing binary, existing output) surface from `begin` as config errors; a
/// failed write only loses that frame.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    scratch: Vec<u8>,
    order: FrameOrder,
}

impl FfmpegSink {
    /// Create a sink; `ffmpeg` is not spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            scratch: Vec::new(),
            order: FrameOrder::default(),
        }
    }

    /// Frames written to `ffmpeg` since `begin`.
    pub fn frames_written(&self) -> u64 {
        self.encoder.as_ref().map_or(0, |e| e.frames)
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SolarResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SolarError::config("mp4 output needs a non-empty canvas"));
        }
        // yuv420p subsamples chroma 2x2.
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SolarError::config(format!(
                "mp4 output needs an even canvas, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SolarError::config(format!(
                "'{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(SolarError::config(
                "mp4 output needs `ffmpeg` on PATH (use a PNG sequence otherwise)",
            ));
        }
        ensure_parent_dir(&self.opts.out_path)?;

        let cmd = encoder_command(&self.opts, cfg);
        self.encoder = Some(Encoder::spawn(cmd, cfg.background)?);
        self.scratch = vec![0; cfg.width as usize * cfg.height as usize * 4];
        self.order.reset();
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg encoder started"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SolarResult<()> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(SolarError::render("ffmpeg sink is not running"));
        };
        if frame.data.len() != self.scratch.len() {
            return Err(SolarError::render(format!(
                "frame {} is {}x{}, encoder expects {} bytes",
                idx.0,
                frame.width,
                frame.height,
                self.scratch.len()
            )));
        }
        self.order.accept(idx, "ffmpeg sink")?;

        self.scratch.copy_from_slice(&frame.data);
        flatten_over(&mut self.scratch, encoder.background, frame.premultiplied);
        encoder.write(&self.scratch)
    }

    fn end(&mut self) -> SolarResult<()> {
        let Some(encoder) = self.encoder.take() else {
            return Err(SolarError::render("ffmpeg sink is not running"));
        };
        let frames = encoder.frames;
        encoder.finish()?;
        tracing::debug!(frames, out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

/// A running `ffmpeg` child with its stderr collected on a side thread.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<Vec<u8>>,
    background: [u8; 4],
    frames: u64,
}

impl Encoder {
    fn spawn(mut cmd: Command, background: [u8; 4]) -> SolarResult<Self> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolarError::config(format!("spawn ffmpeg: {e}")))?;
        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(SolarError::config("ffmpeg pipes unavailable"));
        };
        // ffmpeg blocks once its stderr pipe fills, so it is drained continuously.
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        });
        Ok(Self {
            child,
            stdin,
            stderr,
            background,
            frames: 0,
        })
    }

    fn write(&mut self, rgba: &[u8]) -> SolarResult<()> {
        self.stdin
            .write_all(rgba)
            .map_err(|e| SolarError::render(format!("pipe frame to ffmpeg: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> SolarResult<()> {
        let Self {
            mut child,
            stdin,
            stderr,
            ..
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| SolarError::render(format!("wait for ffmpeg: {e}")))?;
        let log = stderr.join().unwrap_or_default();
        if status.success() {
            return Ok(());
        }
        Err(SolarError::render(format!(
            "ffmpeg exited with {status}: {}",
            String::from_utf8_lossy(&log).trim()
        )))
    }
}

/// Build the `ffmpeg` invocation for raw RGBA on stdin.
fn encoder_command(opts: &FfmpegSinkOpts, cfg: SinkConfig) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg(if opts.overwrite { "-y" } else { "-n" })
        .args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
        .arg("-s")
        .arg(format!("{}x{}", cfg.width, cfg.height))
        .arg("-r")
        .arg(format!("{}/{}", cfg.fps.num, cfg.fps.den))
        .args(["-i", "pipe:0", "-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
        .args(["-movflags", "+faststart"])
        .arg(&opts.out_path);
    cmd
}

/// Composite `rgba` over an opaque `background` in place; the result is fully opaque.
fn flatten_over(rgba: &mut [u8], background: [u8; 4], premultiplied: bool) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        let inv = 255 - a;
        for (c, bg) in px[..3].iter_mut().zip(background) {
            let src = if premultiplied {
                u16::from(*c)
            } else {
                mul_div255_u16(u16::from(*c), a)
            };
            *c = (src + mul_div255_u16(u16::from(bg), inv)).min(255) as u8;
        }
        px[3] = 255;
    }
}

/// Whether `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
