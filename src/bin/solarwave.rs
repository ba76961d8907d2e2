use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use solarwave::{
    AnimationClock, AnimationConfig, CpuSurface, Dataset, FfmpegSink, FfmpegSinkOpts, FrameIndex,
    InMemorySink, LoadOpts, ManualTime, MonotonicTime, PngSequenceSink, RenderCtx, RenderSurface,
    RunLimit, SceneParameters, SolarResult, SurfaceInfo, TraceSurface,
};

#[derive(Parser, Debug)]
#[command(name = "solarwave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame shown at a given time as a PNG.
    Frame(FrameArgs),
    /// Render a video (MP4 via `ffmpeg`) or a PNG sequence.
    Render(RenderArgs),
    /// Run in real time, logging the scene instead of drawing it.
    Play(PlayArgs),
    /// Print a JSON summary of a dataset.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Input CSV with year and value columns.
    #[arg(long)]
    data: PathBuf,

    /// Average rows sharing a year instead of summing them.
    #[arg(long)]
    mean: bool,

    /// Skip malformed rows instead of failing.
    #[arg(long)]
    lenient: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Animation time in seconds; the last tick at or before it is rendered.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Animation config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output MP4 path (requires `ffmpeg` on PATH).
    #[arg(long, conflicts_with = "png_dir", required_unless_present = "png_dir")]
    out: Option<PathBuf>,

    /// Write `frame_NNNNNN.png` files into this directory instead.
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Duration to render, in seconds.
    #[arg(long, conflicts_with = "loops")]
    seconds: Option<f64>,

    /// Number of full passes over the dataset (default 1).
    #[arg(long)]
    loops: Option<u32>,

    /// Animation config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Stop after this many seconds (runs until killed otherwise).
    #[arg(long)]
    seconds: Option<f64>,

    /// Animation config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Animation config JSON used for timing figures.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Play(args) => cmd_play(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_dataset(args: &DataArgs) -> anyhow::Result<Dataset> {
    let opts = LoadOpts {
        aggregate: if args.mean {
            solarwave::Aggregate::Mean
        } else {
            solarwave::Aggregate::Sum
        },
        skip_malformed: args.lenient,
    };
    solarwave::load_csv_path(&args.data, opts)
        .with_context(|| format!("load dataset '{}'", args.data.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnimationConfig> {
    match path {
        Some(p) => AnimationConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(AnimationConfig::default()),
    }
}

/// Ticks needed for `loops` full passes over `dataset`.
fn ticks_for_loops(cfg: &AnimationConfig, dataset: &Dataset, loops: u32) -> u64 {
    let secs = cfg.slot_secs * dataset.len() as f64 * f64::from(loops);
    cfg.fps.secs_to_frames_floor(secs)
}

/// Advances the clock through every tick but rasterizes only `target`.
struct SingleFrame {
    target: FrameIndex,
    inner: CpuSurface<InMemorySink>,
}

impl RenderSurface for SingleFrame {
    fn begin(&mut self, info: &SurfaceInfo) -> SolarResult<()> {
        self.inner.begin(info)
    }

    fn render(&mut self, ctx: &RenderCtx, scene: &SceneParameters) -> SolarResult<()> {
        if ctx.frame == self.target {
            self.inner.render(ctx, scene)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> SolarResult<()> {
        self.inner.finish()
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !args.at.is_finite() || args.at < 0.0 {
        anyhow::bail!("--at must be a non-negative number of seconds");
    }
    let dataset = load_dataset(&args.data)?;
    let cfg = load_config(args.config.as_deref())?;

    let target = FrameIndex(cfg.fps.secs_to_frames_floor(args.at));
    let Some(ticks) = target.0.checked_add(1) else {
        anyhow::bail!("--at {} is beyond the last representable frame", args.at);
    };
    let mut surface = SingleFrame {
        target,
        inner: CpuSurface::new(cfg.canvas, cfg.cluster.seed, InMemorySink::new()),
    };
    let mut clock = AnimationClock::from_config(dataset, &cfg, ManualTime::new())?;
    clock.run(&mut surface, RunLimit::ticks(ticks))?;

    let sink = surface.inner.into_sink();
    let Some((_, frame)) = sink.frames().last() else {
        anyhow::bail!("frame {} was not rendered", target.0);
    };

    solarwave::write_png(&args.out, frame, &mut Vec::new())
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.data)?;
    let cfg = load_config(args.config.as_deref())?;

    let ticks = match args.seconds {
        Some(s) if !s.is_finite() || s <= 0.0 => anyhow::bail!("--seconds must be positive"),
        Some(s) => cfg.fps.secs_to_frames_floor(s),
        None => ticks_for_loops(&cfg, &dataset, args.loops.unwrap_or(1)),
    };
    let mut clock = AnimationClock::from_config(dataset, &cfg, ManualTime::new())?;

    let (stats, dest) = match (&args.out, &args.png_dir) {
        (_, Some(dir)) => {
            let mut surface =
                CpuSurface::new(cfg.canvas, cfg.cluster.seed, PngSequenceSink::new(dir));
            (clock.run(&mut surface, RunLimit::ticks(ticks))?, dir)
        }
        (Some(out), None) => {
            let sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
            let mut surface = CpuSurface::new(cfg.canvas, cfg.cluster.seed, sink);
            (clock.run(&mut surface, RunLimit::ticks(ticks))?, out)
        }
        (None, None) => anyhow::bail!("either --out or --png-dir is required"),
    };

    if stats.render_failures > 0 {
        anyhow::bail!(
            "{} of {} frames failed to render into '{}'",
            stats.render_failures,
            stats.ticks,
            dest.display()
        );
    }
    eprintln!("wrote {} frames to {}", stats.ticks, dest.display());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.data)?;
    let cfg = load_config(args.config.as_deref())?;

    let limit = match args.seconds {
        Some(s) if !s.is_finite() || s <= 0.0 => anyhow::bail!("--seconds must be positive"),
        Some(s) => RunLimit::elapsed(std::time::Duration::from_secs_f64(s)),
        None => RunLimit::default(),
    };
    // Roughly one log line per second of animation.
    let every = cfg.fps.secs_to_frames_floor(1.0).max(1);
    let mut surface = TraceSurface::new(every)?;
    let mut clock = AnimationClock::from_config(dataset, &cfg, MonotonicTime::new())?;
    let stats = clock.run(&mut surface, limit)?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.data)?;
    let cfg = load_config(args.config.as_deref())?;
    let (min, max) = dataset.value_range();

    let summary = serde_json::json!({
        "records": dataset.len(),
        "first_year": dataset.first_year(),
        "last_year": dataset.last_year(),
        "min": min,
        "max": max,
        "loop_secs": cfg.slot_secs * dataset.len() as f64,
        "ticks_per_loop": ticks_for_loops(&cfg, &dataset, 1),
        "values": dataset
            .records()
            .iter()
            .map(|r| serde_json::json!({ "year": r.year, "value": r.value }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
