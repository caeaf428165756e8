use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chartreel::{
    AnimationConfig, AudioTrackBuilder, CommandSynthesizer, CpuChartRenderer, DatasetView,
    FrameIndex, FrameRange, FrameRenderer as _, FrameSequencer, JobOutcome, LogoOverlay,
    NarrationSpec, QualityPreset, RenderJob, RenderJobOpts,
};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "chartreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg`).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the frame sequence as JSON.
    Sequence(InputArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Dataset JSON (`{ "columns": [...] }`).
    #[arg(long)]
    data: PathBuf,

    /// Animation config JSON.
    #[arg(long)]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output quality.
    #[arg(long, value_enum, default_value_t = QualityChoice::Medium)]
    quality: QualityChoice,

    /// Narration text, spoken by `--tts`.
    #[arg(long, conflicts_with = "narration_audio")]
    narration_text: Option<String>,

    /// Voice passed to the speech command.
    #[arg(long, requires = "narration_text")]
    voice: Option<String>,

    /// Pre-recorded narration audio file.
    #[arg(long)]
    narration_audio: Option<PathBuf>,

    /// Speech command; arguments may use `{text}`, `{voice}` and `{out}`.
    #[arg(long)]
    tts: Option<PathBuf>,

    /// Argument for `--tts` (repeatable).
    #[arg(long = "tts-arg", allow_hyphen_values = true)]
    tts_args: Vec<String>,

    /// Worker threads (defaults to `$CHARTREEL_THREADS`, then the CPU count).
    #[arg(long)]
    threads: Option<usize>,

    /// First frame to render (inclusive).
    #[arg(long)]
    start: Option<u64>,

    /// Frame to stop at (exclusive).
    #[arg(long)]
    end: Option<u64>,

    /// Largest tolerated fraction of failed frames.
    #[arg(long)]
    max_failed_fraction: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas size preset.
    #[arg(long, value_enum, default_value_t = QualityChoice::Medium)]
    quality: QualityChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Low,
    Medium,
    High,
}

impl From<QualityChoice> for QualityPreset {
    fn from(q: QualityChoice) -> Self {
        match q {
            QualityChoice::Low => QualityPreset::Low,
            QualityChoice::Medium => QualityPreset::Medium,
            QualityChoice::High => QualityPreset::High,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn read_inputs(args: &InputArgs) -> anyhow::Result<(DatasetView, AnimationConfig)> {
    let dataset = DatasetView::from_path(&args.data)
        .with_context(|| format!("load dataset '{}'", args.data.display()))?;
    let config = AnimationConfig::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    Ok((dataset, config))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (dataset, config) = read_inputs(&args.input)?;

    let mut opts = RenderJobOpts::from_env()?;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if let Some(f) = args.max_failed_fraction {
        opts.max_failed_fraction = f;
    }
    if args.start.is_some() || args.end.is_some() {
        let seq = FrameSequencer::sequence(&dataset, &config)?;
        opts.range = Some(FrameRange::new(
            FrameIndex(args.start.unwrap_or(0)),
            FrameIndex(args.end.unwrap_or(seq.len())),
        )?);
    }

    let narration = match (args.narration_text, args.narration_audio) {
        (Some(text), _) => NarrationSpec::Text {
            text,
            voice: args.voice,
        },
        (None, Some(path)) => NarrationSpec::Recorded { path },
        (None, None) => NarrationSpec::None,
    };

    let mut job = RenderJob::new(dataset, config, args.quality.into(), &args.out)
        .with_opts(opts)
        .with_narration(narration);
    if let Some(tts) = args.tts {
        let synth = CommandSynthesizer::new(tts, args.tts_args);
        job = job.with_audio_builder(AudioTrackBuilder::new(std::sync::Arc::new(synth)));
    }

    let handle = job.spawn()?;
    let mut last_decile = 0;
    while !handle.is_finished() {
        std::thread::sleep(Duration::from_millis(250));
        let p = handle.progress();
        let decile = (p.fraction() * 10.0) as u32;
        if decile != last_decile {
            tracing::info!(completed = p.completed, total = p.total, state = ?handle.state(), "progress");
            last_decile = decile;
        }
    }

    match handle.wait() {
        JobOutcome::Completed {
            path,
            warnings,
            stats,
        } => {
            for w in &warnings {
                tracing::warn!(kind = ?w.kind, "{}", w.message);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "path": path,
                    "stats": stats,
                    "warnings": warnings,
                }))?
            );
            Ok(())
        }
        JobOutcome::Failed { error } => Err(anyhow::Error::new(error).context("render failed")),
        JobOutcome::Cancelled => anyhow::bail!("render cancelled"),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (dataset, config) = read_inputs(&args.input)?;
    let preset = QualityPreset::from(args.quality);
    let seq = FrameSequencer::sequence(&dataset, &config)?;
    let desc = seq.descriptor(FrameIndex(args.frame))?;

    let logo = match config.branding.as_ref() {
        Some(b) => LogoOverlay::prepare(b, preset.canvas())?,
        None => None,
    };
    let renderer = CpuChartRenderer::new(dataset, preset.canvas()).with_logo(logo);
    let rendered = renderer.render(&desc);
    if let Some(w) = &rendered.branding_warning {
        tracing::warn!("{w}");
    }
    let frame = rendered.status?;

    chartreel::write_png(&args.out, &frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: InputArgs) -> anyhow::Result<()> {
    let (dataset, config) = read_inputs(&args)?;
    let seq = FrameSequencer::sequence(&dataset, &config)?;
    let descriptors: Vec<serde_json::Value> = seq
        .iter()
        .map(|d| {
            serde_json::json!({
                "index": d.index.0,
                "reveal": d.reveal,
                "progress": d.progress,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "chart": seq.plan().kind,
            "rows": seq.row_count(),
            "frames": seq.len(),
            "descriptors": descriptors,
        }))?
    );
    Ok(())
}
