use crate::audio::narration::{AudioTrackBuilder, NarrationSpec};
use crate::data::dataset::DatasetView;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, default_ffmpeg_program};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::tmp::{TempFileGuard, unique_temp_path};
use crate::render::branding::LogoOverlay;
use crate::render::cpu::CpuChartRenderer;
use crate::scene::config::AnimationConfig;
use crate::scene::quality::QualityPreset;
use crate::sequence::sequencer::FrameSequencer;
use crate::session::controller::PipelineController;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

/// Environment variable overriding [`RenderJobOpts::threads`].
pub const THREADS_ENV: &str = "CHARTREEL_THREADS";

/// Options controlling how a [`RenderJob`] renders and assembles.
#[derive(Clone, Debug)]
pub struct RenderJobOpts {
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Descriptors dispatched per chunk; also bounds the reorder window.
    pub chunk_size: usize,
    /// Bounded channel capacity between render workers and the assembler thread.
    pub channel_capacity: usize,
    /// Largest tolerated `failed / total` ratio; failed frames below it are substituted.
    pub max_failed_fraction: f64,
    /// Render descriptors with identical reveal state once per chunk.
    pub static_frame_elision: bool,
    /// Render only this sub-range of the sequence.
    pub range: Option<FrameRange>,
    /// Override the preset's canvas size.
    pub canvas: Option<Canvas>,
}

impl Default for RenderJobOpts {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: 64,
            channel_capacity: 4,
            max_failed_fraction: 0.1,
            static_frame_elision: true,
            range: None,
            canvas: None,
        }
    }
}

impl RenderJobOpts {
    /// Defaults, with `threads` taken from `$CHARTREEL_THREADS` when set.
    pub fn from_env() -> ReelResult<Self> {
        let mut opts = Self::default();
        if let Some(raw) = std::env::var_os(THREADS_ENV) {
            let raw = raw.to_string_lossy();
            let n = raw.trim().parse::<usize>().map_err(|_| {
                ReelError::invalid_configuration(format!(
                    "{THREADS_ENV} must be a positive integer, got '{raw}'"
                ))
            })?;
            opts.threads = Some(n);
        }
        opts.validate()?;
        Ok(opts)
    }

    /// Check option ranges.
    pub fn validate(&self) -> ReelResult<()> {
        if self.threads == Some(0) {
            return Err(ReelError::invalid_configuration(
                "'threads' must be >= 1 when set",
            ));
        }
        if !self.max_failed_fraction.is_finite() || !(0.0..=1.0).contains(&self.max_failed_fraction)
        {
            return Err(ReelError::invalid_configuration(
                "max_failed_fraction must be within [0, 1]",
            ));
        }
        if let Some(c) = self.canvas {
            Canvas::new(c.width, c.height)?;
        }
        Ok(())
    }
}

/// Lifecycle state of a [`RenderJob`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JobState {
    /// Created, not started.
    Queued = 0,
    /// Frames are being rendered and streamed to the sink.
    Rendering = 1,
    /// All frames delivered; the sink is finalizing the output.
    Assembling = 2,
    /// Output committed.
    Completed = 3,
    /// Unrecoverable error; no output.
    Failed = 4,
    /// Cancelled by the caller; no output.
    Cancelled = 5,
}

impl JobState {
    /// Return `true` for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `Queued -> Failed` covers jobs rejected by validation before any frame is dispatched.
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Queued, Rendering)
                | (Rendering, Assembling)
                | (Assembling, Completed)
                | (Queued | Rendering | Assembling, Failed)
                | (Queued | Rendering | Assembling, Cancelled)
        )
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Queued,
            1 => Self::Rendering,
            2 => Self::Assembling,
            3 => Self::Completed,
            4 => Self::Failed,
            _ => Self::Cancelled,
        }
    }
}

/// Snapshot of job progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Progress {
    /// Frames delivered to the sink.
    pub completed: u64,
    /// Frames the job will deliver.
    pub total: u64,
}

impl Progress {
    /// `completed / total`, `0.0` before the total is known.
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64) / (self.total as f64)
        }
    }
}

/// Atomic progress counters shared between the job thread and observers.
#[derive(Debug, Default)]
pub struct JobProgress {
    completed: AtomicU64,
    total: AtomicU64,
}

impl JobProgress {
    /// Current counters.
    pub fn snapshot(&self) -> Progress {
        Progress {
            completed: self.completed.load(Ordering::Acquire),
            total: self.total.load(Ordering::Acquire),
        }
    }

    pub(crate) fn start(&self, total: u64) {
        self.total.store(total, Ordering::Release);
    }

    pub(crate) fn advance(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }
}

/// Cooperative cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Shared view of a job's state, progress and cancellation, cheap to clone across threads.
#[derive(Clone, Debug, Default)]
pub struct JobControl {
    state: Arc<AtomicU8>,
    progress: Arc<JobProgress>,
    cancel: CancelToken,
}

impl JobControl {
    /// A control block in the `Queued` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current progress.
    pub fn progress(&self) -> Progress {
        self.progress.snapshot()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The underlying cancellation token.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub(crate) fn counters(&self) -> &JobProgress {
        &self.progress
    }

    /// Move to `next` if the lifecycle allows it; terminal states never change.
    pub(crate) fn transition(&self, next: JobState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                JobState::from_u8(cur)
                    .can_transition_to(next)
                    .then_some(next as u8)
            })
            .is_ok()
    }
}

/// Render statistics of a finished job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Total frames in the rendered range.
    pub frames_total: u64,
    /// Frames actually rasterized (fewer than total when static-frame elision applies).
    pub frames_rendered: u64,
    /// Frames that reused an identical earlier render.
    pub frames_elided: u64,
    /// Failed frames replaced by a placeholder.
    pub frames_substituted: u64,
}

/// What a [`JobWarning`] is about.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// These frames failed and show the nearest successful frame instead.
    SubstitutedFrames {
        /// Indices of substituted frames.
        indices: Vec<u64>,
    },
    /// The logo could not be applied to some or all frames.
    BrandingApplyFailure,
    /// Narration was requested but could not be produced; the video is silent.
    NarrationSynthesisFailure,
}

/// Non-fatal problem attached to a completed job.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct JobWarning {
    /// Classification.
    pub kind: WarningKind,
    /// Human-readable detail.
    pub message: String,
}

/// Terminal result of a [`RenderJob`].
#[derive(Debug)]
pub enum JobOutcome {
    /// Output committed, possibly degraded (see `warnings`).
    Completed {
        /// Output path.
        path: PathBuf,
        /// Non-fatal problems.
        warnings: Vec<JobWarning>,
        /// Render statistics.
        stats: RenderStats,
    },
    /// The job failed; nothing was written to the output path.
    Failed {
        /// Classified cause.
        error: ReelError,
    },
    /// The job was cancelled; nothing was written to the output path.
    Cancelled,
}

impl JobOutcome {
    /// The terminal [`JobState`] this outcome corresponds to.
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed { .. } => JobState::Completed,
            Self::Failed { .. } => JobState::Failed,
            Self::Cancelled => JobState::Cancelled,
        }
    }

    /// Warnings of a completed job; empty otherwise.
    pub fn warnings(&self) -> &[JobWarning] {
        match self {
            Self::Completed { warnings, .. } => warnings,
            _ => &[],
        }
    }
}

/// One request to turn a dataset into a video.
///
/// Binds the dataset, animation config, quality preset, optional narration and output path.
/// Run it synchronously with [`RenderJob::run`] or on its own thread with [`RenderJob::spawn`].
pub struct RenderJob {
    dataset: DatasetView,
    config: AnimationConfig,
    preset: QualityPreset,
    narration: NarrationSpec,
    output: PathBuf,
    opts: RenderJobOpts,
    audio: AudioTrackBuilder,
    ffmpeg: PathBuf,
    control: JobControl,
}

impl RenderJob {
    /// Create a queued job writing an MP4 to `output`.
    pub fn new(
        dataset: DatasetView,
        config: AnimationConfig,
        preset: QualityPreset,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dataset,
            config,
            preset,
            narration: NarrationSpec::None,
            output: output.into(),
            opts: RenderJobOpts::default(),
            audio: AudioTrackBuilder::default(),
            ffmpeg: default_ffmpeg_program(),
            control: JobControl::new(),
        }
    }

    /// Attach narration.
    pub fn with_narration(mut self, narration: NarrationSpec) -> Self {
        self.narration = narration;
        self
    }

    /// Replace the render options.
    pub fn with_opts(mut self, opts: RenderJobOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Use `builder` (and its speech synthesizer) for narration.
    pub fn with_audio_builder(mut self, builder: AudioTrackBuilder) -> Self {
        self.audio = builder;
        self
    }

    /// ffmpeg executable used for encoding and audio decoding.
    pub fn with_ffmpeg(mut self, program: impl Into<PathBuf>) -> Self {
        self.ffmpeg = program.into();
        self.audio = self.audio.with_ffmpeg(self.ffmpeg.clone());
        self
    }

    /// Output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Shared state/progress/cancel block, usable before and while the job runs.
    pub fn control(&self) -> JobControl {
        self.control.clone()
    }

    /// Run to completion on the current thread, encoding an MP4 with ffmpeg.
    pub fn run(self) -> JobOutcome {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            program: self.ffmpeg.clone(),
            ..FfmpegSinkOpts::new(&self.output)
        });
        self.run_with_sink(&mut sink)
    }

    /// Run to completion on the current thread, streaming frames into `sink`.
    #[tracing::instrument(skip_all, fields(output = %self.output.display(), preset = ?self.preset))]
    pub fn run_with_sink(self, sink: &mut dyn FrameSink) -> JobOutcome {
        let mut warnings = Vec::new();
        match self.execute(sink, &mut warnings) {
            Ok(stats) => {
                self.control.transition(JobState::Completed);
                tracing::info!(
                    frames = stats.frames_total,
                    rendered = stats.frames_rendered,
                    warnings = warnings.len(),
                    "render job completed"
                );
                JobOutcome::Completed {
                    path: self.output.clone(),
                    warnings,
                    stats,
                }
            }
            Err(ReelError::Cancelled) => {
                self.control.transition(JobState::Cancelled);
                tracing::info!("render job cancelled");
                JobOutcome::Cancelled
            }
            Err(error) => {
                self.control.transition(JobState::Failed);
                tracing::info!(kind = ?error.kind(), %error, "render job failed");
                JobOutcome::Failed { error }
            }
        }
    }

    /// Run on a dedicated thread with the ffmpeg sink.
    pub fn spawn(self) -> ReelResult<JobHandle> {
        self.spawn_inner(|job| job.run())
    }

    /// Run on a dedicated thread, streaming into `sink`.
    pub fn spawn_with_sink<S: FrameSink + 'static>(self, mut sink: S) -> ReelResult<JobHandle> {
        self.spawn_inner(move |job| job.run_with_sink(&mut sink))
    }

    fn spawn_inner(
        self,
        body: impl FnOnce(RenderJob) -> JobOutcome + Send + 'static,
    ) -> ReelResult<JobHandle> {
        let control = self.control.clone();
        let join = std::thread::Builder::new()
            .name("chartreel-job".to_owned())
            .spawn(move || body(self))
            .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to spawn job thread: {e}")))?;
        Ok(JobHandle { control, join })
    }

    fn execute(
        &self,
        sink: &mut dyn FrameSink,
        warnings: &mut Vec<JobWarning>,
    ) -> ReelResult<RenderStats> {
        if self.control.is_cancelled() {
            return Err(ReelError::Cancelled);
        }
        self.opts.validate()?;
        if self.output.as_os_str().is_empty() {
            return Err(ReelError::invalid_configuration("output path is empty"));
        }
        let seq = FrameSequencer::sequence(&self.dataset, &self.config)?;
        let range = self.opts.range.unwrap_or_else(|| seq.full_range());
        seq.check_range(range)?;
        let canvas = self.opts.canvas.unwrap_or_else(|| self.preset.canvas());
        let fps = self.preset.fps();

        if !self.control.transition(JobState::Rendering) {
            return Err(ReelError::Cancelled);
        }
        tracing::info!(
            frames = range.len_frames(),
            rows = seq.row_count(),
            width = canvas.width,
            height = canvas.height,
            "render job started"
        );

        let logo = match self.config.branding.as_ref() {
            Some(branding) => LogoOverlay::prepare(branding, canvas).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "logo could not be prepared; rendering without branding");
                warnings.push(warning(WarningKind::BrandingApplyFailure, &e));
                None
            }),
            None => None,
        };

        let mut audio_tmp = TempFileGuard::default();
        let audio = match self.audio.build(&self.narration) {
            Ok(Some(track)) => {
                let (fitted, fit) = track.fit_to_video(seq.len(), fps);
                tracing::debug!(?fit, "narration fitted to video length");
                let path = unique_temp_path(&std::env::temp_dir(), "chartreel_narration", "f32le");
                audio_tmp = TempFileGuard::new(path.clone());
                fitted.window(range, fps).write_f32le(&path)?;
                Some(AudioInputConfig {
                    path,
                    sample_rate: fitted.sample_rate(),
                    channels: fitted.channels(),
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "narration unavailable; continuing without audio");
                warnings.push(warning(WarningKind::NarrationSynthesisFailure, &e));
                None
            }
        };

        let renderer = CpuChartRenderer::new(self.dataset.clone(), canvas).with_logo(logo);
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            frame_count: range.len_frames(),
            quality: self.preset,
            audio,
        };
        let report =
            PipelineController::new(&renderer, &self.opts).run(&seq, range, sink, cfg, &self.control)?;
        drop(audio_tmp);

        if !report.substituted.is_empty() {
            tracing::warn!(
                count = report.substituted.len(),
                "failed frames were replaced by placeholders"
            );
            warnings.push(JobWarning {
                message: format!(
                    "{} of {} frames failed to render and show the nearest successful frame",
                    report.substituted.len(),
                    report.stats.frames_total
                ),
                kind: WarningKind::SubstitutedFrames {
                    indices: report.substituted,
                },
            });
        }
        if let Some(message) = report.branding_message {
            warnings.push(JobWarning {
                kind: WarningKind::BrandingApplyFailure,
                message: format!(
                    "branding skipped on {} frame(s): {message}",
                    report.branding_failures
                ),
            });
        }
        Ok(report.stats)
    }
}

fn warning(kind: WarningKind, err: &ReelError) -> JobWarning {
    JobWarning {
        kind,
        message: err.to_string(),
    }
}

/// Handle to a job running on its own thread.
#[derive(Debug)]
pub struct JobHandle {
    control: JobControl,
    join: std::thread::JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.control.state()
    }

    /// Current progress.
    pub fn progress(&self) -> Progress {
        self.control.progress()
    }

    /// Request cancellation; takes effect at the next dispatch or before finalization.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Return `true` once the job reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the job finishes.
    pub fn wait(self) -> JobOutcome {
        match self.join.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                self.control.transition(JobState::Failed);
                JobOutcome::Failed {
                    error: ReelError::Other(anyhow::anyhow!("render job thread panicked")),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
