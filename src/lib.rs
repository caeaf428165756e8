//! chartreel turns a tabular dataset into an animated chart video.
//!
//! The pipeline is job-oriented:
//!
//! - Describe the data with a [`DatasetView`] and the animation with an [`AnimationConfig`]
//! - Create a [`RenderJob`] for a [`QualityPreset`] and an output path
//! - Run it, or spawn it and poll the [`JobHandle`] for state and progress
//!
//! Frames are sequenced by [`FrameSequencer`], rasterized on the CPU by [`CpuChartRenderer`],
//! reordered by the [`Assembler`] and streamed into a [`FrameSink`] (ffmpeg MP4 by default).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Narration tracks and the speech synthesis seam.
pub mod audio;
/// Tabular input data.
pub mod data;
/// Frame sinks.
pub mod encode;
/// Chart rasterization and branding.
pub mod render;
/// Animation config, themes and quality presets.
pub mod scene;
/// Frame sequencing.
pub mod sequence;
/// Job orchestration.
pub mod session;

pub use crate::foundation::core::{Canvas, Color, Fps, FrameIndex, FrameRange, Rgba8Premul};
pub use crate::foundation::error::{ErrorKind, ReelError, ReelResult};

pub use crate::audio::narration::{
    AudioTrackBuilder, CommandSynthesizer, NarrationSpec, NoSpeechEngine, SpeechSynthesizer,
};
pub use crate::audio::track::{AudioFit, AudioTrack};
pub use crate::data::dataset::{Column, ColumnData, ColumnKind, DatasetView};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{FrameRGBA, FrameRenderer, RenderedFrame};
pub use crate::render::branding::LogoOverlay;
pub use crate::render::cpu::CpuChartRenderer;
pub use crate::scene::config::{AnimationConfig, Branding, ChartKind, Placement, Speed};
pub use crate::scene::quality::{EncoderParams, QualityPreset};
pub use crate::scene::theme::Theme;
pub use crate::sequence::sequencer::{FrameDescriptor, FrameSequence, FrameSequencer};
pub use crate::session::assembler::{Assembler, AssemblyReport};
pub use crate::session::controller::PipelineController;
pub use crate::session::job::{
    CancelToken, JobControl, JobHandle, JobOutcome, JobState, JobWarning, Progress, RenderJob,
    RenderJobOpts, RenderStats, WarningKind,
};
