use crate::foundation::core::{Fps, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use std::path::Path;
use std::sync::Arc;

/// Sample rate narration is decoded to.
pub const NARRATION_SAMPLE_RATE: u32 = 48_000;
/// Channel count narration is decoded to.
pub const NARRATION_CHANNELS: u16 = 2;

/// One linear buffer of interleaved `f32` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    sample_rate: u32,
    channels: u16,
    samples: Arc<Vec<f32>>,
}

/// How [`AudioTrack::fit_to_video`] changed the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFit {
    /// Already exactly as long as the video.
    Exact,
    /// Silence appended (sample frames added).
    Padded(u64),
    /// Tail dropped (sample frames removed).
    Truncated(u64),
}

impl AudioTrack {
    /// Wrap interleaved samples, checking the layout.
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> ReelResult<Self> {
        if sample_rate == 0 {
            return Err(ReelError::invalid_configuration(
                "audio sample_rate must be non-zero",
            ));
        }
        if channels == 0 {
            return Err(ReelError::invalid_configuration(
                "audio channels must be non-zero",
            ));
        }
        if !samples.len().is_multiple_of(usize::from(channels)) {
            return Err(ReelError::invalid_configuration(format!(
                "audio sample count {} is not a multiple of {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples: Arc::new(samples),
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Samples per channel.
    pub fn sample_frames(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels)) as u64
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.sample_frames() as f64) / f64::from(self.sample_rate)
    }

    /// Pad with silence or truncate so the track lasts exactly `video_frames / fps`.
    ///
    /// Differences up to half a frame are adjusted at `debug` level, larger ones at `info`.
    pub fn fit_to_video(&self, video_frames: u64, fps: Fps) -> (AudioTrack, AudioFit) {
        let target = frame_to_sample(video_frames, fps, self.sample_rate);
        let current = self.sample_frames();
        let tolerance = frame_to_sample(1, fps, self.sample_rate) / 2;
        let diff = target.abs_diff(current);

        if diff == 0 {
            return (self.clone(), AudioFit::Exact);
        }
        if diff <= tolerance {
            tracing::debug!(target, current, "adjusting narration length within tolerance");
        } else {
            tracing::info!(
                audio_secs = self.duration_secs(),
                video_secs = fps.frames_to_secs(video_frames),
                "narration length differs from video; fitting audio to video"
            );
        }

        let channels = usize::from(self.channels);
        let keep = (target.min(current) as usize) * channels;
        let mut samples = Vec::with_capacity((target as usize) * channels);
        samples.extend_from_slice(&self.samples[..keep]);
        samples.resize((target as usize) * channels, 0.0);

        let fit = if target > current {
            AudioFit::Padded(diff)
        } else {
            AudioFit::Truncated(diff)
        };
        (
            AudioTrack {
                sample_rate: self.sample_rate,
                channels: self.channels,
                samples: Arc::new(samples),
            },
            fit,
        )
    }

    /// Samples playing under video frames `range`, padded with silence past the end.
    pub fn window(&self, range: FrameRange, fps: Fps) -> AudioTrack {
        let channels = usize::from(self.channels);
        let start = frame_to_sample(range.start.0, fps, self.sample_rate) as usize;
        let end = frame_to_sample(range.end.0, fps, self.sample_rate) as usize;
        let have = self.samples.len() / channels;

        let mut samples = Vec::with_capacity(end.saturating_sub(start) * channels);
        if start < have {
            samples.extend_from_slice(&self.samples[start * channels..end.min(have) * channels]);
        }
        samples.resize(end.saturating_sub(start) * channels, 0.0);
        AudioTrack {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: Arc::new(samples),
        }
    }

    /// Write raw little-endian `f32` PCM, the input format the ffmpeg sink expects.
    pub(crate) fn write_f32le(&self, out_path: &Path) -> ReelResult<()> {
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReelError::encoding(format!(
                    "failed to create audio output directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let mut bytes = Vec::<u8>::with_capacity(self.samples.len() * 4);
        for &sample in self.samples.iter() {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes).map_err(|e| {
            ReelError::encoding(format!(
                "failed to write audio file '{}': {e}",
                out_path.display()
            ))
        })
    }
}

/// Convert a frame count to the nearest sample index at `sample_rate`.
pub fn frame_to_sample(frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/track.rs"]
mod tests;
