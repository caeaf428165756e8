use crate::audio::track::{AudioTrack, NARRATION_CHANNELS, NARRATION_SAMPLE_RATE};
use crate::encode::ffmpeg::default_ffmpeg_program;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::tmp::{TempFileGuard, unique_temp_path};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// What narration, if any, accompanies the video.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum NarrationSpec {
    /// Silent video.
    #[default]
    None,
    /// Pre-recorded audio file (any format ffmpeg can decode).
    Recorded {
        /// Audio file path.
        path: PathBuf,
    },
    /// Text handed to a [`SpeechSynthesizer`].
    Text {
        /// Script to speak.
        text: String,
        /// Engine-specific voice name.
        #[serde(default)]
        voice: Option<String>,
    },
}

/// External text-to-speech collaborator.
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`, returning the synthesized track.
    fn synthesize(&self, text: &str, voice: Option<&str>) -> ReelResult<AudioTrack>;
}

/// Synthesizer used when no engine is configured; always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpeechEngine;

impl SpeechSynthesizer for NoSpeechEngine {
    fn synthesize(&self, _text: &str, _voice: Option<&str>) -> ReelResult<AudioTrack> {
        Err(ReelError::narration("no speech engine is configured"))
    }
}

/// Runs an external TTS command that writes an audio file, then decodes it with ffmpeg.
///
/// Arguments may contain the placeholders `{text}`, `{voice}` and `{out}`, e.g.
/// `espeak-ng -v {voice} -w {out} {text}`.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    program: PathBuf,
    args: Vec<String>,
    default_voice: String,
    out_ext: String,
    ffmpeg: PathBuf,
}

impl CommandSynthesizer {
    /// Synthesizer invoking `program` with `args`, producing a `.wav` file.
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            default_voice: "default".to_owned(),
            out_ext: "wav".to_owned(),
            ffmpeg: default_ffmpeg_program(),
        }
    }

    /// Voice substituted for `{voice}` when the narration names none.
    pub fn with_default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }

    /// Extension of the file the command writes.
    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        self.out_ext = ext.into();
        self
    }

    /// ffmpeg used to decode the synthesized file.
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str, voice: Option<&str>) -> ReelResult<AudioTrack> {
        let out = TempFileGuard::new(unique_temp_path(
            &std::env::temp_dir(),
            "chartreel_tts",
            &self.out_ext,
        ));
        let out_path = out
            .path()
            .ok_or_else(|| ReelError::narration("speech output path missing"))?;
        let out_str = out_path.to_string_lossy();
        let voice = voice.unwrap_or(&self.default_voice);

        let args = self.args.iter().map(|a| {
            a.replace("{text}", text)
                .replace("{voice}", voice)
                .replace("{out}", &out_str)
        });
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ReelError::narration(format!(
                    "failed to run speech command '{}': {e}",
                    self.program.display()
                ))
            })?;
        if !output.status.success() {
            return Err(ReelError::narration(format!(
                "speech command exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        decode_audio(&self.ffmpeg, out_path, NARRATION_SAMPLE_RATE)
    }
}

/// Produces the narration track for a job.
#[derive(Clone)]
pub struct AudioTrackBuilder {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    ffmpeg: PathBuf,
}

impl std::fmt::Debug for AudioTrackBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTrackBuilder")
            .field("ffmpeg", &self.ffmpeg)
            .finish_non_exhaustive()
    }
}

impl Default for AudioTrackBuilder {
    fn default() -> Self {
        Self::new(Arc::new(NoSpeechEngine))
    }
}

impl AudioTrackBuilder {
    /// Builder delegating text narration to `synthesizer`.
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            ffmpeg: default_ffmpeg_program(),
        }
    }

    /// ffmpeg used to decode recorded narration.
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }

    /// Produce the narration track, or `None` for a silent video.
    ///
    /// Every failure is reported as [`ReelError::NarrationSynthesisFailure`].
    pub fn build(&self, spec: &NarrationSpec) -> ReelResult<Option<AudioTrack>> {
        let track = match spec {
            NarrationSpec::None => return Ok(None),
            NarrationSpec::Recorded { path } => {
                if !path.is_file() {
                    return Err(ReelError::narration(format!(
                        "narration audio '{}' does not exist",
                        path.display()
                    )));
                }
                decode_audio(&self.ffmpeg, path, NARRATION_SAMPLE_RATE)
            }
            NarrationSpec::Text { text, voice } => {
                if text.trim().is_empty() {
                    return Err(ReelError::narration("narration text is empty"));
                }
                self.synthesizer.synthesize(text, voice.as_deref())
            }
        };
        match track {
            Ok(t) if t.sample_frames() == 0 => {
                Err(ReelError::narration("narration produced no audio samples"))
            }
            Ok(t) => Ok(Some(t)),
            Err(e @ ReelError::NarrationSynthesisFailure(_)) => Err(e),
            Err(e) => Err(ReelError::narration(e.to_string())),
        }
    }
}

/// Decode an audio file to stereo interleaved `f32` PCM via ffmpeg.
pub fn decode_audio(ffmpeg: &Path, path: &Path, sample_rate: u32) -> ReelResult<AudioTrack> {
    let out = Command::new(ffmpeg)
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &NARRATION_CHANNELS.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelError::narration(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::narration(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::narration(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let pcm: Vec<f32> = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    AudioTrack::new(sample_rate, NARRATION_CHANNELS, pcm)
        .map_err(|e| ReelError::narration(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/narration.rs"]
mod tests;
