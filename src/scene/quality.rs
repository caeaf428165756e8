use crate::foundation::core::{Canvas, Fps};

/// Output quality/performance trade-off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// 480p, 15 fps, smallest files.
    Low,
    /// 720p, 24 fps.
    #[default]
    Medium,
    /// 1080p, 30 fps, largest files.
    High,
}

/// x264 settings for a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderParams {
    /// `-preset` speed/efficiency name.
    pub speed: &'static str,
    /// Constant rate factor (lower is better quality).
    pub crf: u8,
    /// Bitrate cap in kbit/s (`-maxrate`).
    pub max_bitrate_kbps: u32,
}

impl QualityPreset {
    /// Output frame size.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Low => Canvas {
                width: 854,
                height: 480,
            },
            Self::Medium => Canvas {
                width: 1280,
                height: 720,
            },
            Self::High => Canvas {
                width: 1920,
                height: 1080,
            },
        }
    }

    /// Output frame rate.
    pub fn fps(self) -> Fps {
        match self {
            Self::Low => Fps::integer(15),
            Self::Medium => Fps::integer(24),
            Self::High => Fps::integer(30),
        }
    }

    /// Encoder parameters.
    pub fn encoder(self) -> EncoderParams {
        match self {
            Self::Low => EncoderParams {
                speed: "ultrafast",
                crf: 28,
                max_bitrate_kbps: 1_000,
            },
            Self::Medium => EncoderParams {
                speed: "medium",
                crf: 23,
                max_bitrate_kbps: 4_000,
            },
            Self::High => EncoderParams {
                speed: "slow",
                crf: 18,
                max_bitrate_kbps: 10_000,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/quality.rs"]
mod tests;
