use crate::foundation::core::Color;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::theme::Theme;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Closed set of supported chart kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Polyline per numeric series.
    Line,
    /// Grouped bars per row.
    Bar,
    /// Markers per numeric series.
    Scatter,
    /// Filled polyline per numeric series.
    Area,
    /// Category shares of one numeric column.
    Pie,
}

impl ChartKind {
    /// Minimum number of revealed rows a frame shows.
    pub fn min_reveal_rows(self) -> usize {
        match self {
            Self::Line | Self::Area | Self::Scatter => 2,
            Self::Bar | Self::Pie => 1,
        }
    }
}

/// How many frames the animation spans.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    /// `floor(rows * rate)` frames.
    FramesPerRow(f64),
    /// A fixed frame count, independent of the row count.
    FrameCount(u64),
}

/// Logo anchor on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Top-left corner, inset by the margin.
    TopLeft,
    /// Top-right corner, inset by the margin.
    TopRight,
    /// Bottom-left corner, inset by the margin.
    BottomLeft,
    /// Bottom-right corner, inset by the margin.
    #[default]
    BottomRight,
    /// Canvas center.
    Center,
    /// Absolute top-left position in pixels; may lie partially outside the canvas.
    Offset {
        /// Horizontal position.
        x: i64,
        /// Vertical position.
        y: i64,
    },
}

/// Optional branding applied on top of each chart.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Branding {
    /// Logo image (PNG/JPEG/...), read-only.
    #[serde(default)]
    pub logo: Option<PathBuf>,
    /// Logo anchor.
    #[serde(default)]
    pub placement: Placement,
    /// Inset from the canvas edge, in pixels.
    #[serde(default = "default_margin_px")]
    pub margin_px: u32,
    /// Logo width as a fraction of the canvas width.
    #[serde(default = "default_logo_scale")]
    pub scale: f64,
    /// Accent color replacing the theme accent.
    #[serde(default)]
    pub accent: Option<Color>,
}

fn default_margin_px() -> u32 {
    16
}

fn default_logo_scale() -> f64 {
    0.12
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo: None,
            placement: Placement::default(),
            margin_px: default_margin_px(),
            scale: default_logo_scale(),
            accent: None,
        }
    }
}

/// Animation parameters supplied by the UI layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Chart kind.
    pub chart: ChartKind,
    /// Selected dataset column names.
    pub columns: Vec<String>,
    /// Frame count policy.
    pub speed: Speed,
    /// Visual theme.
    #[serde(default)]
    pub theme: Theme,
    /// Optional logo and accent.
    #[serde(default)]
    pub branding: Option<Branding>,
    /// Series palette override.
    #[serde(default)]
    pub palette: Option<Vec<Color>>,
    /// Draw an accent title bar.
    #[serde(default)]
    pub title_bar: bool,
}

impl AnimationConfig {
    /// Minimal config with the default theme and no branding.
    pub fn new(chart: ChartKind, columns: &[&str], speed: Speed) -> Self {
        Self {
            chart,
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            speed,
            theme: Theme::default(),
            branding: None,
            palette: None,
            title_bar: false,
        }
    }

    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r).map_err(|e| {
            ReelError::invalid_configuration(format!("parse animation config JSON: {e}"))
        })
    }

    /// Parse a config from a JSON file on disk.
    ///
    /// A relative logo path is resolved against the config file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::invalid_configuration(format!(
                "open animation config JSON '{}': {e}",
                path.display()
            ))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent()
            && let Some(logo) = cfg.branding.as_mut().and_then(|b| b.logo.as_mut())
            && logo.is_relative()
        {
            *logo = base.join(&*logo);
        }
        Ok(cfg)
    }

    /// Check parameters that do not depend on the dataset.
    pub fn validate(&self) -> ReelResult<()> {
        if self.columns.is_empty() {
            return Err(ReelError::incompatible_chart(
                "at least one column must be selected",
            ));
        }
        if let Some(p) = &self.palette
            && p.is_empty()
        {
            return Err(ReelError::invalid_configuration(
                "palette override must not be empty",
            ));
        }
        if let Some(b) = &self.branding {
            if !b.scale.is_finite() || b.scale <= 0.0 || b.scale > 1.0 {
                return Err(ReelError::invalid_configuration(
                    "branding scale must be in (0, 1]",
                ));
            }
            if let Some(logo) = &b.logo
                && !logo.is_file()
            {
                return Err(ReelError::invalid_configuration(format!(
                    "branding logo '{}' does not exist",
                    logo.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
