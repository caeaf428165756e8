use crate::foundation::core::Color;
use crate::scene::config::ChartKind;

/// Named visual theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Dark grey background, cyan accent.
    #[default]
    Modern,
    /// Slate background, blue accent.
    Corporate,
    /// Black background, magenta accent.
    Dark,
    /// White background, blue accent.
    Light,
}

/// Base colors of a theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    /// Canvas background.
    pub background: Color,
    /// Foreground used for axes and legend frames.
    pub text: Color,
    /// Highlight color (single-series charts, title bar).
    pub accent: Color,
    /// Eight-entry series palette.
    pub palette: [Color; 8],
}

const MODERN: ThemeColors = ThemeColors {
    background: Color::hex(0x1a1a1a),
    text: Color::hex(0xffffff),
    accent: Color::hex(0x00a8e8),
    palette: [
        Color::hex(0x00a8e8),
        Color::hex(0x00ff99),
        Color::hex(0xff0066),
        Color::hex(0xffcc00),
        Color::hex(0x00ccff),
        Color::hex(0x33ff99),
        Color::hex(0xff3366),
        Color::hex(0xffdd33),
    ],
};

const CORPORATE: ThemeColors = ThemeColors {
    background: Color::hex(0x2c3e50),
    text: Color::hex(0xecf0f1),
    accent: Color::hex(0x3498db),
    palette: [
        Color::hex(0x3498db),
        Color::hex(0x2ecc71),
        Color::hex(0xe74c3c),
        Color::hex(0xf1c40f),
        Color::hex(0x9b59b6),
        Color::hex(0x1abc9c),
        Color::hex(0xe67e22),
        Color::hex(0x34495e),
    ],
};

const DARK: ThemeColors = ThemeColors {
    background: Color::hex(0x000000),
    text: Color::hex(0xffffff),
    accent: Color::hex(0xff0066),
    palette: [
        Color::hex(0xff0066),
        Color::hex(0x00ff99),
        Color::hex(0x00ccff),
        Color::hex(0xffcc00),
        Color::hex(0xff3366),
        Color::hex(0x33ff99),
        Color::hex(0x33ccff),
        Color::hex(0xffdd33),
    ],
};

const LIGHT: ThemeColors = ThemeColors {
    background: Color::hex(0xffffff),
    text: Color::hex(0x2c3e50),
    accent: Color::hex(0x3498db),
    palette: [
        Color::hex(0x3498db),
        Color::hex(0x2ecc71),
        Color::hex(0xe74c3c),
        Color::hex(0xf1c40f),
        Color::hex(0x9b59b6),
        Color::hex(0x1abc9c),
        Color::hex(0xe67e22),
        Color::hex(0x34495e),
    ],
};

impl Theme {
    /// Fixed colors for this theme.
    pub fn colors(self) -> &'static ThemeColors {
        match self {
            Self::Modern => &MODERN,
            Self::Corporate => &CORPORATE,
            Self::Dark => &DARK,
            Self::Light => &LIGHT,
        }
    }
}

/// Per-chart-kind drawing constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartStyle {
    /// Stroke width in reference pixels (scaled with canvas height).
    pub line_width: f64,
    /// Marker diameter in reference pixels.
    pub marker_size: f64,
    /// Series fill/stroke opacity.
    pub opacity: f32,
    /// Fraction of a category slot covered by bars.
    pub bar_width: f64,
}

impl ChartStyle {
    /// Constants for `kind`.
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Line => Self {
                line_width: 2.0,
                marker_size: 6.0,
                opacity: 0.8,
                bar_width: 0.0,
            },
            ChartKind::Bar => Self {
                line_width: 0.0,
                marker_size: 0.0,
                opacity: 0.7,
                bar_width: 0.8,
            },
            ChartKind::Scatter => Self {
                line_width: 0.0,
                marker_size: 8.0,
                opacity: 0.7,
                bar_width: 0.0,
            },
            ChartKind::Area => Self {
                line_width: 1.0,
                marker_size: 0.0,
                opacity: 0.6,
                bar_width: 0.0,
            },
            ChartKind::Pie => Self {
                line_width: 0.0,
                marker_size: 0.0,
                opacity: 0.8,
                bar_width: 0.0,
            },
        }
    }
}

/// Fully resolved, immutable style shared by every descriptor of one sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStyle {
    /// Source theme.
    pub theme: Theme,
    /// Canvas background.
    pub background: Color,
    /// Axis color.
    pub axis: Color,
    /// Grid line color (axis color at 30% opacity).
    pub grid: Color,
    /// Accent color (theme accent unless branding overrides it).
    pub accent: Color,
    /// Series palette, never empty.
    pub palette: Vec<Color>,
    /// Chart-kind constants.
    pub chart: ChartStyle,
    /// Draw an accent title bar across the top of the canvas.
    pub title_bar: bool,
}

impl ResolvedStyle {
    /// Resolve theme defaults with optional overrides.
    pub fn resolve(
        theme: Theme,
        kind: ChartKind,
        accent: Option<Color>,
        palette: Option<&[Color]>,
        title_bar: bool,
    ) -> Self {
        let colors = theme.colors();
        let palette = match palette {
            Some(p) if !p.is_empty() => p.to_vec(),
            _ => colors.palette.to_vec(),
        };
        Self {
            theme,
            background: colors.background,
            axis: colors.text,
            grid: colors.text.with_opacity(0.3),
            accent: accent.unwrap_or(colors.accent),
            palette,
            chart: ChartStyle::for_kind(kind),
            title_bar,
        }
    }

    /// Color of series `i`, cycling through the palette.
    pub fn series_color(&self, i: usize) -> Color {
        self.palette[i % self.palette.len()]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/theme.rs"]
mod tests;
