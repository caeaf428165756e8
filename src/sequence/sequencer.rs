use crate::data::dataset::{ColumnKind, DatasetView};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::config::{AnimationConfig, Branding, ChartKind, Speed};
use crate::scene::theme::ResolvedStyle;
use std::sync::Arc;

/// Upper bound on frames per sequence, to reject runaway speed settings early.
pub const MAX_FRAMES: u64 = 1_000_000;

/// What the horizontal (or categorical) axis is driven by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XAxis {
    /// Row position.
    Index,
    /// A temporal column (column index into the dataset).
    Temporal(usize),
    /// A label column for bars and pie slices (column index into the dataset).
    Labels(usize),
}

/// Column mapping and style resolved once per sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPlan {
    /// Chart kind.
    pub kind: ChartKind,
    /// Horizontal axis source.
    pub x: XAxis,
    /// Numeric series columns (dataset column indices), in selection order.
    pub series: Vec<usize>,
    /// `(min, max)` of the temporal x column over all rows.
    pub temporal_extent: Option<(i64, i64)>,
    /// Immutable resolved style.
    pub style: ResolvedStyle,
    /// Branding to composite on top, if any.
    pub branding: Option<Branding>,
}

/// Cumulative row window `[start, end)` revealed by a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RowRange {
    /// First revealed row (always 0 for cumulative reveal).
    pub start: usize,
    /// One past the last revealed row.
    pub end: usize,
}

impl RowRange {
    /// Number of revealed rows.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Return `true` when no rows are revealed.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Immutable description of one output frame, prior to rasterization.
#[derive(Clone, Debug)]
pub struct FrameDescriptor {
    /// 0-based position in the sequence.
    pub index: FrameIndex,
    /// Sequence length.
    pub total: u64,
    /// Revealed rows.
    pub reveal: RowRange,
    /// `(index + 1) / total`.
    pub progress: f64,
    /// Shared column mapping and style.
    pub plan: Arc<ChartPlan>,
}

impl FrameDescriptor {
    /// Everything pixels depend on besides the shared plan.
    ///
    /// Two descriptors of one sequence with equal keys rasterize identically.
    pub fn render_key(&self) -> RowRange {
        self.reveal
    }
}

/// Builds frame sequences from a dataset and an animation config.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameSequencer;

impl FrameSequencer {
    /// Validate inputs and produce a lazy, restartable frame sequence.
    ///
    /// Pure function of its arguments.
    pub fn sequence(dataset: &DatasetView, config: &AnimationConfig) -> ReelResult<FrameSequence> {
        config.validate()?;
        let (x, series) = map_columns(dataset, config)?;

        let rows = dataset.row_count();
        if rows == 0 {
            return Err(ReelError::invalid_configuration(
                "dataset has no rows to animate",
            ));
        }
        let frames = frame_count(config.speed, rows)?;

        let style = ResolvedStyle::resolve(
            config.theme,
            config.chart,
            config.branding.as_ref().and_then(|b| b.accent),
            config.palette.as_deref(),
            config.title_bar,
        );
        let temporal_extent = match x {
            XAxis::Temporal(c) => dataset.column_at(c).as_temporal().and_then(|t| {
                Some((t.iter().copied().min()?, t.iter().copied().max()?))
            }),
            _ => None,
        };
        let plan = ChartPlan {
            kind: config.chart,
            x,
            series,
            temporal_extent,
            style,
            branding: config.branding.clone(),
        };

        Ok(FrameSequence {
            plan: Arc::new(plan),
            rows,
            frames,
        })
    }
}

/// Finite, deterministic, index-addressable sequence of [`FrameDescriptor`]s.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    plan: Arc<ChartPlan>,
    rows: usize,
    frames: u64,
}

impl FrameSequence {
    /// Number of frames.
    pub fn len(&self) -> u64 {
        self.frames
    }

    /// Always `false`; sequences hold at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Rows in the source dataset.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Shared column mapping and style.
    pub fn plan(&self) -> &Arc<ChartPlan> {
        &self.plan
    }

    /// `[0, len)`.
    pub fn full_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.frames),
        }
    }

    /// Descriptor at `idx`, computed in O(1).
    pub fn descriptor(&self, idx: FrameIndex) -> ReelResult<FrameDescriptor> {
        if idx.0 >= self.frames {
            return Err(ReelError::invalid_configuration(format!(
                "frame {} is outside the sequence (len {})",
                idx.0, self.frames
            )));
        }
        Ok(self.descriptor_unchecked(idx.0))
    }

    /// Check that `range` is non-empty and lies within the sequence.
    pub fn check_range(&self, range: FrameRange) -> ReelResult<()> {
        if range.is_empty() || range.end.0 > self.frames {
            return Err(ReelError::invalid_configuration(format!(
                "frame range [{}, {}) must be non-empty and within the sequence (len {})",
                range.start.0, range.end.0, self.frames
            )));
        }
        Ok(())
    }

    /// Descriptors for `range` (e.g. `[k, n)` when resuming), generated lazily.
    pub fn range(
        &self,
        range: FrameRange,
    ) -> ReelResult<impl Iterator<Item = FrameDescriptor> + '_> {
        if range.end.0 > self.frames {
            return Err(ReelError::invalid_configuration(format!(
                "frame range end {} exceeds sequence length {}",
                range.end.0, self.frames
            )));
        }
        Ok((range.start.0..range.end.0).map(|i| self.descriptor_unchecked(i)))
    }

    /// All descriptors in order.
    pub fn iter(&self) -> impl Iterator<Item = FrameDescriptor> + '_ {
        (0..self.frames).map(|i| self.descriptor_unchecked(i))
    }

    fn descriptor_unchecked(&self, i: u64) -> FrameDescriptor {
        FrameDescriptor {
            index: FrameIndex(i),
            total: self.frames,
            reveal: RowRange {
                start: 0,
                end: reveal_end(i, self.frames, self.rows, self.plan.kind),
            },
            progress: ((i + 1) as f64) / (self.frames as f64),
            plan: self.plan.clone(),
        }
    }
}

/// Rows revealed by frame `i` of `frames`: `ceil((i + 1) * rows / frames)`, raised to the chart's
/// minimum reveal and clamped to `rows`. Non-decreasing in `i`.
fn reveal_end(i: u64, frames: u64, rows: usize, kind: ChartKind) -> usize {
    let num = u128::from(i + 1) * (rows as u128);
    let den = u128::from(frames);
    let end = num.div_ceil(den) as usize;
    end.max(kind.min_reveal_rows()).min(rows)
}

fn frame_count(speed: Speed, rows: usize) -> ReelResult<u64> {
    let n = match speed {
        Speed::FramesPerRow(rate) => {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ReelError::invalid_configuration(format!(
                    "frames_per_row must be a positive finite number, got {rate}"
                )));
            }
            let n = ((rows as f64) * rate).floor();
            if n < 1.0 {
                return Err(ReelError::invalid_configuration(format!(
                    "frames_per_row {rate} over {rows} rows yields fewer than one frame"
                )));
            }
            if n > MAX_FRAMES as f64 {
                return Err(ReelError::invalid_configuration(format!(
                    "frames_per_row {rate} over {rows} rows exceeds {MAX_FRAMES} frames"
                )));
            }
            n as u64
        }
        Speed::FrameCount(n) => {
            if n == 0 {
                return Err(ReelError::invalid_configuration(
                    "frame_count must be >= 1",
                ));
            }
            if n > MAX_FRAMES {
                return Err(ReelError::invalid_configuration(format!(
                    "frame_count {n} exceeds {MAX_FRAMES}"
                )));
            }
            n
        }
    };
    Ok(n)
}

fn map_columns(dataset: &DatasetView, config: &AnimationConfig) -> ReelResult<(XAxis, Vec<usize>)> {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();
    let mut temporal = Vec::new();

    for (pos, name) in config.columns.iter().enumerate() {
        let idx = dataset.column_index(name).ok_or_else(|| {
            ReelError::incompatible_chart(format!("unknown column '{name}'"))
        })?;
        if config.columns[..pos].contains(name) {
            return Err(ReelError::incompatible_chart(format!(
                "column '{name}' is selected more than once"
            )));
        }
        match dataset.column_at(idx).kind() {
            ColumnKind::Numeric => numeric.push(idx),
            ColumnKind::Categorical => categorical.push(idx),
            ColumnKind::Temporal => temporal.push(idx),
        }
    }

    let kind = config.chart;
    match kind {
        ChartKind::Line | ChartKind::Area | ChartKind::Scatter => {
            if !categorical.is_empty() {
                return Err(ReelError::incompatible_chart(format!(
                    "{kind:?} charts cannot plot categorical columns"
                )));
            }
            if temporal.len() > 1 {
                return Err(ReelError::incompatible_chart(format!(
                    "{kind:?} charts accept at most one temporal x column"
                )));
            }
            if numeric.is_empty() {
                return Err(ReelError::incompatible_chart(format!(
                    "{kind:?} charts need at least one numeric column"
                )));
            }
            let x = temporal.first().map_or(XAxis::Index, |&c| XAxis::Temporal(c));
            Ok((x, numeric))
        }
        ChartKind::Bar => {
            let labels: Vec<usize> = categorical.iter().chain(&temporal).copied().collect();
            if labels.len() > 1 {
                return Err(ReelError::incompatible_chart(
                    "bar charts accept at most one label column",
                ));
            }
            if numeric.is_empty() {
                return Err(ReelError::incompatible_chart(
                    "bar charts need at least one numeric column",
                ));
            }
            let x = labels.first().map_or(XAxis::Index, |&c| XAxis::Labels(c));
            Ok((x, numeric))
        }
        ChartKind::Pie => {
            if categorical.len() != 1 || numeric.len() != 1 || !temporal.is_empty() {
                return Err(ReelError::incompatible_chart(format!(
                    "pie charts need exactly one categorical and one numeric column \
                     (got {} categorical, {} numeric, {} temporal)",
                    categorical.len(),
                    numeric.len(),
                    temporal.len()
                )));
            }
            Ok((XAxis::Labels(categorical[0]), numeric))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/sequencer.rs"]
mod tests;
