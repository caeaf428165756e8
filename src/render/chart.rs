//! Chart layout and geometry.
//!
//! Turns a descriptor into a flat list of filled paths in canvas pixel space; the rasterizer only
//! has to paint them in order. Strokes are expanded to fills here with `kurbo::stroke`.

use crate::data::dataset::DatasetView;
use crate::foundation::core::{Canvas, Color};
use crate::scene::config::ChartKind;
use crate::scene::theme::ResolvedStyle;
use crate::sequence::sequencer::{ChartPlan, FrameDescriptor, RowRange, XAxis};
use kurbo::{BezPath, Cap, Circle, CircleSegment, Join, Point, Rect, Shape, Stroke, StrokeOpts};
use std::f64::consts::{FRAC_PI_2, TAU};

const TOLERANCE: f64 = 0.1;
/// Geometry constants are authored for a 480 px tall canvas and scaled from there.
const REFERENCE_HEIGHT: f64 = 480.0;
const GRID_DIVISIONS: usize = 4;
const MAX_LEGEND_ENTRIES: usize = 12;

/// One solid-color fill, painted in list order.
#[derive(Clone, Debug)]
pub(crate) struct Fill {
    pub(crate) path: BezPath,
    pub(crate) color: Color,
}

/// Canvas partition derived from the canvas size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Layout {
    pub(crate) plot: Rect,
    pub(crate) title_bar: Option<Rect>,
    /// Pixels per reference pixel.
    pub(crate) unit: f64,
}

impl Layout {
    pub(crate) fn new(canvas: Canvas, title_bar: bool) -> Result<Self, String> {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let unit = h / REFERENCE_HEIGHT;

        let bar = title_bar.then(|| Rect::new(0.0, 0.0, w, 36.0 * unit));
        let top = match bar {
            Some(r) => r.y1 + 20.0 * unit,
            None => 24.0 * unit,
        };
        let plot = Rect::new(56.0 * unit, top, w - 32.0 * unit, h - 40.0 * unit);
        if plot.width() <= 1.0 || plot.height() <= 1.0 {
            return Err(format!(
                "canvas {}x{} is too small for the chart layout",
                canvas.width, canvas.height
            ));
        }
        Ok(Self {
            plot,
            title_bar: bar,
            unit,
        })
    }
}

/// Build the fills for one frame (background excluded).
pub(crate) fn build_scene(
    dataset: &DatasetView,
    desc: &FrameDescriptor,
    canvas: Canvas,
) -> Result<Vec<Fill>, String> {
    let plan = &desc.plan;
    let style = &plan.style;
    let layout = Layout::new(canvas, style.title_bar)?;

    let mut fills = Vec::new();
    if let Some(bar) = layout.title_bar {
        fills.push(Fill {
            path: bar.to_path(TOLERANCE),
            color: style.accent,
        });
    }

    match plan.kind {
        ChartKind::Pie => {
            let XAxis::Labels(label_col) = plan.x else {
                return Err("pie chart has no label column".to_owned());
            };
            let labels = dataset.column_at(label_col).as_categorical().ok_or_else(|| {
                format!("column '{}' is not categorical", dataset.column_at(label_col).name())
            })?;
            let series = numeric_series(dataset, &plan.series)?;
            let &(_, values) = series
                .first()
                .ok_or_else(|| "pie chart has no value column".to_owned())?;
            draw_pie(&mut fills, &layout, style, labels, values, desc.reveal)?;
        }
        kind => {
            let series = numeric_series(dataset, &plan.series)?;
            let frame = Cartesian::new(dataset, &layout, plan, &series, desc.reveal)?;
            frame.draw_grid(&mut fills, style);
            for (i, (_, values)) in series.iter().enumerate() {
                let color = style.series_color(i).with_opacity(style.chart.opacity);
                match kind {
                    ChartKind::Line => frame.draw_line(&mut fills, style, values, color),
                    ChartKind::Area => frame.draw_area(&mut fills, style, values, color),
                    ChartKind::Scatter => frame.draw_scatter(&mut fills, style, values, color),
                    ChartKind::Bar => {
                        frame.draw_bars(&mut fills, style, values, i, series.len(), color)
                    }
                    ChartKind::Pie => {}
                }
            }
            frame.draw_axes(&mut fills, style);
            draw_legend(&mut fills, &layout, (0..series.len()).map(|i| style.series_color(i)));
        }
    }

    Ok(fills)
}

fn numeric_series<'a>(
    dataset: &'a DatasetView,
    cols: &[usize],
) -> Result<Vec<(&'a str, &'a [f64])>, String> {
    cols.iter()
        .map(|&c| {
            let col = dataset.column_at(c);
            col.as_numeric()
                .map(|v| (col.name(), v))
                .ok_or_else(|| format!("column '{}' is not numeric", col.name()))
        })
        .collect()
}

enum XScale<'a> {
    /// Evenly spaced points over all rows.
    Index { rows: usize },
    /// Points placed by timestamp over the full temporal extent.
    Temporal { values: &'a [i64], min: i64, span: f64 },
    /// One category slot per row (bars).
    Slots { rows: usize },
}

/// Distance between two timestamps; exact for the whole `i64` domain.
fn time_delta(from: i64, to: i64) -> f64 {
    (i128::from(to) - i128::from(from)) as f64
}

struct Cartesian<'a> {
    layout: &'a Layout,
    x: XScale<'a>,
    lo: f64,
    hi: f64,
    reveal: RowRange,
}

impl<'a> Cartesian<'a> {
    fn new(
        dataset: &'a DatasetView,
        layout: &'a Layout,
        plan: &ChartPlan,
        series: &[(&str, &[f64])],
        reveal: RowRange,
    ) -> Result<Self, String> {
        let rows = dataset.row_count();
        let kind = plan.kind;
        let x = match (kind, plan.x) {
            (ChartKind::Bar, _) => XScale::Slots { rows },
            (_, XAxis::Temporal(c)) => {
                let col = dataset.column_at(c);
                let values = col
                    .as_temporal()
                    .ok_or_else(|| format!("column '{}' is not temporal", col.name()))?;
                let (min, max) = plan
                    .temporal_extent
                    .ok_or_else(|| format!("column '{}' has no temporal extent", col.name()))?;
                if rows > 1 && min == max {
                    return Err(format!(
                        "zero-variance temporal axis (every row of '{}' is {min})",
                        col.name()
                    ));
                }
                XScale::Temporal {
                    values,
                    min,
                    span: time_delta(min, max),
                }
            }
            _ => XScale::Index { rows },
        };

        // Missing values are gaps and do not take part in scaling.
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (_, values) in series {
            for &v in values[reveal.start..reveal.end].iter().filter(|v| v.is_finite()) {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if lo > hi {
            return Err(format!(
                "no finite values over rows [{}, {})",
                reveal.start, reveal.end
            ));
        }
        if matches!(kind, ChartKind::Bar | ChartKind::Area) {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if !(hi - lo).is_finite() || hi - lo <= 0.0 {
            return Err(format!(
                "zero-variance value axis over rows [{}, {})",
                reveal.start, reveal.end
            ));
        }
        let pad = (hi - lo) * 0.05;

        Ok(Self {
            layout,
            x,
            lo: lo - pad,
            hi: hi + pad,
            reveal,
        })
    }

    fn x_at(&self, row: usize) -> f64 {
        let p = self.layout.plot;
        match &self.x {
            XScale::Index { rows } if *rows <= 1 => p.center().x,
            XScale::Index { rows } => p.x0 + (row as f64) / ((rows - 1) as f64) * p.width(),
            XScale::Temporal { values, span, .. } if *span <= 0.0 || values.len() <= 1 => {
                p.center().x
            }
            XScale::Temporal { values, min, span } => {
                p.x0 + time_delta(*min, values[row]) / *span * p.width()
            }
            XScale::Slots { rows } => p.x0 + ((row as f64) + 0.5) * self.slot_width(*rows),
        }
    }

    fn slot_width(&self, rows: usize) -> f64 {
        self.layout.plot.width() / (rows.max(1) as f64)
    }

    fn y_at(&self, v: f64) -> f64 {
        let p = self.layout.plot;
        p.y1 - (v - self.lo) / (self.hi - self.lo) * p.height()
    }

    fn baseline(&self) -> f64 {
        self.y_at(0.0_f64.clamp(self.lo, self.hi))
    }

    fn point(&self, values: &[f64], row: usize) -> Option<Point> {
        let v = values[row];
        v.is_finite().then(|| Point::new(self.x_at(row), self.y_at(v)))
    }

    /// Revealed points split into runs of consecutive finite values.
    fn segments(&self, values: &[f64]) -> Vec<Vec<Point>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for r in self.reveal.start..self.reveal.end {
            match self.point(values, r) {
                Some(pt) => current.push(pt),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn draw_grid(&self, fills: &mut Vec<Fill>, style: &ResolvedStyle) {
        let p = self.layout.plot;
        let half = 0.5 * self.layout.unit;
        for i in 0..=GRID_DIVISIONS {
            let t = (i as f64) / (GRID_DIVISIONS as f64);
            let y = p.y0 + t * p.height();
            let x = p.x0 + t * p.width();
            fills.push(Fill {
                path: Rect::new(p.x0, y - half, p.x1, y + half).to_path(TOLERANCE),
                color: style.grid,
            });
            fills.push(Fill {
                path: Rect::new(x - half, p.y0, x + half, p.y1).to_path(TOLERANCE),
                color: style.grid,
            });
        }
    }

    fn draw_axes(&self, fills: &mut Vec<Fill>, style: &ResolvedStyle) {
        let p = self.layout.plot;
        let w = 1.5 * self.layout.unit;
        fills.push(Fill {
            path: Rect::new(p.x0 - w, p.y0, p.x0, p.y1 + w).to_path(TOLERANCE),
            color: style.axis,
        });
        fills.push(Fill {
            path: Rect::new(p.x0 - w, p.y1, p.x1, p.y1 + w).to_path(TOLERANCE),
            color: style.axis,
        });
    }

    fn draw_line(&self, fills: &mut Vec<Fill>, style: &ResolvedStyle, values: &[f64], color: Color) {
        let runs = self.segments(values);
        for pts in runs.iter().filter(|pts| pts.len() > 1) {
            fills.push(Fill {
                path: stroke_polyline(pts, style.chart.line_width * self.layout.unit),
                color,
            });
        }
        // Marker on the leading point.
        if let Some(&head) = runs.last().and_then(|pts| pts.last()) {
            let r = 0.5 * style.chart.marker_size * self.layout.unit;
            fills.push(Fill {
                path: Circle::new(head, r).to_path(TOLERANCE),
                color,
            });
        }
    }

    fn draw_area(&self, fills: &mut Vec<Fill>, style: &ResolvedStyle, values: &[f64], color: Color) {
        let base = self.baseline();
        for pts in self.segments(values) {
            let (Some(&first), Some(&last)) = (pts.first(), pts.last()) else {
                continue;
            };
            let mut area = BezPath::new();
            area.move_to((first.x, base));
            for &pt in &pts {
                area.line_to(pt);
            }
            area.line_to((last.x, base));
            area.close_path();
            fills.push(Fill { path: area, color });

            if pts.len() > 1 {
                fills.push(Fill {
                    path: stroke_polyline(&pts, style.chart.line_width * self.layout.unit),
                    color: Color { a: 255, ..color },
                });
            }
        }
    }

    fn draw_scatter(
        &self,
        fills: &mut Vec<Fill>,
        style: &ResolvedStyle,
        values: &[f64],
        color: Color,
    ) {
        let r = 0.5 * style.chart.marker_size * self.layout.unit;
        for pt in (self.reveal.start..self.reveal.end).filter_map(|r| self.point(values, r)) {
            fills.push(Fill {
                path: Circle::new(pt, r).to_path(TOLERANCE),
                color,
            });
        }
    }

    fn draw_bars(
        &self,
        fills: &mut Vec<Fill>,
        style: &ResolvedStyle,
        values: &[f64],
        series_idx: usize,
        series_count: usize,
        color: Color,
    ) {
        let XScale::Slots { rows } = self.x else {
            return;
        };
        let group = self.slot_width(rows) * style.chart.bar_width;
        let bar = group / (series_count.max(1) as f64);
        let base = self.baseline();
        for r in (self.reveal.start..self.reveal.end).filter(|&r| values[r].is_finite()) {
            let left = self.x_at(r) - 0.5 * group + (series_idx as f64) * bar;
            let top = self.y_at(values[r]);
            fills.push(Fill {
                path: Rect::new(left, top.min(base), left + bar, top.max(base)).to_path(TOLERANCE),
                color,
            });
        }
    }
}

fn stroke_polyline(pts: &[Point], width: f64) -> BezPath {
    let mut line = BezPath::new();
    for (i, &pt) in pts.iter().enumerate() {
        if i == 0 {
            line.move_to(pt);
        } else {
            line.line_to(pt);
        }
    }
    let style = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
    kurbo::stroke(line.iter(), &style, &StrokeOpts::default(), TOLERANCE)
}

/// Per-category totals over the revealed rows, in first-appearance order.
pub(crate) fn pie_slices<'a>(
    labels: &'a [String],
    values: &'a [f64],
    reveal: RowRange,
) -> Vec<(&'a str, f64)> {
    let mut slices: Vec<(&str, f64)> = Vec::new();
    for r in reveal.start..reveal.end {
        // Missing and negative shares cannot be drawn; they count as zero.
        let v = if values[r].is_finite() { values[r].max(0.0) } else { 0.0 };
        match slices.iter_mut().find(|(l, _)| *l == labels[r]) {
            Some((_, total)) => *total += v,
            None => slices.push((&labels[r], v)),
        }
    }
    slices
}

fn draw_pie(
    fills: &mut Vec<Fill>,
    layout: &Layout,
    style: &ResolvedStyle,
    labels: &[String],
    values: &[f64],
    reveal: RowRange,
) -> Result<(), String> {
    let slices = pie_slices(labels, values, reveal);
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return Err(format!(
            "pie total over rows [{}, {}) is not positive",
            reveal.start, reveal.end
        ));
    }

    let center = layout.plot.center();
    let radius = 0.42 * layout.plot.width().min(layout.plot.height());
    let mut start = -FRAC_PI_2;
    for (i, (_, v)) in slices.iter().enumerate() {
        let sweep = TAU * v / total;
        if sweep <= 0.0 {
            continue;
        }
        let color = style.series_color(i).with_opacity(style.chart.opacity);
        let path = if sweep >= TAU - 1e-9 {
            Circle::new(center, radius).to_path(TOLERANCE)
        } else {
            CircleSegment::new(center, radius, 0.0, start, sweep).to_path(TOLERANCE)
        };
        fills.push(Fill { path, color });
        start += sweep;
    }

    draw_legend(fills, layout, (0..slices.len()).map(|i| style.series_color(i)));
    Ok(())
}

fn draw_legend(fills: &mut Vec<Fill>, layout: &Layout, colors: impl Iterator<Item = Color>) {
    let u = layout.unit;
    let size = 10.0 * u;
    let x1 = layout.plot.x1 - 8.0 * u;
    for (i, color) in colors.take(MAX_LEGEND_ENTRIES).enumerate() {
        let y0 = layout.plot.y0 + 8.0 * u + (i as f64) * (size + 6.0 * u);
        if y0 + size > layout.plot.y1 {
            break;
        }
        fills.push(Fill {
            path: Rect::new(x1 - size, y0, x1, y0 + size).to_path(TOLERANCE),
            color,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/chart.rs"]
mod tests;
