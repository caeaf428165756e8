use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameRGBA, RenderedFrame};
use crate::session::job::{JobControl, JobState, RenderStats};
use std::collections::HashMap;
use std::sync::Arc;

/// What the assembler delivered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Frame totals; `frames_rendered`/`frames_elided` are filled in by the controller.
    pub stats: RenderStats,
    /// Indices of failed frames replaced by a placeholder, increasing.
    pub substituted: Vec<u64>,
    /// Frames delivered without the logo.
    pub branding_failures: u64,
    /// First branding failure message.
    pub branding_message: Option<String>,
}

/// Serialization point between render workers and a [`FrameSink`].
///
/// Accepts [`RenderedFrame`]s in any order, restores index order, substitutes failed frames and
/// pushes exactly one image per index of `range` into the sink. A failed frame shows the nearest
/// earlier success; failures before the first success show that first success. The job fails
/// once `failed / total` exceeds `max_failed_fraction`.
pub struct Assembler<'a> {
    range: FrameRange,
    max_failed_fraction: f64,
    control: &'a JobControl,
}

impl<'a> Assembler<'a> {
    /// Assembler for the frames of `range`.
    pub fn new(range: FrameRange, max_failed_fraction: f64, control: &'a JobControl) -> Self {
        Self {
            range,
            max_failed_fraction,
            control,
        }
    }

    /// Drive `sink` from `frames` until every index of the range was pushed, then commit.
    ///
    /// On any error, including cancellation, the sink is aborted and nothing is committed.
    pub fn run<I>(
        &self,
        sink: &mut dyn FrameSink,
        cfg: SinkConfig,
        frames: I,
    ) -> ReelResult<AssemblyReport>
    where
        I: IntoIterator<Item = RenderedFrame>,
    {
        let res = self.drive(sink, cfg, frames.into_iter());
        if res.is_err() {
            sink.abort();
        }
        res
    }

    fn drive(
        &self,
        sink: &mut dyn FrameSink,
        cfg: SinkConfig,
        mut frames: impl Iterator<Item = RenderedFrame>,
    ) -> ReelResult<AssemblyReport> {
        sink.begin(cfg)?;

        let mut out = Output {
            sink,
            control: self.control,
            last_good: None,
            leading: Vec::new(),
            failed: 0,
            total: self.range.len_frames(),
            report: AssemblyReport::default(),
        };
        let mut next = self.range.start.0;
        let mut pending = HashMap::<u64, RenderedFrame>::new();
        while next < self.range.end.0 {
            let frame = match pending.remove(&next) {
                Some(frame) => frame,
                None => {
                    let Some(frame) = frames.next() else {
                        if self.control.is_cancelled() {
                            return Err(ReelError::Cancelled);
                        }
                        return Err(ReelError::encoding(format!(
                            "frame stream ended before frame {next}"
                        )));
                    };
                    let i = frame.index.0;
                    if !self.range.contains(frame.index) || i < next || pending.contains_key(&i) {
                        return Err(ReelError::encoding(format!(
                            "unexpected or duplicate frame {i}"
                        )));
                    }
                    if i != next {
                        pending.insert(i, frame);
                        continue;
                    }
                    frame
                }
            };
            if self.control.is_cancelled() {
                return Err(ReelError::Cancelled);
            }
            out.accept(frame, self.max_failed_fraction)?;
            next += 1;
        }

        if !out.leading.is_empty() {
            return Err(ReelError::frame_render(
                self.range.start.0,
                "no frame in the range rendered successfully",
            ));
        }
        if self.control.is_cancelled() {
            return Err(ReelError::Cancelled);
        }
        self.control.transition(JobState::Assembling);
        tracing::debug!(frames = out.total, "finalizing output");
        out.sink.end()?;

        let mut report = out.report;
        report.stats.frames_total = out.total;
        report.stats.frames_substituted = report.substituted.len() as u64;
        Ok(report)
    }
}

struct Output<'s, 'c> {
    sink: &'s mut dyn FrameSink,
    control: &'c JobControl,
    last_good: Option<Arc<FrameRGBA>>,
    leading: Vec<u64>,
    failed: u64,
    total: u64,
    report: AssemblyReport,
}

impl Output<'_, '_> {
    fn accept(&mut self, frame: RenderedFrame, max_failed_fraction: f64) -> ReelResult<()> {
        let idx = frame.index;
        if let Some(w) = frame.branding_warning {
            self.report.branding_failures += 1;
            self.report.branding_message.get_or_insert_with(|| w.to_string());
        }

        match frame.status {
            Ok(image) => {
                for lead in std::mem::take(&mut self.leading) {
                    self.push(FrameIndex(lead), &image)?;
                }
                self.push(idx, &image)?;
                self.last_good = Some(image);
            }
            Err(err) => {
                self.failed += 1;
                if (self.failed as f64) / (self.total as f64) > max_failed_fraction {
                    return Err(threshold_exceeded(
                        err,
                        self.failed,
                        self.total,
                        max_failed_fraction,
                    ));
                }
                tracing::warn!(frame = idx.0, error = %err, "substituting placeholder for failed frame");
                self.report.substituted.push(idx.0);
                match self.last_good.clone() {
                    Some(image) => self.push(idx, &image)?,
                    None => self.leading.push(idx.0),
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, idx: FrameIndex, image: &FrameRGBA) -> ReelResult<()> {
        self.sink.push_frame(idx, image)?;
        self.control.counters().advance();
        Ok(())
    }
}

fn threshold_exceeded(err: ReelError, failed: u64, total: u64, limit: f64) -> ReelError {
    match err {
        ReelError::FrameRenderFailure { index, reason } => ReelError::frame_render(
            index,
            format!(
                "{reason} ({failed} of {total} frames failed, above the {}% limit)",
                limit * 100.0
            ),
        ),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/assembler.rs"]
mod tests;
