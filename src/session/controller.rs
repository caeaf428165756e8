use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameRenderer, RenderedFrame};
use crate::sequence::sequencer::{FrameDescriptor, FrameSequence, RowRange};
use crate::session::assembler::{Assembler, AssemblyReport};
use crate::session::job::{JobControl, RenderJobOpts};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::mpsc;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Drives one frame range through a renderer and into a sink.
///
/// Rendering runs on a dedicated rayon pool one chunk at a time; an [`Assembler`] on a scoped
/// thread restores index order. Workers block on a bounded channel when the assembler falls
/// behind.
pub struct PipelineController<'a> {
    renderer: &'a dyn FrameRenderer,
    opts: &'a RenderJobOpts,
}

#[derive(Clone, Copy, Debug, Default)]
struct ProducerStats {
    rendered: u64,
    elided: u64,
}

impl<'a> PipelineController<'a> {
    /// Controller rendering with `renderer` under `opts`.
    pub fn new(renderer: &'a dyn FrameRenderer, opts: &'a RenderJobOpts) -> Self {
        Self { renderer, opts }
    }

    /// Render `range` of `seq` and stream it into `sink`.
    ///
    /// Cancellation through `control` stops dispatch at the next descriptor and aborts the sink.
    pub fn run(
        &self,
        seq: &FrameSequence,
        range: FrameRange,
        sink: &mut dyn FrameSink,
        cfg: SinkConfig,
        control: &JobControl,
    ) -> ReelResult<AssemblyReport> {
        seq.check_range(range)?;
        if self.renderer.canvas() != cfg.canvas() {
            let c = self.renderer.canvas();
            return Err(ReelError::invalid_configuration(format!(
                "renderer canvas {}x{} does not match sink {}x{}",
                c.width, c.height, cfg.width, cfg.height
            )));
        }

        let cap = self.opts.channel_capacity.max(1);
        let frame_bytes = cfg.canvas().frame_bytes().max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / frame_bytes).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());
        let pool = build_thread_pool(self.opts.threads)?;
        control.counters().start(range.len_frames());

        std::thread::scope(|scope| -> ReelResult<AssemblyReport> {
            let (tx, rx) = mpsc::sync_channel::<RenderedFrame>(cap);
            let assembler = Assembler::new(range, self.opts.max_failed_fraction, control);
            let enc = scope.spawn(move || assembler.run(sink, cfg, rx));

            let produce_res = self.produce(seq, range, chunk_size, &pool, &tx, control);
            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| ReelError::encoding("assembler thread panicked"))?;

            match (produce_res, enc_res) {
                (Err(ReelError::Cancelled), _) | (_, Err(ReelError::Cancelled)) => {
                    Err(ReelError::Cancelled)
                }
                (Ok(produced), Ok(mut report)) => {
                    report.stats.frames_rendered = produced.rendered;
                    report.stats.frames_elided = produced.elided;
                    Ok(report)
                }
                // Workers only fail to send after the assembler stopped; its error is the cause.
                (_, Err(e)) => Err(e),
                (Err(e), Ok(_)) => Err(e),
            }
        })
    }

    fn produce(
        &self,
        seq: &FrameSequence,
        range: FrameRange,
        chunk_size: u64,
        pool: &rayon::ThreadPool,
        tx: &mpsc::SyncSender<RenderedFrame>,
        control: &JobControl,
    ) -> ReelResult<ProducerStats> {
        let mut stats = ProducerStats::default();
        let mut chunk_start = range.start.0;
        while chunk_start < range.end.0 {
            if control.is_cancelled() {
                return Err(ReelError::Cancelled);
            }
            let chunk_end = (chunk_start + chunk_size).min(range.end.0);
            let descs: Vec<FrameDescriptor> = seq
                .range(FrameRange {
                    start: FrameIndex(chunk_start),
                    end: FrameIndex(chunk_end),
                })?
                .collect();

            if self.opts.static_frame_elision {
                let rendered = self.render_chunk_with_elision(&descs, pool, tx, control)?;
                stats.rendered += rendered;
                stats.elided += (descs.len() as u64) - rendered;
            } else {
                self.render_chunk(&descs, pool, tx, control)?;
                stats.rendered += descs.len() as u64;
            }
            tracing::debug!(start = chunk_start, end = chunk_end, "chunk dispatched");
            chunk_start = chunk_end;
        }
        Ok(stats)
    }

    fn render_chunk(
        &self,
        descs: &[FrameDescriptor],
        pool: &rayon::ThreadPool,
        tx: &mpsc::SyncSender<RenderedFrame>,
        control: &JobControl,
    ) -> ReelResult<()> {
        let renderer = self.renderer;
        pool.install(|| {
            descs
                .par_iter()
                .try_for_each_with(tx.clone(), |tx, desc| -> ReelResult<()> {
                    if control.is_cancelled() {
                        return Err(ReelError::Cancelled);
                    }
                    tx.send(renderer.render(desc)).map_err(|_| assembler_gone())
                })
        })
    }

    /// Render each distinct reveal state of the chunk once, then send every descriptor in order.
    /// Returns the number of frames actually rendered.
    fn render_chunk_with_elision(
        &self,
        descs: &[FrameDescriptor],
        pool: &rayon::ThreadPool,
        tx: &mpsc::SyncSender<RenderedFrame>,
        control: &JobControl,
    ) -> ReelResult<u64> {
        let mut uniq = Vec::<usize>::new();
        let mut map = Vec::<usize>::with_capacity(descs.len());
        let mut seen = HashMap::<RowRange, usize>::new();
        for (i, desc) in descs.iter().enumerate() {
            let u = *seen.entry(desc.render_key()).or_insert_with(|| {
                uniq.push(i);
                uniq.len() - 1
            });
            map.push(u);
        }

        let renderer = self.renderer;
        let rendered: Vec<Option<RenderedFrame>> = pool.install(|| {
            uniq.par_iter()
                .map(|&i| (!control.is_cancelled()).then(|| renderer.render(&descs[i])))
                .collect()
        });
        let rendered = rendered
            .into_iter()
            .map(|r| r.ok_or(ReelError::Cancelled))
            .collect::<ReelResult<Vec<_>>>()?;

        for (i, desc) in descs.iter().enumerate() {
            let u = map[i];
            let mut frame = rendered[u].reuse_for(desc.index);
            if uniq[u] == i {
                frame.render_time = rendered[u].render_time;
            }
            tx.send(frame).map_err(|_| assembler_gone())?;
        }
        Ok(uniq.len() as u64)
    }
}

fn assembler_gone() -> ReelError {
    ReelError::encoding("assembler is not accepting frames")
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::invalid_configuration(
            "'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("chartreel-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        ReelError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
