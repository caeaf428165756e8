use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::tmp::{TempFileGuard, unique_temp_path};
use crate::render::backend::FrameRGBA;
use std::path::{Path, PathBuf};

/// Write one frame as a straight-alpha PNG.
///
/// The image is encoded to a temp file beside `path` and renamed into place, so a reader never
/// observes a partial PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> ReelResult<()> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(ReelError::encoding(format!(
            "frame data is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    crate::encode::ffmpeg::ensure_parent_dir(path)?;

    let straight = unpremultiply(&frame.data);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = TempFileGuard::new(unique_temp_path(dir, ".chartreel_partial", "png"));
    let tmp_path = tmp
        .path()
        .ok_or_else(|| ReelError::encoding("png temp path missing"))?;

    image::save_buffer_with_format(
        tmp_path,
        &straight,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| ReelError::encoding(format!("failed to encode png '{}': {e}", path.display())))?;
    std::fs::rename(tmp_path, path).map_err(|e| {
        ReelError::encoding(format!("failed to move png into '{}': {e}", path.display()))
    })?;
    tmp.release();
    Ok(())
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len());
    for px in premul.chunks_exact(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            out.push(((u32::from(c) * 255 + a / 2) / a).min(255) as u8);
        }
        out.push(px[3]);
    }
    out
}

/// Sink writing `frame_00000.png`, `frame_00001.png`, ... into a directory.
///
/// Files are named by position in the pushed sequence, starting at zero. `abort` removes every
/// file written so far.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            ReelError::encoding(format!(
                "failed to create frame directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written.clear();
        self.last_idx = None;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoding("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encoding(
                "png sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(idx);

        let path = self
            .dir
            .join(format!("frame_{:05}.png", self.written.len()));
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if self.cfg.take().is_none() {
            return Err(ReelError::encoding("png sink not started"));
        }
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        self.cfg = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
