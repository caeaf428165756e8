use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::ReelError;
use crate::sequence::sequencer::FrameDescriptor;
use std::sync::Arc;
use std::time::Duration;

/// A rendered frame as premultiplied RGBA8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Frame filled with one premultiplied RGBA8 value.
    pub fn filled(width: u32, height: u32, rgba_premul: [u8; 4]) -> Self {
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&rgba_premul);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Premultiplied RGBA8 pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Outcome of rasterizing one descriptor.
#[derive(Debug)]
pub struct RenderedFrame {
    /// Index of the descriptor this frame was produced from.
    pub index: FrameIndex,
    /// The image, or a [`ReelError::FrameRenderFailure`] naming the descriptor.
    pub status: Result<Arc<FrameRGBA>, ReelError>,
    /// Wall time spent rendering (diagnostics only).
    pub render_time: Duration,
    /// Set when the branding overlay was skipped for this frame.
    pub branding_warning: Option<ReelError>,
}

impl RenderedFrame {
    /// Return `true` when the frame carries an image.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// The same result re-labelled for descriptor `index` (shares the image buffer).
    pub(crate) fn reuse_for(&self, index: FrameIndex) -> RenderedFrame {
        let status = match &self.status {
            Ok(frame) => Ok(Arc::clone(frame)),
            Err(ReelError::FrameRenderFailure { reason, .. }) => {
                Err(ReelError::frame_render(index.0, reason.clone()))
            }
            Err(e) => Err(ReelError::frame_render(index.0, e.to_string())),
        };
        RenderedFrame {
            index,
            status,
            render_time: Duration::ZERO,
            branding_warning: self
                .branding_warning
                .as_ref()
                .map(|w| ReelError::branding(w.to_string())),
        }
    }
}

/// Renderer contract: one descriptor in, one [`RenderedFrame`] out.
///
/// Implementations hold no mutable state and may be called concurrently for different
/// descriptors. Identical descriptors must produce byte-identical images.
pub trait FrameRenderer: Send + Sync {
    /// Output canvas size.
    fn canvas(&self) -> Canvas;

    /// Rasterize `desc`. Failures are reported in [`RenderedFrame::status`], never panics.
    fn render(&self, desc: &FrameDescriptor) -> RenderedFrame;
}
