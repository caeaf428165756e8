use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::over_premul;
use crate::render::backend::FrameRGBA;
use crate::scene::config::{Branding, Placement};
use anyhow::Context;
use image::imageops::FilterType;
use std::sync::Arc;

/// Logo decoded and scaled once per job, positioned for one canvas size.
#[derive(Clone, Debug)]
pub struct LogoOverlay {
    width: u32,
    height: u32,
    x: i64,
    y: i64,
    rgba8_premul: Arc<Vec<u8>>,
}

impl LogoOverlay {
    /// Decode and scale the configured logo for `canvas`.
    ///
    /// Returns `Ok(None)` when no logo is configured and [`ReelError::BrandingApplyFailure`] when
    /// the file cannot be read or decoded.
    pub fn prepare(branding: &Branding, canvas: Canvas) -> ReelResult<Option<Self>> {
        let Some(path) = branding.logo.as_ref() else {
            return Ok(None);
        };
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::branding(format!("read logo '{}': {e}", path.display()))
        })?;
        let target_w = ((f64::from(canvas.width) * branding.scale).round() as u32).max(1);
        let mut overlay = Self::from_encoded(&bytes, target_w)
            .map_err(|e| ReelError::branding(format!("logo '{}': {e:#}", path.display())))?;
        (overlay.x, overlay.y) = anchor(
            branding.placement,
            i64::from(branding.margin_px),
            canvas,
            overlay.width,
            overlay.height,
        );
        Ok(Some(overlay))
    }

    fn from_encoded(bytes: &[u8], target_w: u32) -> anyhow::Result<Self> {
        let img = image::load_from_memory(bytes)
            .context("decode logo image")?
            .to_rgba8();
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            anyhow::bail!("logo image is empty");
        }
        let target_h =
            ((f64::from(h) * f64::from(target_w) / f64::from(w)).round() as u32).max(1);
        let scaled = image::imageops::resize(&img, target_w, target_h, FilterType::Triangle);

        let mut rgba8_premul = scaled.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(Self {
            width: target_w,
            height: target_h,
            x: 0,
            y: 0,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Scaled logo size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Top-left position on the canvas (may be negative for offset placements).
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    /// Composite the logo onto `frame` with premultiplied source-over.
    ///
    /// A logo rectangle not fully inside the frame is a [`ReelError::BrandingApplyFailure`] and
    /// leaves `frame` untouched.
    pub fn apply(&self, frame: &mut FrameRGBA) -> ReelResult<()> {
        let fw = i64::from(frame.width);
        let fh = i64::from(frame.height);
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        if self.x < 0 || self.y < 0 || self.x + w > fw || self.y + h > fh {
            return Err(ReelError::branding(format!(
                "logo rectangle {w}x{h} at ({}, {}) lies outside the {fw}x{fh} canvas",
                self.x, self.y
            )));
        }

        let row_bytes = (self.width as usize) * 4;
        let (x, y) = (self.x as usize, self.y as usize);
        for (row, src) in self.rgba8_premul.chunks_exact(row_bytes).enumerate() {
            let start = ((y + row) * (frame.width as usize) + x) * 4;
            let dst = &mut frame.data[start..start + row_bytes];
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                over_premul(d, s);
            }
        }
        Ok(())
    }
}

fn anchor(placement: Placement, margin: i64, canvas: Canvas, w: u32, h: u32) -> (i64, i64) {
    let cw = i64::from(canvas.width);
    let ch = i64::from(canvas.height);
    let (w, h) = (i64::from(w), i64::from(h));
    match placement {
        Placement::TopLeft => (margin, margin),
        Placement::TopRight => (cw - w - margin, margin),
        Placement::BottomLeft => (margin, ch - h - margin),
        Placement::BottomRight => (cw - w - margin, ch - h - margin),
        Placement::Center => ((cw - w) / 2, (ch - h) / 2),
        Placement::Offset { x, y } => (x, y),
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/branding.rs"]
mod tests;
