use crate::data::dataset::DatasetView;
use crate::foundation::core::{Canvas, Color};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::{FrameRGBA, FrameRenderer, RenderedFrame};
use crate::render::branding::LogoOverlay;
use crate::render::chart::build_scene;
use crate::sequence::sequencer::FrameDescriptor;
use std::sync::Arc;
use std::time::Instant;

/// CPU chart rasterizer powered by `vello_cpu`.
///
/// Holds only immutable job inputs; every call builds its own render context.
#[derive(Clone, Debug)]
pub struct CpuChartRenderer {
    dataset: DatasetView,
    canvas: Canvas,
    logo: Option<Arc<LogoOverlay>>,
}

impl CpuChartRenderer {
    /// Renderer for `dataset` at `canvas` size, without branding.
    pub fn new(dataset: DatasetView, canvas: Canvas) -> Self {
        Self {
            dataset,
            canvas,
            logo: None,
        }
    }

    /// Composite `logo` on top of every chart.
    pub fn with_logo(mut self, logo: Option<LogoOverlay>) -> Self {
        self.logo = logo.map(Arc::new);
        self
    }

    fn rasterize(&self, desc: &FrameDescriptor) -> ReelResult<FrameRGBA> {
        let idx = desc.index.0;
        let too_large = |what: &str, v: u32| {
            ReelError::frame_render(
                idx,
                format!("canvas {what} {v} exceeds the rasterizer limit {}", u16::MAX),
            )
        };
        let width: u16 = self
            .canvas
            .width
            .try_into()
            .map_err(|_| too_large("width", self.canvas.width))?;
        let height: u16 = self
            .canvas
            .height
            .try_into()
            .map_err(|_| too_large("height", self.canvas.height))?;

        let fills = build_scene(&self.dataset, desc, self.canvas)
            .map_err(|reason| ReelError::frame_render(idx, reason))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_paint(color_to_cpu(desc.plan.style.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        for fill in &fills {
            ctx.set_paint(color_to_cpu(fill.color));
            ctx.fill_path(&bezpath_to_cpu(&fill.path));
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

impl FrameRenderer for CpuChartRenderer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn render(&self, desc: &FrameDescriptor) -> RenderedFrame {
        let started = Instant::now();
        let mut branding_warning = None;
        let status = self.rasterize(desc).map(|mut frame| {
            if let Some(logo) = self.logo.as_deref()
                && let Err(e) = logo.apply(&mut frame)
            {
                tracing::warn!(frame = desc.index.0, error = %e, "rendering frame without branding");
                branding_warning = Some(e);
            }
            Arc::new(frame)
        });
        RenderedFrame {
            index: desc.index,
            status,
            render_time: started.elapsed(),
            branding_warning,
        }
    }
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
