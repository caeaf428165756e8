use super::*;
use crate::data::dataset::Column;
use crate::foundation::core::FrameIndex;
use crate::scene::config::{AnimationConfig, Branding, ChartKind, Placement, Speed};
use crate::sequence::sequencer::{FrameSequence, FrameSequencer};

fn dataset() -> DatasetView {
    DatasetView::new(vec![
        Column::categorical("region", ["n", "s", "e", "w", "n", "s"]),
        Column::numeric("sales", vec![1.0, 4.0, 2.0, 8.0, 5.0, 7.0]),
        Column::numeric("cost", vec![2.0, 2.5, 3.0, 1.0, 6.0, 4.0]),
    ])
    .unwrap()
}

fn sequence(ds: &DatasetView, kind: ChartKind, cols: &[&str]) -> FrameSequence {
    FrameSequencer::sequence(ds, &AnimationConfig::new(kind, cols, Speed::FramesPerRow(1.0)))
        .unwrap()
}

fn canvas() -> Canvas {
    Canvas::new(160, 120).unwrap()
}

#[test]
fn every_chart_kind_renders_at_canvas_size() {
    let ds = dataset();
    let r = CpuChartRenderer::new(ds.clone(), canvas());
    for (kind, cols) in [
        (ChartKind::Line, &["sales", "cost"][..]),
        (ChartKind::Area, &["sales"][..]),
        (ChartKind::Scatter, &["cost"][..]),
        (ChartKind::Bar, &["region", "sales", "cost"][..]),
        (ChartKind::Pie, &["region", "sales"][..]),
    ] {
        let seq = sequence(&ds, kind, cols);
        let desc = seq.descriptor(FrameIndex(seq.len() - 1)).unwrap();
        let out = r.render(&desc);
        let frame = out.status.unwrap_or_else(|e| panic!("{kind:?}: {e}"));
        assert_eq!((frame.width, frame.height), (160, 120));
        assert_eq!(frame.data.len(), 160 * 120 * 4);
        assert!(out.branding_warning.is_none());
    }
}

#[test]
fn rendering_is_byte_identical_across_calls() {
    let ds = dataset();
    let seq = sequence(&ds, ChartKind::Line, &["sales", "cost"]);
    let r = CpuChartRenderer::new(ds.clone(), canvas());
    let d = seq.descriptor(FrameIndex(3)).unwrap();
    let a = r.render(&d).status.unwrap();
    let b = r.render(&d).status.unwrap();
    assert_eq!(a.data, b.data);

    let later = r.render(&seq.descriptor(FrameIndex(5)).unwrap()).status.unwrap();
    assert_ne!(a.data, later.data, "revealing more rows changes the image");
}

#[test]
fn corner_pixel_is_theme_background() {
    let ds = dataset();
    let seq = sequence(&ds, ChartKind::Bar, &["sales"]);
    let d = seq.descriptor(FrameIndex(0)).unwrap();
    let frame = CpuChartRenderer::new(ds, canvas()).render(&d).status.unwrap();
    let bg = d.plan.style.background.to_premul().to_array();
    assert_eq!(frame.pixel(0, 0), Some(bg));
}

#[test]
fn degenerate_data_reports_the_failing_index() {
    let ds = DatasetView::new(vec![Column::numeric("v", vec![2.0, 2.0, 2.0, 5.0])]).unwrap();
    let seq = sequence(&ds, ChartKind::Line, &["v"]);
    let r = CpuChartRenderer::new(ds, canvas());

    let out = r.render(&seq.descriptor(FrameIndex(1)).unwrap());
    assert_eq!(out.index, FrameIndex(1));
    match out.status {
        Err(ReelError::FrameRenderFailure { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected render failure, got {other:?}"),
    }
    assert!(r.render(&seq.descriptor(FrameIndex(3)).unwrap()).is_ok());
}

#[test]
fn oversized_canvas_is_a_render_failure() {
    let ds = dataset();
    let seq = sequence(&ds, ChartKind::Line, &["sales"]);
    let r = CpuChartRenderer::new(
        ds,
        Canvas {
            width: 70_000,
            height: 2,
        },
    );
    let out = r.render(&seq.descriptor(FrameIndex(0)).unwrap());
    assert!(matches!(
        out.status,
        Err(ReelError::FrameRenderFailure { index: 0, .. })
    ));
}

#[test]
fn misplaced_logo_degrades_to_unbranded_frame() {
    let dir = std::env::temp_dir().join(format!("chartreel_cpu_logo_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("logo.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();
    let branding = Branding {
        logo: Some(path),
        placement: Placement::Offset { x: 150, y: 0 },
        ..Branding::default()
    };
    let logo = LogoOverlay::prepare(&branding, canvas()).unwrap();

    let ds = dataset();
    let seq = sequence(&ds, ChartKind::Scatter, &["sales"]);
    let d = seq.descriptor(FrameIndex(2)).unwrap();
    let plain = CpuChartRenderer::new(ds.clone(), canvas()).render(&d);
    let branded = CpuChartRenderer::new(ds, canvas()).with_logo(logo).render(&d);

    assert!(matches!(
        branded.branding_warning,
        Some(ReelError::BrandingApplyFailure(_))
    ));
    assert_eq!(plain.status.unwrap().data, branded.status.unwrap().data);
}
