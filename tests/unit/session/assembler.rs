use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Fps;
use crate::scene::quality::QualityPreset;
use std::time::Duration;

fn cfg(frames: u64) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::integer(15),
        frame_count: frames,
        quality: QualityPreset::Low,
        audio: None,
    }
}

fn ok(i: u64) -> RenderedFrame {
    RenderedFrame {
        index: FrameIndex(i),
        status: Ok(Arc::new(FrameRGBA::filled(2, 2, [i as u8, 0, 0, 255]))),
        render_time: Duration::ZERO,
        branding_warning: None,
    }
}

fn failed(i: u64) -> RenderedFrame {
    RenderedFrame {
        index: FrameIndex(i),
        status: Err(ReelError::frame_render(i, "boom")),
        render_time: Duration::ZERO,
        branding_warning: None,
    }
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

fn rendering() -> JobControl {
    let control = JobControl::new();
    assert!(control.transition(JobState::Rendering));
    control
}

#[test]
fn restores_index_order() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let frames = vec![ok(3), ok(1), ok(0), ok(2)];
    let report = Assembler::new(range(0, 4), 0.0, &control)
        .run(&mut sink, cfg(4), frames)
        .unwrap();

    let order: Vec<u64> = sink.frames().iter().map(|(i, f)| {
        assert_eq!(u64::from(f.data[0]), i.0);
        i.0
    }).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert!(sink.is_committed());
    assert_eq!(report.stats.frames_total, 4);
    assert_eq!(control.state(), JobState::Assembling);
}

#[test]
fn substitutes_out_of_order_failures() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let frames = vec![ok(2), failed(1), ok(0), ok(3)];
    let report = Assembler::new(range(0, 4), 0.5, &control)
        .run(&mut sink, cfg(4), frames)
        .unwrap();
    assert_eq!(report.substituted, vec![1]);
    let reds: Vec<u8> = sink.frames().iter().map(|(_, f)| f.data[0]).collect();
    assert_eq!(reds, vec![0, 0, 2, 3]);
}

#[test]
fn all_failed_is_an_error_even_when_tolerated() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let err = Assembler::new(range(0, 2), 1.0, &control)
        .run(&mut sink, cfg(2), vec![failed(0), failed(1)])
        .unwrap_err();
    assert!(matches!(err, ReelError::FrameRenderFailure { .. }));
    assert!(sink.is_aborted());
}

#[test]
fn stream_ending_early_aborts() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let err = Assembler::new(range(0, 3), 0.0, &control)
        .run(&mut sink, cfg(3), vec![ok(0), ok(2)])
        .unwrap_err();
    assert!(matches!(err, ReelError::EncodingFailure(_)));
    assert!(sink.is_aborted());
    assert!(!sink.is_committed());
}

#[test]
fn duplicate_frames_are_rejected() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let err = Assembler::new(range(0, 3), 0.0, &control)
        .run(&mut sink, cfg(3), vec![ok(1), ok(1)])
        .unwrap_err();
    assert!(matches!(err, ReelError::EncodingFailure(_)));
}

#[test]
fn cancelled_before_commit_never_ends_the_sink() {
    let control = rendering();
    control.cancel();
    let mut sink = InMemorySink::new();
    let err = Assembler::new(range(0, 2), 0.0, &control)
        .run(&mut sink, cfg(2), vec![ok(0), ok(1)])
        .unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(!sink.is_committed());
    assert_eq!(control.state(), JobState::Rendering);
}

#[test]
fn branding_warnings_are_counted() {
    let control = rendering();
    let mut sink = InMemorySink::new();
    let mut warned = ok(1);
    warned.branding_warning = Some(ReelError::branding("logo outside canvas"));
    let report = Assembler::new(range(0, 2), 0.0, &control)
        .run(&mut sink, cfg(2), vec![ok(0), warned])
        .unwrap();
    assert_eq!(report.branding_failures, 1);
    assert!(
        report
            .branding_message
            .as_deref()
            .is_some_and(|m| m.contains("logo outside canvas"))
    );
}
