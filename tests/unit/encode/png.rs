use super::*;
use crate::foundation::core::Fps;
use crate::scene::quality::QualityPreset;

fn out_dir() -> PathBuf {
    let dir = unique_temp_path(&std::env::temp_dir(), "chartreel_png_test", "d");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::integer(15),
        frame_count: 2,
        quality: QualityPreset::Low,
        audio: None,
    }
}

#[test]
fn unpremultiply_restores_straight_color() {
    assert_eq!(unpremultiply(&[64, 0, 0, 128]), vec![128, 0, 0, 128]);
    assert_eq!(unpremultiply(&[9, 9, 9, 0]), vec![0, 0, 0, 0]);
    assert_eq!(unpremultiply(&[10, 20, 30, 255]), vec![10, 20, 30, 255]);
}

#[test]
fn write_png_round_trips_through_image() {
    let dir = out_dir();
    let path = dir.join("nested").join("frame.png");
    write_png(&path, &FrameRGBA::filled(2, 2, [0, 128, 0, 255])).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 1).0, [0, 128, 0, 255]);
    assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn write_png_rejects_short_buffers() {
    let dir = out_dir();
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
    };
    assert!(write_png(&dir.join("bad.png"), &frame).is_err());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn sequence_sink_names_frames_by_position() {
    let dir = out_dir();
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(10), &FrameRGBA::filled(2, 2, [0, 0, 0, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(11), &FrameRGBA::filled(2, 2, [0, 0, 0, 255]))
        .unwrap();
    sink.end().unwrap();
    assert_eq!(
        sink.written(),
        &[dir.join("frame_00000.png"), dir.join("frame_00001.png")]
    );
}

#[test]
fn sequence_sink_abort_removes_frames() {
    let dir = out_dir();
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::filled(2, 2, [0, 0, 0, 255]))
        .unwrap();
    sink.abort();
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn sequence_sink_rejects_wrong_size() {
    let dir = out_dir();
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg()).unwrap();
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::filled(4, 2, [0, 0, 0, 255]))
            .is_err()
    );
}
