use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert_eq!(
        r.indices().collect::<Vec<_>>(),
        vec![FrameIndex(2), FrameIndex(3), FrameIndex(4)]
    );
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_frames_to_secs() {
    let fps = Fps::integer(15);
    assert!((fps.frames_to_secs(100) - 100.0 / 15.0).abs() < 1e-12);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_requires_even_non_zero_sizes() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(11, 10).is_err());
    let c = Canvas::new(854, 480).unwrap();
    assert_eq!(c.frame_bytes(), 854 * 480 * 4);
}

#[test]
fn hex_colors_parse_and_format() {
    assert_eq!(Color::parse_hex("#00a8e8").unwrap(), Color::rgb(0, 0xa8, 0xe8));
    assert_eq!(Color::parse_hex("FF000080").unwrap().a, 0x80);
    assert!(Color::parse_hex("#abc").is_err());
    assert!(Color::parse_hex("#zzzzzz").is_err());
    assert_eq!(String::from(Color::hex(0x1a1a1a)), "#1a1a1a");
}

#[test]
fn color_deserializes_from_hex_string() {
    let c: Color = serde_json::from_str("\"#3498db\"").unwrap();
    assert_eq!(c, Color::hex(0x3498db));
    assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
}

#[test]
fn premultiply_rounds() {
    let p = Color::rgb(255, 0, 0).with_opacity(0.5).to_premul();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
}
