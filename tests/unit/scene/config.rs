use super::*;

#[test]
fn parses_minimal_json() {
    let json = r#"{ "chart": "line", "columns": ["sales"], "speed": { "frames_per_row": 1.0 } }"#;
    let cfg = AnimationConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.chart, ChartKind::Line);
    assert_eq!(cfg.speed, Speed::FramesPerRow(1.0));
    assert_eq!(cfg.theme, Theme::Modern);
    assert!(cfg.branding.is_none());
}

#[test]
fn parses_branding_with_defaults() {
    let json = r##"{
        "chart": "pie",
        "columns": ["region", "sales"],
        "speed": { "frame_count": 30 },
        "theme": "dark",
        "branding": { "placement": { "offset": { "x": -5, "y": 10 } }, "accent": "#ff8800" }
    }"##;
    let cfg = AnimationConfig::from_reader(json.as_bytes()).unwrap();
    let b = cfg.branding.unwrap();
    assert_eq!(b.placement, Placement::Offset { x: -5, y: 10 });
    assert_eq!(b.margin_px, 16);
    assert_eq!(b.accent, Some(Color::hex(0xff8800)));
}

#[test]
fn unknown_fields_are_rejected() {
    let json = r#"{ "chart": "line", "columns": ["a"], "speed": { "frame_count": 1 }, "fps": 3 }"#;
    assert!(AnimationConfig::from_reader(json.as_bytes()).is_err());
}

#[test]
fn missing_logo_fails_validation() {
    let mut cfg = AnimationConfig::new(ChartKind::Bar, &["a"], Speed::FrameCount(3));
    cfg.branding = Some(Branding {
        logo: Some(PathBuf::from("/definitely/not/here/logo.png")),
        ..Branding::default()
    });
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, ReelError::InvalidConfiguration(_)));
}

#[test]
fn empty_selection_is_incompatible() {
    let cfg = AnimationConfig::new(ChartKind::Bar, &[], Speed::FrameCount(3));
    assert!(matches!(
        cfg.validate().unwrap_err(),
        ReelError::IncompatibleChartSpec(_)
    ));
}
