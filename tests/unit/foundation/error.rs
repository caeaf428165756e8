use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::invalid_configuration("x")
            .to_string()
            .contains("invalid configuration:")
    );
    assert!(
        ReelError::incompatible_chart("x")
            .to_string()
            .contains("incompatible chart spec:")
    );
    assert!(
        ReelError::encoding("x")
            .to_string()
            .contains("encoding failure:")
    );
    assert_eq!(
        ReelError::frame_render(7, "flat axis").to_string(),
        "frame 7 failed to render: flat axis"
    );
}

#[test]
fn kind_matches_variant() {
    assert_eq!(
        ReelError::narration("no voice").kind(),
        ErrorKind::NarrationSynthesisFailure
    );
    assert_eq!(ReelError::Cancelled.kind(), ErrorKind::Cancelled);
    assert_eq!(
        ReelError::frame_render(0, "x").kind(),
        ErrorKind::FrameRenderFailure
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
