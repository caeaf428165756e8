use super::*;
use std::path::PathBuf;

fn write_logo(name: &str, w: u32, h: u32, rgba: [u8; 4]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "chartreel_branding_{}_{name}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("logo.png");
    image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
        .save(&path)
        .unwrap();
    path
}

fn canvas() -> Canvas {
    Canvas::new(100, 50).unwrap()
}

#[test]
fn no_logo_prepares_nothing() {
    assert!(
        LogoOverlay::prepare(&Branding::default(), canvas())
            .unwrap()
            .is_none()
    );
}

#[test]
fn logo_is_scaled_and_anchored_bottom_right() {
    let branding = Branding {
        logo: Some(write_logo("anchor", 10, 10, [255, 0, 0, 255])),
        margin_px: 4,
        scale: 0.2,
        ..Branding::default()
    };
    let logo = LogoOverlay::prepare(&branding, canvas()).unwrap().unwrap();
    assert_eq!(logo.size(), (20, 20));
    assert_eq!(logo.position(), (76, 26));

    let mut frame = FrameRGBA::filled(100, 50, [0, 0, 0, 255]);
    logo.apply(&mut frame).unwrap();
    assert_eq!(frame.pixel(86, 36), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(99, 49), Some([0, 0, 0, 255]));
}

#[test]
fn translucent_logo_blends_over_chart() {
    let branding = Branding {
        logo: Some(write_logo("blend", 4, 4, [255, 255, 255, 128])),
        placement: Placement::TopLeft,
        margin_px: 0,
        scale: 0.1,
        ..Branding::default()
    };
    let logo = LogoOverlay::prepare(&branding, canvas()).unwrap().unwrap();
    let mut frame = FrameRGBA::filled(100, 50, [0, 0, 0, 255]);
    logo.apply(&mut frame).unwrap();
    let [r, g, b, a] = frame.pixel(2, 2).unwrap();
    assert_eq!(a, 255);
    assert!((126..=130).contains(&r), "{r}");
    assert_eq!((r, g), (g, b));
}

#[test]
fn logo_outside_canvas_is_a_branding_failure() {
    let branding = Branding {
        logo: Some(write_logo("outside", 10, 10, [0, 255, 0, 255])),
        placement: Placement::Offset { x: -5, y: 0 },
        ..Branding::default()
    };
    let logo = LogoOverlay::prepare(&branding, canvas()).unwrap().unwrap();
    let mut frame = FrameRGBA::filled(100, 50, [1, 2, 3, 255]);
    let before = frame.clone();
    let err = logo.apply(&mut frame).unwrap_err();
    assert!(matches!(err, ReelError::BrandingApplyFailure(_)));
    assert_eq!(frame, before);
}

#[test]
fn undecodable_logo_is_a_branding_failure() {
    let dir = std::env::temp_dir().join(format!("chartreel_branding_{}_bad", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("logo.png");
    std::fs::write(&path, b"not an image").unwrap();
    let branding = Branding {
        logo: Some(path),
        ..Branding::default()
    };
    let err = LogoOverlay::prepare(&branding, canvas()).unwrap_err();
    assert!(matches!(err, ReelError::BrandingApplyFailure(_)));
}
