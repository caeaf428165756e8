use super::*;

#[test]
fn every_theme_has_distinct_background_and_text() {
    for theme in [Theme::Modern, Theme::Corporate, Theme::Dark, Theme::Light] {
        let c = theme.colors();
        assert_ne!(c.background, c.text, "{theme:?}");
        assert_eq!(c.palette[0], c.accent, "{theme:?}");
    }
}

#[test]
fn overrides_replace_theme_defaults() {
    let accent = Color::hex(0x123456);
    let palette = [Color::hex(0xaa0000), Color::hex(0x00aa00)];
    let s = ResolvedStyle::resolve(
        Theme::Dark,
        ChartKind::Bar,
        Some(accent),
        Some(&palette[..]),
        true,
    );
    assert_eq!(s.accent, accent);
    assert_eq!(s.palette, palette.to_vec());
    assert_eq!(s.series_color(3), palette[1]);
    assert!(s.title_bar);
    assert_eq!(s.chart, ChartStyle::for_kind(ChartKind::Bar));
}

#[test]
fn empty_palette_override_falls_back_to_theme() {
    let s = ResolvedStyle::resolve(Theme::Light, ChartKind::Line, None, Some(&[][..]), false);
    assert_eq!(s.palette.len(), 8);
    assert_eq!(s.accent, Theme::Light.colors().accent);
    assert_eq!(s.background, Color::hex(0xffffff));
}
