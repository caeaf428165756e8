/// Animation configuration.
pub mod config;
/// Output quality presets.
pub mod quality;
/// Themes, palettes and resolved chart styles.
pub mod theme;
