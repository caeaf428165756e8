/// Narration sources and speech synthesis.
pub mod narration;
/// Linear PCM tracks and the audio/video length fit.
pub mod track;
