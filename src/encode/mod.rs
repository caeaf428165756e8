//! Sinks consume rendered frames in timeline order.

/// `ffmpeg`-based MP4 output via the system `ffmpeg`.
pub mod ffmpeg;
/// PNG stills and PNG sequences.
pub mod png;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
