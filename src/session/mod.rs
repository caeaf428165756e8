//! Job orchestration: worker pool, ordered assembly and the job lifecycle.

/// Ordered assembly with placeholder substitution.
pub mod assembler;
/// Chunked parallel rendering into a sink.
pub mod controller;
/// `RenderJob`, its state machine and outcome types.
pub mod job;
