/// Renderer contract and frame buffers.
pub mod backend;
/// Logo overlay compositing.
pub mod branding;
pub(crate) mod chart;
/// `vello_cpu` chart rasterizer.
pub mod cpu;
