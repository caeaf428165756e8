/// Typed columns and the immutable dataset view.
pub mod dataset;
