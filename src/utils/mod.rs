//! Console output helpers

pub mod display;

pub use display::{AsciiCanvas, ColorOutput, GridFormatter};
