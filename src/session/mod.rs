//! Session control: fixed-timestep clock, command handling and rendering

pub mod clock;
pub mod controller;
pub mod render;

pub use clock::{ClockState, FixedClock};
pub use controller::{Command, CommandOutcome, CommandParseError, FrameReport, Session};
pub use render::{render_frame, Canvas, CellColor, CellRect};
