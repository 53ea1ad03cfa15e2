//! Conway's Game of Life simulator core
//!
//! A toroidal binary grid stepped by the B3/S23 rule on a fixed timestep,
//! editable through input commands and persistable to JSON or plain text.
//! Windowing, input dispatch and drawing are left to the caller, which
//! drives a [`Session`] and paints through the [`session::Canvas`] trait.

pub mod config;
pub mod error;
pub mod game_of_life;
pub mod session;
pub mod utils;

pub use config::Settings;
pub use error::{LifeError, LifeResult};
pub use game_of_life::{GridState, StepEngine};
pub use session::{Command, Session};
