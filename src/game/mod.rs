//! Game Logic Module
//!
//! The deterministic simulation. Everything here is a pure function of
//! the game seed and the bumper targets.
//!
//! ## Module Structure
//!
//! - `config`: every physics constant
//! - `state`: balls, bumper, input log, game state
//! - `tick`: the simulation loop
//! - `collision`: bumper and ball-ball resolution
//! - `events`: per-tick event stream for replay/verification

pub mod collision;
pub mod config;
pub mod events;
pub mod state;
pub mod tick;

// Re-export key types
pub use events::{GoalSide, TickEvent, TickEventData};
pub use state::{Ball, BallKind, Bumper, GameState, InputRecord, InputTarget};
pub use tick::tick;
