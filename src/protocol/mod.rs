//! Protocol Layer
//!
//! The commit-reveal lifecycle around the engine: commitment slot, game
//! registry, bounded replay and the JSON wire shapes. Transport-free;
//! an HTTP layer maps these calls onto routes.
//!
//! ## Module Structure
//!
//! - `messages`: wire DTOs and the error taxonomy
//! - `commitment`: server seed slot with rotation and grace
//! - `registry`: concurrent game map, start/finish/status, sweeper
//! - `replay`: input-log validation and bounded replay

pub mod commitment;
pub mod messages;
pub mod registry;
pub mod replay;

// Re-export key types
pub use commitment::{derive_game_seed, CommitmentSlot, SeedPair};
pub use messages::{
    CommitmentInfo, FinishGameRequest, FinishGameResponse, GameStatus, ProtocolError,
    StartGameRequest, StartGameResponse,
};
pub use registry::{GameEntry, GameService};
pub use replay::{replay_game, validate_input_log, ReplayOutcome};
