//! # Paddla Game Core
//!
//! Provably-fair deterministic game core for Paddla: a tick-based
//! physics simulation whose every random draw is seeded by the player's
//! own input, wrapped in a commit-reveal protocol the client can audit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PADDLA GAME CORE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── crypto.rs   - SHA-256, HMAC-SHA256, byte→double fold    │
//! │  ├── geom.rs     - 1e-10 grid rounding, distance, clamp      │
//! │  └── rng.rs      - Input-seeded keyed-hash RNG               │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── config.rs   - Every physics constant                    │
//! │  ├── state.rs    - Balls, bumper, input log                  │
//! │  ├── tick.rs     - The sixteen-phase tick                    │
//! │  ├── collision.rs- Bumper and ball-ball resolution           │
//! │  └── events.rs   - Per-tick event stream                     │
//! │                                                              │
//! │  protocol/       - Commit-reveal lifecycle                   │
//! │  ├── commitment.rs - Server seed slot, rotation, grace       │
//! │  ├── registry.rs - Game map, start/finish/status, sweeper    │
//! │  ├── replay.rs   - Bounded deterministic replay              │
//! │  └── messages.rs - JSON wire shapes                          │
//! │                                                              │
//! │  verify.rs       - Standalone three-step audit               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! The server commits `SHA256(serverSeed)` before play. The game seed
//! mixes the client's own entropy via HMAC, so neither side controls
//! it alone. Every in-game draw is keyed by the game seed over the
//! tick number and the bumper position the player already committed
//! to, so revealing the game seed up front leaks no future randomness.
//! After play, the server replays the input log, reveals the seed, and
//! the client re-runs the whole chain with [`verify::verify`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod protocol;
pub mod verify;

// Re-export commonly used types
pub use crate::core::rng::GameRng;
pub use crate::game::state::{GameState, InputRecord, InputTarget};
pub use crate::game::tick::tick;
pub use crate::protocol::registry::GameService;
pub use crate::verify::{verify, Verdict, VerifyRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol tag, reported by `/version`; bump on any change to the RNG
/// framing, the physics constants, or the tick phase order.
pub const PROTOCOL_VERSION: &str = "paddla-fair-1";
