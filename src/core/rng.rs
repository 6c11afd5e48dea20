//! Input-Seeded Random Number Generator
//!
//! Every in-game draw is an HMAC-SHA256 keyed by the game seed over a
//! message that includes the player's committed bumper position for the
//! current tick. The player must settle the bumper before any draw of
//! that tick is computed, and cannot revise it to steer an outcome: the
//! outcome is a one-way function of the position they committed to.
//! That is why publishing the game seed before play is safe.
//!
//! # Message framing
//!
//! The message is the exact string
//! `"{tick}:{bx}:{by}:{label}:{counter}"` where `bx`/`by` carry exactly
//! four fractional digits (trailing zeros kept). The framing is the most
//! fragile interop point in the protocol; changing a single byte of it
//! breaks every recorded game.

use crate::core::crypto::{bytes_to_double, hmac_sha256};

/// Keyed-hash RNG bound to one game seed.
///
/// Holds mutable context `(tick, bumper_x, bumper_y, counter)`. The
/// counter distinguishes multiple draws within a tick and resets
/// whenever the context triple changes.
///
/// # Example
///
/// ```
/// use paddla::core::rng::GameRng;
///
/// let mut rng = GameRng::new(&"00".repeat(32));
/// rng.set_tick_context(1, 4.5, 2.0);
/// let a = rng.next_double("spawn_x");
/// let b = rng.next_double("spawn_x");
/// assert_ne!(a, b); // counter advanced
/// ```
#[derive(Clone, Debug)]
pub struct GameRng {
    /// The game seed hex string as ASCII bytes; the HMAC key.
    key: Vec<u8>,
    tick: u64,
    bumper_x: f64,
    bumper_y: f64,
    counter: u64,
}

impl GameRng {
    /// Bind a fresh RNG to a 64-hex-char game seed.
    pub fn new(game_seed_hex: &str) -> Self {
        Self {
            key: game_seed_hex.as_bytes().to_vec(),
            tick: 0,
            bumper_x: 0.0,
            bumper_y: 0.0,
            counter: 0,
        }
    }

    /// Bind the context to `(tick, bumper_x, bumper_y)`.
    ///
    /// A no-op when the triple is unchanged; otherwise the triple is
    /// replaced and the per-event counter resets to zero.
    pub fn set_tick_context(&mut self, tick: u64, bumper_x: f64, bumper_y: f64) {
        if self.tick == tick && self.bumper_x == bumper_x && self.bumper_y == bumper_y {
            return;
        }
        self.tick = tick;
        self.bumper_x = bumper_x;
        self.bumper_y = bumper_y;
        self.counter = 0;
    }

    /// Draw the next double in `[0, 1)` for `label`.
    ///
    /// Composes the framed message, advances the counter, and folds the
    /// HMAC digest.
    pub fn next_double(&mut self, label: &str) -> f64 {
        let message = self.compose_message(label);
        self.counter += 1;
        let digest = hmac_sha256(&self.key, message.as_bytes());
        bytes_to_double(&digest)
    }

    /// The exact message string the next draw for `label` would sign.
    fn compose_message(&self, label: &str) -> String {
        format!(
            "{}:{:.4}:{:.4}:{}:{}",
            self.tick, self.bumper_x, self.bumper_y, label, self.counter
        )
    }

    /// Current per-context draw counter.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

// =============================================================================
// TESTS
// =============================================================================
