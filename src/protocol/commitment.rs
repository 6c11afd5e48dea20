//! Commitment Slot
//!
//! Holds the secret server seed and publishes its SHA-256 before any
//! game starts, binding the server to that seed. Rotation keeps exactly
//! one previous pair so games opened just before a rotation can still
//! settle; anything older is expired and rejects new games. In-flight
//! games are unaffected either way because each snapshots its seed pair
//! at start.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::core::crypto::{hmac_sha256_hex, sha256_hex};
use crate::protocol::messages::{CommitmentInfo, ProtocolError};

/// Default rotation interval: 1 hour.
pub const ROTATION_INTERVAL_MS: i64 = 60 * 60 * 1000;

/// A server seed with its published commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPair {
    /// The secret: 32 cryptographic random bytes, hex encoded. Revealed
    /// only after a game settles.
    pub server_seed: String,
    /// `SHA256(server_seed)` over the ASCII hex string, hex encoded.
    pub commitment: String,
    /// When this pair was generated (Unix ms).
    pub timestamp: i64,
}

impl SeedPair {
    fn generate(now_ms: i64) -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let server_seed = hex::encode(bytes);
        let commitment = sha256_hex(server_seed.as_bytes());
        Self {
            server_seed,
            commitment,
            timestamp: now_ms,
        }
    }
}

/// Process-wide commitment state: the current pair plus a single
/// retained previous pair. Callers serialise access; every operation
/// here is read-and-clone or an O(1) swap.
#[derive(Debug)]
pub struct CommitmentSlot {
    current: SeedPair,
    previous: Option<SeedPair>,
    rotation_interval_ms: i64,
}

impl CommitmentSlot {
    /// Fresh slot with a newly drawn seed.
    pub fn new() -> Self {
        Self::new_at(Utc::now().timestamp_millis())
    }

    fn new_at(now_ms: i64) -> Self {
        Self {
            current: SeedPair::generate(now_ms),
            previous: None,
            rotation_interval_ms: ROTATION_INTERVAL_MS,
        }
    }

    /// Retire the current pair into the history slot and draw a fresh
    /// seed. The pair that was previous before this call expires.
    pub fn rotate(&mut self) {
        self.rotate_at(Utc::now().timestamp_millis());
    }

    fn rotate_at(&mut self, now_ms: i64) {
        let retired = std::mem::replace(&mut self.current, SeedPair::generate(now_ms));
        self.previous = Some(retired);
    }

    /// Public view of the current commitment.
    pub fn info(&self) -> CommitmentInfo {
        self.info_at(Utc::now().timestamp_millis())
    }

    fn info_at(&self, now_ms: i64) -> CommitmentInfo {
        let expires_in = (self.current.timestamp + self.rotation_interval_ms - now_ms).max(0);
        CommitmentInfo {
            commitment: self.current.commitment.clone(),
            timestamp: self.current.timestamp,
            expires_in,
        }
    }

    /// Milliseconds between rotations.
    pub fn rotation_interval_ms(&self) -> i64 {
        self.rotation_interval_ms
    }

    /// Pick the seed pair a new game binds to.
    ///
    /// `None` means "whatever is current". A recorded commitment must
    /// match the current or the single retained previous pair; anything
    /// else is expired or was never ours.
    pub fn resolve(&self, recorded: Option<&str>) -> Result<SeedPair, ProtocolError> {
        match recorded {
            None => Ok(self.current.clone()),
            Some(c) if c.eq_ignore_ascii_case(&self.current.commitment) => {
                Ok(self.current.clone())
            }
            Some(c) => match &self.previous {
                Some(prev) if c.eq_ignore_ascii_case(&prev.commitment) => Ok(prev.clone()),
                _ => Err(ProtocolError::InvalidCommitment),
            },
        }
    }
}

impl Default for CommitmentSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a game seed: `HMAC_SHA256(serverSeed, clientSeed ":" gameId)`,
/// hex encoded. The key is the server seed's ASCII hex string, matching
/// how the commitment hashes it.
pub fn derive_game_seed(server_seed: &str, client_seed: &str, game_id: &str) -> String {
    let message = format!("{}:{}", client_seed, game_id);
    hmac_sha256_hex(server_seed.as_bytes(), message.as_bytes())
}

// =============================================================================
// TESTS
// =============================================================================
