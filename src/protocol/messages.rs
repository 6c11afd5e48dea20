//! Wire Messages
//!
//! JSON request/response shapes for the protocol surface. Field names
//! are bit-significant: clients hash and compare some of these strings,
//! so every struct pins its serde names to the shared camelCase forms.
//! Transport (routing, CORS, auth) lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::game::state::InputRecord;

// =============================================================================
// COMMITMENT
// =============================================================================

/// `GET /commitment` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentInfo {
    /// SHA-256 of the current secret server seed, hex.
    pub commitment: String,
    /// When this commitment was generated (Unix ms).
    pub timestamp: i64,
    /// Milliseconds until the next rotation.
    pub expires_in: i64,
}

// =============================================================================
// GAME LIFECYCLE
// =============================================================================

/// `POST /game/start` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    /// Client-chosen entropy, mixed into the game seed. Must be
    /// non-empty.
    pub client_seed: String,
    /// Balls to play, 1..=1000.
    pub num_balls: u32,
    /// The commitment the client recorded before starting; pins which
    /// server seed the game uses across a rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_commitment: Option<String>,
}

/// `POST /game/start` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    /// 128-bit game id (32 hex chars).
    pub game_id: String,
    /// The commitment this game settles against.
    pub commitment: String,
    /// HMAC-SHA256(serverSeed, clientSeed ":" gameId), hex. The key for
    /// all in-game randomness.
    pub game_seed_hex: String,
}

/// `POST /game/{id}/finish` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishGameRequest {
    /// The client's full per-tick input log.
    pub input_log: Vec<InputRecord>,
    /// The total the client computed locally.
    pub client_total_win: u64,
}

/// Seed reveal returned once a finish verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReveal {
    /// The revealed secret; `SHA256(serverSeed)` must equal the
    /// commitment.
    pub server_seed: String,
    /// The game seed the engine ran with.
    pub game_seed_hex: String,
    /// Echo of the client seed.
    pub client_seed: String,
    /// Echo of the game id.
    pub game_id: String,
}

/// Successful finish: totals matched, seed revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedFinish {
    /// Always `true`.
    pub verified: bool,
    /// The agreed total.
    pub total_win: u64,
    /// Everything the client needs for an independent audit.
    pub verification: VerificationReveal,
}

/// Failed finish: server replay disagreed with the client total.
/// A business outcome, not a transport error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchFinish {
    /// Always `false`.
    pub verified: bool,
    /// What the server replay computed.
    pub server_total_win: u64,
    /// What the client claimed.
    pub client_total_win: u64,
    /// Human-readable summary.
    pub error: String,
}

/// `POST /game/{id}/finish` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinishGameResponse {
    /// Replay matched.
    Verified(VerifiedFinish),
    /// Replay disagreed.
    Mismatch(MismatchFinish),
}

impl FinishGameResponse {
    /// Did this finish verify?
    pub fn is_verified(&self) -> bool {
        matches!(self, FinishGameResponse::Verified(_))
    }
}

/// `GET /game/{id}/status` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    /// Game id.
    pub game_id: String,
    /// Balls this game plays.
    pub num_balls: u32,
    /// Has finish been called?
    pub finished: bool,
    /// Did the finish verify?
    pub verified: bool,
    /// When the game opened (Unix ms).
    pub created_at: i64,
}

// =============================================================================
// LIVENESS
// =============================================================================

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    /// Fixed `"ok"`.
    pub status: String,
}

/// `GET /version` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Crate version.
    pub version: String,
    /// Protocol tag clients match against.
    pub protocol: String,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

/// Boundary rejections. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Malformed request: empty client seed or out-of-range ball count.
    #[error("Invalid parameters")]
    InvalidParameters,

    /// The recorded commitment is neither the current nor the retained
    /// previous one.
    #[error("Invalid commitment: not the current or previous commitment")]
    InvalidCommitment,

    /// Unknown game id, or the entry was already swept.
    #[error("Game not found")]
    NotFound,

    /// The submitted input log is not a well-formed tick sequence.
    #[error("Malformed input log")]
    MalformedInputLog,
}

impl ProtocolError {
    /// HTTP status hint for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ProtocolError::NotFound => 404,
            _ => 400,
        }
    }

    /// Wire body for this rejection.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
