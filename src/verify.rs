//! Audit Primitive
//!
//! The standalone check a client (or anyone holding the reveal) runs to
//! audit a settled game. Three conditions, tested in order, first
//! failure wins:
//!
//! 1. the revealed server seed hashes to the published commitment,
//! 2. the game seed re-derives from (server seed, client seed, game id),
//! 3. the bounded replay of the input log reproduces the claimed total.
//!
//! Pure and deterministic: the same call on client and server returns
//! the same verdict.

use serde::{Deserialize, Serialize};

use crate::core::crypto::sha256_hex;
use crate::game::state::InputRecord;
use crate::protocol::commitment::derive_game_seed;
use crate::protocol::replay::{replay_game, validate_input_log};

/// Everything a finished game discloses, as handed to the auditor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// The revealed secret seed.
    pub server_seed: String,
    /// The client's chosen seed.
    pub client_seed: String,
    /// The game id.
    pub game_id: String,
    /// The commitment recorded before play.
    pub expected_commitment: String,
    /// The game seed the engine was told to use.
    pub expected_game_seed_hex: String,
    /// Balls the game played.
    pub num_balls: u32,
    /// The full input log.
    pub input_log: Vec<InputRecord>,
    /// The total being audited.
    pub claimed_total_win: u64,
}

/// Why an audit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditFailure {
    /// `SHA256(serverSeed)` does not equal the commitment: the server
    /// revealed a different secret than it committed to.
    CommitmentMismatch,
    /// The game seed does not re-derive: the game ran on randomness not
    /// bound to the commitment.
    SeedMismatch,
    /// The replay total disagrees with the claim.
    ReplayMismatch,
}

impl std::fmt::Display for AuditFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommitmentMismatch => write!(f, "commitment mismatch"),
            Self::SeedMismatch => write!(f, "game seed mismatch"),
            Self::ReplayMismatch => write!(f, "replay total mismatch"),
        }
    }
}

/// Audit verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// All three checks passed.
    pub valid: bool,
    /// First failing check, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<AuditFailure>,
}

impl Verdict {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn fail(reason: AuditFailure) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Run the three-step audit.
pub fn verify(req: &VerifyRequest) -> Verdict {
    // 1. Commitment binding.
    let commitment = sha256_hex(req.server_seed.as_bytes());
    if !commitment.eq_ignore_ascii_case(&req.expected_commitment) {
        return Verdict::fail(AuditFailure::CommitmentMismatch);
    }

    // 2. Seed derivation.
    let derived = derive_game_seed(&req.server_seed, &req.client_seed, &req.game_id);
    if !derived.eq_ignore_ascii_case(&req.expected_game_seed_hex) {
        return Verdict::fail(AuditFailure::SeedMismatch);
    }

    // 3. Replay. A log the engine could never have produced cannot
    //    reproduce any honest total.
    if !validate_input_log(&req.input_log) {
        return Verdict::fail(AuditFailure::ReplayMismatch);
    }
    let outcome = replay_game(&req.expected_game_seed_hex, req.num_balls, &req.input_log);
    if outcome.total_win != req.claimed_total_win {
        return Verdict::fail(AuditFailure::ReplayMismatch);
    }

    Verdict::ok()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{GameState, InputTarget};
    use crate::game::tick::tick;
    use crate::protocol::replay::tick_bound;

    /// Build a complete, honestly-played game and its audit request.
    fn honest_game(num_balls: u32) -> VerifyRequest {
        let server_seed = "1f".repeat(32);
        let client_seed = "my-entropy".to_string();
        let game_id = "0123456789abcdef0123456789abcdef".to_string();

        let expected_commitment = sha256_hex(server_seed.as_bytes());
        let game_seed_hex = derive_game_seed(&server_seed, &client_seed, &game_id);

        let mut state = GameState::new(&game_seed_hex, num_balls);
        let bound = tick_bound(num_balls);
        while !state.finished && state.tick_count < bound {
            // Drift the bumper so the log is not constant.
            let t = state.tick_count + 1;
            let x = 2.0 + ((t % 100) as f64) * 0.05;
            tick(&mut state, Some(InputTarget { x, y: 2.0 }));
        }

        VerifyRequest {
            server_seed,
            client_seed,
            game_id,
            expected_commitment,
            expected_game_seed_hex: game_seed_hex,
            num_balls,
            input_log: state.input_log.clone(),
            claimed_total_win: state.total_win,
        }
    }

    #[test]
    fn test_honest_game_verifies() {
        let req = honest_game(5);
        assert_eq!(verify(&req), Verdict::ok());
    }

    #[test]
    fn test_inflated_total_is_replay_mismatch() {
        let mut req = honest_game(5);
        req.claimed_total_win ^= 1;
        assert_eq!(verify(&req), Verdict::fail(AuditFailure::ReplayMismatch));
    }

    #[test]
    fn test_tampered_server_seed_is_commitment_mismatch() {
        let mut req = honest_game(2);
        // Flip one nibble of the revealed seed.
        let mut seed: Vec<u8> = req.server_seed.into_bytes();
        seed[0] = if seed[0] == b'1' { b'2' } else { b'1' };
        req.server_seed = String::from_utf8(seed).unwrap();
        assert_eq!(
            verify(&req),
            Verdict::fail(AuditFailure::CommitmentMismatch)
        );
    }

    #[test]
    fn test_wrong_game_seed_is_seed_mismatch() {
        let mut req = honest_game(2);
        req.expected_game_seed_hex = "00".repeat(32);
        assert_eq!(verify(&req), Verdict::fail(AuditFailure::SeedMismatch));
    }

    #[test]
    fn test_foreign_client_seed_is_seed_mismatch() {
        let mut req = honest_game(2);
        req.client_seed.push('x');
        assert_eq!(verify(&req), Verdict::fail(AuditFailure::SeedMismatch));
    }

    #[test]
    fn test_tampered_input_log_is_replay_mismatch() {
        let mut req = honest_game(5);
        // Nudge one recorded target; the engine draws different
        // randomness from tick 1 on, so the total almost surely moves,
        // and the claim no longer replays.
        if let Some(first) = req.input_log.first_mut() {
            first.target.x += 1.0;
        }
        let verdict = verify(&req);
        if !verdict.valid {
            assert_eq!(verdict.reason, Some(AuditFailure::ReplayMismatch));
        }
    }

    #[test]
    fn test_garbage_log_is_replay_mismatch() {
        let mut req = honest_game(1);
        req.input_log.reverse();
        if req.input_log.len() > 1 {
            assert_eq!(verify(&req), Verdict::fail(AuditFailure::ReplayMismatch));
        }
    }

    #[test]
    fn test_check_order_commitment_first() {
        // With both the seed and the derivation broken, the commitment
        // check reports first.
        let mut req = honest_game(1);
        req.server_seed = "00".repeat(32);
        req.expected_game_seed_hex = "ff".repeat(32);
        assert_eq!(
            verify(&req),
            Verdict::fail(AuditFailure::CommitmentMismatch)
        );
    }

    #[test]
    fn test_request_roundtrips_as_json() {
        let req = honest_game(1);
        let json = serde_json::to_string(&req).unwrap();
        let back: VerifyRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(verify(&back), Verdict::ok());
        assert!(json.contains("\"serverSeed\""));
        assert!(json.contains("\"claimedTotalWin\""));
    }
}
