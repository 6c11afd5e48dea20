//! Game Registry & Lifecycle Service
//!
//! Process-wide state behind the protocol surface: the commitment slot
//! and the concurrent map of open games. Games are independent; the
//! only shared mutable state is here, behind tokio locks. The slot lock
//! is held read-and-clone only; replay runs under the per-entry lock,
//! which is what serialises start/finish per game.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::protocol::commitment::{derive_game_seed, CommitmentSlot};
use crate::protocol::messages::{
    CommitmentInfo, FinishGameRequest, FinishGameResponse, GameStatus, HealthInfo,
    MismatchFinish, ProtocolError, StartGameRequest, StartGameResponse, VerificationReveal,
    VerifiedFinish, VersionInfo,
};
use crate::protocol::replay::{replay_game, validate_input_log};
use crate::{PROTOCOL_VERSION, VERSION};

/// Upper bound on balls per game.
pub const MAX_NUM_BALLS: u32 = 1000;

/// How long a settled game stays queryable before the sweeper drops it.
pub const FINISHED_GRACE_MS: i64 = 5 * 60 * 1000;

/// Sweeper cadence. Not part of correctness, only of memory usage.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Everything the server remembers about one game.
#[derive(Debug, Clone)]
pub struct GameEntry {
    /// 128-bit id, 32 hex chars.
    pub game_id: String,
    /// Client entropy from the start request.
    pub client_seed: String,
    /// Snapshot of the secret seed this game settles against.
    pub server_seed: String,
    /// Snapshot of the published commitment.
    pub commitment: String,
    /// Derived HMAC key for the engine.
    pub game_seed_hex: String,
    /// Balls to play.
    pub num_balls: u32,
    /// Unix ms at start.
    pub created_at: i64,
    /// Set once finish ran (either way).
    pub finished: bool,
    /// Set when the finish replay matched.
    pub verified: bool,
    /// Recorded verdict; replayed back on repeat finishes.
    pub verdict: Option<FinishGameResponse>,
    /// Unix ms when the verdict was recorded.
    pub finished_at: Option<i64>,
}

/// The lifecycle service: commitment slot + game registry.
pub struct GameService {
    slot: Mutex<CommitmentSlot>,
    games: RwLock<HashMap<String, Arc<Mutex<GameEntry>>>>,
}

impl GameService {
    /// Fresh service with a newly drawn commitment.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(CommitmentSlot::new()),
            games: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Commitment surface
    // =========================================================================

    /// `GET /commitment`.
    pub async fn commitment_info(&self) -> CommitmentInfo {
        self.slot.lock().await.info()
    }

    /// Rotate the commitment now. Normally driven by [`spawn_rotation`].
    ///
    /// [`spawn_rotation`]: GameService::spawn_rotation
    pub async fn rotate_commitment(&self) {
        let mut slot = self.slot.lock().await;
        slot.rotate();
        info!(commitment = %slot.info().commitment, "commitment rotated");
    }

    // =========================================================================
    // Game lifecycle
    // =========================================================================

    /// `POST /game/start`.
    pub async fn start_game(
        &self,
        req: StartGameRequest,
    ) -> Result<StartGameResponse, ProtocolError> {
        if req.client_seed.is_empty() || req.num_balls < 1 || req.num_balls > MAX_NUM_BALLS {
            return Err(ProtocolError::InvalidParameters);
        }

        // O(1) under the slot lock: resolve and clone the seed pair.
        let pair = {
            let slot = self.slot.lock().await;
            slot.resolve(req.recorded_commitment.as_deref())?
        };

        let game_id = Uuid::new_v4().simple().to_string();
        let game_seed_hex = derive_game_seed(&pair.server_seed, &req.client_seed, &game_id);

        let entry = GameEntry {
            game_id: game_id.clone(),
            client_seed: req.client_seed,
            server_seed: pair.server_seed,
            commitment: pair.commitment.clone(),
            game_seed_hex: game_seed_hex.clone(),
            num_balls: req.num_balls,
            created_at: Utc::now().timestamp_millis(),
            finished: false,
            verified: false,
            verdict: None,
            finished_at: None,
        };

        self.games
            .write()
            .await
            .insert(game_id.clone(), Arc::new(Mutex::new(entry)));

        info!(game_id = %game_id, num_balls = req.num_balls, "game started");

        Ok(StartGameResponse {
            game_id,
            commitment: pair.commitment,
            game_seed_hex,
        })
    }

    /// `POST /game/{id}/finish`.
    ///
    /// Idempotent: once a verdict is recorded, later calls return it
    /// without re-running the replay.
    pub async fn finish_game(
        &self,
        game_id: &str,
        req: FinishGameRequest,
    ) -> Result<FinishGameResponse, ProtocolError> {
        let entry = self.lookup(game_id).await?;
        let mut entry = entry.lock().await;

        if let Some(verdict) = &entry.verdict {
            debug!(game_id, "finish replayed stored verdict");
            return Ok(verdict.clone());
        }

        if !validate_input_log(&req.input_log) {
            return Err(ProtocolError::MalformedInputLog);
        }

        let outcome = replay_game(&entry.game_seed_hex, entry.num_balls, &req.input_log);

        let verdict = if outcome.total_win == req.client_total_win {
            entry.verified = true;
            info!(game_id, total_win = outcome.total_win, "game verified");
            FinishGameResponse::Verified(VerifiedFinish {
                verified: true,
                total_win: outcome.total_win,
                verification: VerificationReveal {
                    server_seed: entry.server_seed.clone(),
                    game_seed_hex: entry.game_seed_hex.clone(),
                    client_seed: entry.client_seed.clone(),
                    game_id: entry.game_id.clone(),
                },
            })
        } else {
            warn!(
                game_id,
                server_total = outcome.total_win,
                client_total = req.client_total_win,
                "replay mismatch"
            );
            FinishGameResponse::Mismatch(MismatchFinish {
                verified: false,
                server_total_win: outcome.total_win,
                client_total_win: req.client_total_win,
                error: "Total win mismatch".to_string(),
            })
        };

        entry.finished = true;
        entry.finished_at = Some(Utc::now().timestamp_millis());
        entry.verdict = Some(verdict.clone());
        Ok(verdict)
    }

    /// `GET /game/{id}/status`.
    pub async fn status(&self, game_id: &str) -> Result<GameStatus, ProtocolError> {
        let entry = self.lookup(game_id).await?;
        let entry = entry.lock().await;
        Ok(GameStatus {
            game_id: entry.game_id.clone(),
            num_balls: entry.num_balls,
            finished: entry.finished,
            verified: entry.verified,
            created_at: entry.created_at,
        })
    }

    async fn lookup(&self, game_id: &str) -> Result<Arc<Mutex<GameEntry>>, ProtocolError> {
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or(ProtocolError::NotFound)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Drop settled games past their grace period. Returns the number
    /// swept.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now().timestamp_millis()).await
    }

    async fn sweep_at(&self, now_ms: i64) -> usize {
        let mut expired = Vec::new();
        {
            let games = self.games.read().await;
            for (id, entry) in games.iter() {
                let entry = entry.lock().await;
                if let Some(finished_at) = entry.finished_at {
                    if now_ms - finished_at >= FINISHED_GRACE_MS {
                        expired.push(id.clone());
                    }
                }
            }
        }
        if expired.is_empty() {
            return 0;
        }

        let mut games = self.games.write().await;
        let mut swept = 0;
        for id in expired {
            if games.remove(&id).is_some() {
                swept += 1;
            }
        }
        debug!(swept, "registry sweep");
        swept
    }

    /// Background task: rotate the commitment on its interval.
    pub fn spawn_rotation(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let period = {
                let slot = service.slot.lock().await;
                Duration::from_millis(slot.rotation_interval_ms() as u64)
            };
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                service.rotate_commitment().await;
            }
        })
    }

    /// Background task: sweep the registry periodically.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                service.sweep().await;
            }
        })
    }

    // =========================================================================
    // Liveness
    // =========================================================================

    /// `GET /health`.
    pub fn health() -> HealthInfo {
        HealthInfo {
            status: "ok".to_string(),
        }
    }

    /// `GET /version`.
    pub fn version() -> VersionInfo {
        VersionInfo {
            version: VERSION.to_string(),
            protocol: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::{is_hex64, sha256_hex};
    use crate::game::state::{GameState, InputTarget};
    use crate::game::tick::tick;
    use crate::protocol::replay::tick_bound;

    fn start_req(num_balls: u32) -> StartGameRequest {
        StartGameRequest {
            client_seed: "client-entropy".to_string(),
            num_balls,
            recorded_commitment: None,
        }
    }

    /// Play a full game client-side with a held bumper, stopping by the
    /// same rule the server replay uses.
    fn play_client_side(game_seed_hex: &str, num_balls: u32) -> (Vec<crate::game::state::InputRecord>, u64) {
        let mut state = GameState::new(game_seed_hex, num_balls);
        let bound = tick_bound(num_balls);
        while !state.finished && state.tick_count < bound {
            tick(&mut state, Some(InputTarget { x: 4.0, y: 1.8 }));
        }
        (state.input_log.clone(), state.total_win)
    }

    #[tokio::test]
    async fn test_start_validates_parameters() {
        let service = GameService::new();

        let mut empty_seed = start_req(5);
        empty_seed.client_seed.clear();
        assert_eq!(
            service.start_game(empty_seed).await.unwrap_err(),
            ProtocolError::InvalidParameters
        );

        assert_eq!(
            service.start_game(start_req(0)).await.unwrap_err(),
            ProtocolError::InvalidParameters
        );
        assert_eq!(
            service.start_game(start_req(MAX_NUM_BALLS + 1)).await.unwrap_err(),
            ProtocolError::InvalidParameters
        );
    }

    #[tokio::test]
    async fn test_start_returns_derived_seed() {
        let service = GameService::new();
        let commitment = service.commitment_info().await.commitment;

        let resp = service.start_game(start_req(3)).await.unwrap();
        assert_eq!(resp.commitment, commitment);
        assert!(is_hex64(&resp.game_seed_hex));
        assert_eq!(resp.game_id.len(), 32);

        let status = service.status(&resp.game_id).await.unwrap();
        assert_eq!(status.num_balls, 3);
        assert!(!status.finished);
        assert!(!status.verified);
    }

    #[tokio::test]
    async fn test_full_round_trip_verifies() {
        let service = GameService::new();
        let resp = service.start_game(start_req(1)).await.unwrap();

        let (input_log, total_win) = play_client_side(&resp.game_seed_hex, 1);

        let verdict = service
            .finish_game(
                &resp.game_id,
                FinishGameRequest {
                    input_log,
                    client_total_win: total_win,
                },
            )
            .await
            .unwrap();

        match verdict {
            FinishGameResponse::Verified(v) => {
                assert!(v.verified);
                assert_eq!(v.total_win, total_win);
                // The reveal must bind to the published commitment.
                assert_eq!(
                    sha256_hex(v.verification.server_seed.as_bytes()),
                    resp.commitment
                );
                assert_eq!(v.verification.game_seed_hex, resp.game_seed_hex);
                assert_eq!(v.verification.game_id, resp.game_id);
            }
            FinishGameResponse::Mismatch(m) => panic!("expected verified, got {:?}", m),
        }

        let status = service.status(&resp.game_id).await.unwrap();
        assert!(status.finished);
        assert!(status.verified);
    }

    #[tokio::test]
    async fn test_mismatch_keeps_game_and_is_idempotent() {
        let service = GameService::new();
        let resp = service.start_game(start_req(1)).await.unwrap();

        let (input_log, total_win) = play_client_side(&resp.game_seed_hex, 1);

        let verdict = service
            .finish_game(
                &resp.game_id,
                FinishGameRequest {
                    input_log: input_log.clone(),
                    client_total_win: total_win + 1,
                },
            )
            .await
            .unwrap();

        let mismatch = match &verdict {
            FinishGameResponse::Mismatch(m) => m.clone(),
            FinishGameResponse::Verified(_) => panic!("inflated total must not verify"),
        };
        assert_eq!(mismatch.server_total_win, total_win);
        assert_eq!(mismatch.client_total_win, total_win + 1);

        // Second finish: the stored verdict comes back, even with a
        // now-correct total. No re-replay.
        let again = service
            .finish_game(
                &resp.game_id,
                FinishGameRequest {
                    input_log,
                    client_total_win: total_win,
                },
            )
            .await
            .unwrap();
        assert_eq!(again, verdict);

        // Entry retained for diagnostics.
        let status = service.status(&resp.game_id).await.unwrap();
        assert!(status.finished);
        assert!(!status.verified);
    }

    #[tokio::test]
    async fn test_finish_rejects_malformed_log() {
        use crate::game::state::{InputRecord, InputTarget};

        let service = GameService::new();
        let resp = service.start_game(start_req(1)).await.unwrap();

        let bad_log = vec![
            InputRecord {
                tick: 2,
                target: InputTarget { x: 4.5, y: 2.0 },
            },
            InputRecord {
                tick: 2,
                target: InputTarget { x: 4.5, y: 2.0 },
            },
        ];
        assert_eq!(
            service
                .finish_game(
                    &resp.game_id,
                    FinishGameRequest {
                        input_log: bad_log,
                        client_total_win: 0,
                    }
                )
                .await
                .unwrap_err(),
            ProtocolError::MalformedInputLog
        );

        // Rejection does not settle the game.
        assert!(!service.status(&resp.game_id).await.unwrap().finished);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_found() {
        let service = GameService::new();
        assert_eq!(
            service.status("missing").await.unwrap_err(),
            ProtocolError::NotFound
        );
        assert_eq!(
            service
                .finish_game(
                    "missing",
                    FinishGameRequest {
                        input_log: vec![],
                        client_total_win: 0,
                    }
                )
                .await
                .unwrap_err(),
            ProtocolError::NotFound
        );
    }

    #[tokio::test]
    async fn test_previous_commitment_settles_after_rotation() {
        let service = GameService::new();
        let recorded = service.commitment_info().await.commitment;

        service.rotate_commitment().await;

        // The retained pair still opens games; the game binds the OLD
        // seed, proven by the reveal hashing to the recorded commitment.
        let resp = service
            .start_game(StartGameRequest {
                client_seed: "c".to_string(),
                num_balls: 1,
                recorded_commitment: Some(recorded.clone()),
            })
            .await
            .unwrap();
        assert_eq!(resp.commitment, recorded);

        let (input_log, total_win) = play_client_side(&resp.game_seed_hex, 1);
        let verdict = service
            .finish_game(
                &resp.game_id,
                FinishGameRequest {
                    input_log,
                    client_total_win: total_win,
                },
            )
            .await
            .unwrap();
        match verdict {
            FinishGameResponse::Verified(v) => {
                assert_eq!(sha256_hex(v.verification.server_seed.as_bytes()), recorded);
            }
            FinishGameResponse::Mismatch(_) => panic!("grace-period game must settle"),
        }

        // One more rotation expires it for NEW games.
        service.rotate_commitment().await;
        assert_eq!(
            service
                .start_game(StartGameRequest {
                    client_seed: "c".to_string(),
                    num_balls: 1,
                    recorded_commitment: Some(recorded),
                })
                .await
                .unwrap_err(),
            ProtocolError::InvalidCommitment
        );
    }

    #[tokio::test]
    async fn test_sweeper_honours_grace() {
        let service = GameService::new();
        let resp = service.start_game(start_req(1)).await.unwrap();

        let (input_log, total_win) = play_client_side(&resp.game_seed_hex, 1);
        service
            .finish_game(
                &resp.game_id,
                FinishGameRequest {
                    input_log,
                    client_total_win: total_win,
                },
            )
            .await
            .unwrap();

        // Inside the grace window: kept.
        let now = Utc::now().timestamp_millis();
        assert_eq!(service.sweep_at(now).await, 0);
        assert!(service.status(&resp.game_id).await.is_ok());

        // Past the grace window: gone.
        assert_eq!(service.sweep_at(now + FINISHED_GRACE_MS + 1).await, 1);
        assert_eq!(
            service.status(&resp.game_id).await.unwrap_err(),
            ProtocolError::NotFound
        );
    }

    #[tokio::test]
    async fn test_unfinished_games_survive_sweep() {
        let service = GameService::new();
        let resp = service.start_game(start_req(1)).await.unwrap();

        let far_future = Utc::now().timestamp_millis() + 100 * FINISHED_GRACE_MS;
        assert_eq!(service.sweep_at(far_future).await, 0);
        assert!(service.status(&resp.game_id).await.is_ok());
    }

    #[test]
    fn test_liveness_payloads() {
        assert_eq!(GameService::health().status, "ok");
        let version = GameService::version();
        assert_eq!(version.version, VERSION);
        assert_eq!(version.protocol, PROTOCOL_VERSION);
    }
}
