//! Paddla Game Server
//!
//! Demo driver for the provably-fair core: fetches a commitment, opens
//! a game, plays it locally, settles it against the service, then
//! re-audits the reveal from scratch the way a client would.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use paddla::game::state::{GameState, InputTarget};
use paddla::game::tick::tick;
use paddla::protocol::messages::{FinishGameRequest, FinishGameResponse, StartGameRequest};
use paddla::protocol::replay::tick_bound;
use paddla::verify::{verify, VerifyRequest};
use paddla::{GameService, PROTOCOL_VERSION, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Paddla Server v{} ({})", VERSION, PROTOCOL_VERSION);

    let service = Arc::new(GameService::new());

    // Background maintenance: hourly rotation, minutely sweep.
    let rotation = service.spawn_rotation();
    let sweeper = service.spawn_sweeper();

    demo_game(&service).await?;

    rotation.abort();
    sweeper.abort();
    Ok(())
}

/// Play one full commit → start → play → finish → audit loop.
async fn demo_game(service: &GameService) -> Result<()> {
    info!("=== Starting Demo Game ===");

    let commitment = service.commitment_info().await;
    info!("Commitment: {}", commitment.commitment);
    info!("Rotates in: {} ms", commitment.expires_in);

    let num_balls = 5u32;
    let started = service
        .start_game(StartGameRequest {
            client_seed: "demo-client-seed".to_string(),
            num_balls,
            recorded_commitment: Some(commitment.commitment.clone()),
        })
        .await
        .map_err(|e| anyhow::anyhow!("start rejected: {e}"))?;

    info!("Game ID: {}", started.game_id);
    info!("Game Seed: {}", started.game_seed_hex);

    // Client-side play: chase each spawn with the bumper target,
    // stopping by the same rule the server replay uses.
    let mut state = GameState::new(&started.game_seed_hex, num_balls);
    let bound = tick_bound(num_balls);
    let mut event_count = 0usize;
    while !state.finished && state.tick_count < bound {
        let target = state
            .balls
            .first()
            .map(|ball| InputTarget {
                x: ball.x,
                y: ball.y,
            })
            .unwrap_or(InputTarget { x: 4.5, y: 2.0 });
        let events = tick(&mut state, Some(target));
        event_count += events.len();
    }

    info!(
        "Played {} ticks, {} events, total win {}",
        state.tick_count, event_count, state.total_win
    );

    let verdict = service
        .finish_game(
            &started.game_id,
            FinishGameRequest {
                input_log: state.input_log.clone(),
                client_total_win: state.total_win,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("finish rejected: {e}"))?;

    let reveal = match verdict {
        FinishGameResponse::Verified(v) => {
            info!("Server verified the game, total win {}", v.total_win);
            v.verification
        }
        FinishGameResponse::Mismatch(m) => {
            anyhow::bail!(
                "replay mismatch: server {} vs client {}",
                m.server_total_win,
                m.client_total_win
            );
        }
    };

    // Independent audit, exactly what a suspicious client runs.
    info!("=== Auditing Reveal ===");
    let audit = verify(&VerifyRequest {
        server_seed: reveal.server_seed,
        client_seed: reveal.client_seed,
        game_id: reveal.game_id,
        expected_commitment: commitment.commitment,
        expected_game_seed_hex: reveal.game_seed_hex,
        num_balls,
        input_log: state.input_log,
        claimed_total_win: state.total_win,
    });

    if audit.valid {
        info!("AUDIT PASSED: commitment, seed and replay all check out");
    } else {
        anyhow::bail!("audit failed: {:?}", audit.reason);
    }

    Ok(())
}
