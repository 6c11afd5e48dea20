//! Bounded Deterministic Replay
//!
//! Re-runs a game from `(gameSeedHex, numBalls, inputLog)` to recompute
//! its total. The tick loop is hard-bounded at `numBalls * 600`
//! iterations, which caps the work an adversarial input log can demand.

use crate::game::config::MAX_TICKS_PER_BALL;
use crate::game::state::{GameState, InputRecord};
use crate::game::tick::tick;

/// Result of a replay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Recomputed total.
    pub total_win: u64,
    /// Ticks executed.
    pub ticks: u64,
    /// Whether the engine reached its natural end (vs. the bound).
    pub completed: bool,
}

/// Check that a submitted log is a well-formed tick sequence: ticks
/// strictly increasing starting at 1 or later, coordinates finite.
pub fn validate_input_log(log: &[InputRecord]) -> bool {
    let mut last_tick = 0u64;
    for record in log {
        if record.tick <= last_tick {
            return false;
        }
        if !record.target.x.is_finite() || !record.target.y.is_finite() {
            return false;
        }
        last_tick = record.tick;
    }
    true
}

/// Replay bound for a game of `num_balls`.
pub fn tick_bound(num_balls: u32) -> u64 {
    num_balls as u64 * MAX_TICKS_PER_BALL
}

/// Replay a game to completion or to the tick bound.
///
/// At each tick the next unconsumed record applies iff its `tick`
/// equals the upcoming tick number; otherwise the previous target is
/// carried forward. Callers must validate the log first.
pub fn replay_game(game_seed_hex: &str, num_balls: u32, input_log: &[InputRecord]) -> ReplayOutcome {
    let mut state = GameState::new(game_seed_hex, num_balls);
    let bound = tick_bound(num_balls);
    let mut next = 0usize;

    while !state.finished && state.tick_count < bound {
        let upcoming = state.tick_count + 1;
        let target = match input_log.get(next) {
            Some(record) if record.tick == upcoming => {
                next += 1;
                Some(record.target)
            }
            _ => None,
        };
        tick(&mut state, target);
    }

    ReplayOutcome {
        total_win: state.total_win,
        ticks: state.tick_count,
        completed: state.finished,
    }
}

// =============================================================================
// TESTS
// =============================================================================
