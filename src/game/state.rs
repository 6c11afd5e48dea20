//! Game State Definitions
//!
//! All state for one game: balls, the bumper, counters and the input
//! log. Mutated only by the tick engine; external observers see state at
//! tick boundaries.

use serde::{Deserialize, Serialize};

use crate::core::geom::clamp;
use crate::core::rng::GameRng;
use crate::game::config::{self, bumper};

// =============================================================================
// BALL
// =============================================================================

/// Kind of a spawned ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallKind {
    /// Decays over time; the only kind that can die of timeout.
    Normal,
    /// Pays x3 and resets the timeout streak when it scores.
    Golden,
    /// Detonates on scoring, collecting every upper-half ball.
    Explosive,
}

impl BallKind {
    /// Win multiplier for this kind.
    pub fn multiplier(self) -> u64 {
        match self {
            BallKind::Golden => 3,
            BallKind::Normal | BallKind::Explosive => 1,
        }
    }

    /// Does this kind decay and recharge?
    #[inline]
    pub fn is_normal(self) -> bool {
        matches!(self, BallKind::Normal)
    }
}

/// One projectile on the field.
///
/// Created by the spawn phase, mutated only by the engine, removed at
/// the compaction boundary once `alive` is false.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ball {
    /// Stable id, unique within one game.
    pub id: u32,
    /// Position, pinned to the 1e-10 grid.
    pub x: f64,
    /// Position, pinned to the 1e-10 grid.
    pub y: f64,
    /// Velocity, pinned to the 1e-10 grid.
    pub dx: f64,
    /// Velocity, pinned to the 1e-10 grid.
    pub dy: f64,
    /// Current value, 0..=9.
    pub value: u32,
    /// Ticks since the last decay (or recharge).
    pub ticks_since_countdown: u32,
    /// Kind of ball.
    pub kind: BallKind,
    /// Win multiplier (3 for golden, else 1).
    pub multiplier: u64,
    /// Dead balls stay in the list until compaction.
    pub alive: bool,
    /// Set when the ball decayed to zero this tick; consumed by the
    /// timeout tally in the same tick.
    #[serde(skip)]
    pub died_from_timeout: bool,
}

impl Ball {
    /// Prize this ball is worth at multiplier `progressive`.
    #[inline]
    pub fn prize(&self, progressive: u64) -> u64 {
        self.value as u64 * self.multiplier * progressive
    }
}

// =============================================================================
// BUMPER
// =============================================================================

/// The single player-controlled paddle.
///
/// Both the position and the target stay inside the bumper bounding box
/// after every tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bumper {
    /// Current position.
    pub x: f64,
    /// Current position.
    pub y: f64,
    /// Where the player is steering to.
    pub target_x: f64,
    /// Where the player is steering to.
    pub target_y: f64,
}

impl Bumper {
    /// Bumper at the start position with no pending movement.
    pub fn at_start() -> Self {
        Self {
            x: bumper::START_X,
            y: bumper::START_Y,
            target_x: bumper::START_X,
            target_y: bumper::START_Y,
        }
    }

    /// Clamp a raw target into the bumper bounding box.
    pub fn clamp_target(x: f64, y: f64) -> (f64, f64) {
        (
            clamp(x, bumper::MIN_X, bumper::MAX_X),
            clamp(y, bumper::MIN_Y, bumper::MAX_Y),
        )
    }
}

// =============================================================================
// INPUT LOG
// =============================================================================

/// Target coordinates inside an input record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputTarget {
    /// Target x.
    pub x: f64,
    /// Target y.
    pub y: f64,
}

/// One recorded input: the bumper target in force at `tick`.
///
/// The serde shape is the wire shape (`{tick, target: {x, y}}`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Tick this target was in force at (1-based).
    pub tick: u64,
    /// The clamped target.
    pub target: InputTarget,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Input-seeded RNG bound to this game's seed.
    pub rng: GameRng,
    /// Ticks elapsed (1-based after the first tick).
    pub tick_count: u64,
    /// Balls spawned so far.
    pub balls_spawned: u32,
    /// Total balls this game will spawn.
    pub num_balls: u32,
    /// Ticks until the next spawn is allowed.
    pub spawn_cooldown: u32,
    /// Progressive win multiplier, 1..=PROGRESSIVE_CAP.
    pub progressive: u64,
    /// Consecutive-ish timeout deaths since the last golden/explosive
    /// score or progressive reset.
    pub timeout_count: u32,
    /// Accumulated winnings.
    pub total_win: u64,
    /// One record per tick; `input_log.len() == tick_count`.
    pub input_log: Vec<InputRecord>,
    /// Set once every ball has spawned and left the field.
    pub finished: bool,
    /// Next ball id (monotonic counter).
    pub next_ball_id: u32,
    /// Live balls in insertion order. May briefly contain dead balls
    /// between a kill and the compaction phase of the same tick.
    pub balls: Vec<Ball>,
    /// The paddle.
    pub bumper: Bumper,
}

impl GameState {
    /// Fresh state bound to `game_seed_hex`, ready for tick 1.
    pub fn new(game_seed_hex: &str, num_balls: u32) -> Self {
        Self {
            rng: GameRng::new(game_seed_hex),
            tick_count: 0,
            balls_spawned: 0,
            num_balls,
            spawn_cooldown: 0,
            progressive: 1,
            timeout_count: 0,
            total_win: 0,
            input_log: Vec::new(),
            finished: false,
            next_ball_id: 0,
            balls: Vec::new(),
            bumper: Bumper::at_start(),
        }
    }

    /// Bump the progressive multiplier, saturating at the cap.
    #[inline]
    pub fn bump_progressive(&mut self) {
        if self.progressive < config::PROGRESSIVE_CAP {
            self.progressive += 1;
        }
    }

    /// Count of balls still alive.
    pub fn alive_count(&self) -> usize {
        self.balls.iter().filter(|b| b.alive).count()
    }

    /// Debug-check the documented invariants. Test helper.
    #[cfg(test)]
    pub fn assert_invariants(&self) {
        use crate::game::config::{BALL_R, FIELD, PROGRESSIVE_CAP, TIMEOUT_LIMIT};

        for ball in &self.balls {
            assert!(ball.alive, "compacted list holds only live balls");
            assert!(
                (BALL_R..=FIELD - BALL_R).contains(&ball.x),
                "ball {} x={} out of bounds",
                ball.id,
                ball.x
            );
            assert!(
                (BALL_R..=FIELD - BALL_R).contains(&ball.y),
                "ball {} y={} out of bounds",
                ball.id,
                ball.y
            );
            assert!(ball.value <= 9);
        }
        assert!((1..=PROGRESSIVE_CAP).contains(&self.progressive));
        assert!(self.timeout_count < TIMEOUT_LIMIT);
        assert_eq!(self.input_log.len() as u64, self.tick_count);
        assert!(self.balls_spawned <= self.num_balls);
        let b = &self.bumper;
        assert!((bumper::MIN_X..=bumper::MAX_X).contains(&b.x));
        assert!((bumper::MIN_Y..=bumper::MAX_Y).contains(&b.y));
        assert!((bumper::MIN_X..=bumper::MAX_X).contains(&b.target_x));
        assert!((bumper::MIN_Y..=bumper::MAX_Y).contains(&b.target_y));
        if self.finished {
            assert!(self.balls.is_empty());
            assert_eq!(self.balls_spawned, self.num_balls);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
