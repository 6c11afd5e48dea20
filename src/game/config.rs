//! Physics Constants
//!
//! The entire physics is defined by the numbers in this module; no other
//! module hard-codes one. Changing any value here changes every replay,
//! so each constant is pinned by a test below.

/// Square field side length. Play area is `[0, FIELD] x [0, FIELD]`.
pub const FIELD: f64 = 9.0;

/// Ball radius.
pub const BALL_R: f64 = 0.2;

/// Ball speed per tick (also the post-collision launch speed).
pub const SPEED: f64 = 0.05;

/// Goal capture radius around `(0, 0)` and `(FIELD, 0)`.
pub const GOAL_R: f64 = 1.02;

/// Center recharge disc radius.
pub const CENTER_R: f64 = 0.225;

/// Center disc position.
pub const CENTER_X: f64 = 4.5;
/// Center disc position.
pub const CENTER_Y: f64 = 4.5;

/// Ticks between value decrements for a normal ball.
pub const COUNTDOWN: u32 = 45;

/// Probability a spawned ball is golden (x3 multiplier).
pub const GOLDEN_CHANCE: f64 = 0.01;

/// Probability a spawned ball is explosive.
pub const EXPLOSIVE_CHANCE: f64 = 1.0 / 75.0;

/// Cooldown in ticks after a spawn before the next one.
pub const SPAWN_COOLDOWN: u32 = 60;

/// Spawn opportunities occur every `SPAWN_INTERVAL` ticks.
pub const SPAWN_INTERVAL: u64 = 60;

/// Maximum simultaneous balls on the field.
pub const MAX_ON_FIELD: usize = 10;

/// Timeout deaths before the progressive multiplier resets.
pub const TIMEOUT_LIMIT: u32 = 5;

/// Progressive multiplier cap.
pub const PROGRESSIVE_CAP: u64 = 5;

/// Stake per ball (informational; payouts are in the same unit).
pub const BET_PER_BALL: u64 = 5;

/// Replay bound: no game may run longer than `num_balls` times this.
pub const MAX_TICKS_PER_BALL: u64 = 600;

/// Bumper paddle geometry and movement limits.
pub mod bumper {
    /// Bumper collision radius.
    pub const RADIUS: f64 = 0.4;
    /// Bounding box for bumper position and targets.
    pub const MIN_X: f64 = 1.5;
    /// Bounding box for bumper position and targets.
    pub const MAX_X: f64 = 7.5;
    /// Bounding box for bumper position and targets.
    pub const MIN_Y: f64 = 0.4;
    /// Bounding box for bumper position and targets.
    pub const MAX_Y: f64 = 3.5;
    /// Maximum travel distance per tick.
    pub const MAX_SPEED: f64 = 0.15;
    /// Starting position.
    pub const START_X: f64 = 4.5;
    /// Starting position.
    pub const START_Y: f64 = 2.0;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_pinned() {
        // These values must never change: they define the physics that
        // every recorded input log replays against.
        assert_eq!(FIELD, 9.0);
        assert_eq!(BALL_R, 0.2);
        assert_eq!(SPEED, 0.05);
        assert_eq!(GOAL_R, 1.02);
        assert_eq!(CENTER_R, 0.225);
        assert_eq!((CENTER_X, CENTER_Y), (4.5, 4.5));
        assert_eq!(COUNTDOWN, 45);
        assert_eq!(GOLDEN_CHANCE, 0.01);
        assert_eq!(EXPLOSIVE_CHANCE, 1.0 / 75.0);
        assert_eq!(SPAWN_COOLDOWN, 60);
        assert_eq!(SPAWN_INTERVAL, 60);
        assert_eq!(MAX_ON_FIELD, 10);
        assert_eq!(TIMEOUT_LIMIT, 5);
        assert_eq!(PROGRESSIVE_CAP, 5);
        assert_eq!(BET_PER_BALL, 5);
        assert_eq!(MAX_TICKS_PER_BALL, 600);
    }

    #[test]
    fn test_bumper_box_pinned() {
        assert_eq!(bumper::RADIUS, 0.4);
        assert_eq!((bumper::MIN_X, bumper::MAX_X), (1.5, 7.5));
        assert_eq!((bumper::MIN_Y, bumper::MAX_Y), (0.4, 3.5));
        assert_eq!(bumper::MAX_SPEED, 0.15);
        assert_eq!((bumper::START_X, bumper::START_Y), (4.5, 2.0));
    }

    #[test]
    fn test_bumper_box_inside_field() {
        assert!(bumper::MIN_X >= BALL_R);
        assert!(bumper::MAX_X <= FIELD - BALL_R);
        assert!(bumper::MAX_Y < FIELD / 2.0); // bumper patrols the upper half (y < FIELD/2)
    }
}
