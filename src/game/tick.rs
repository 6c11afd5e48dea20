//! The Simulation Tick
//!
//! One tick runs the phases below in a fixed order; the order is part of
//! the protocol because the RNG advances per labelled event. Reordering
//! any two phases (or any two draws inside a phase) breaks every
//! recorded replay.
//!
//! ```text
//!  1. finished guard            9. bumper collisions
//!  2. advance tick / cooldown  10. center recharge
//!  3. apply input              11. goals + explosive chains
//!  4. move bumper              12. ball-ball collisions
//!  5. bind RNG context         13. timeout tally
//!  6. append input record      14. compact dead balls
//!  7. spawn                    15. auto-collect specials
//!  8. integrate + walls        16. game end
//! ```
//!
//! The engine cannot fail: it is a pure function of the seed, the tick
//! number and the bumper targets. Replay bounds live one layer up, in
//! the protocol module.

use std::f64::consts::PI;

use crate::core::geom::{dist, fp_round};
use crate::game::collision::{ball_collisions, bumper_collisions, jitter, unit_normal};
use crate::game::config::{
    self, bumper, BALL_R, CENTER_R, CENTER_X, CENTER_Y, COUNTDOWN, EXPLOSIVE_CHANCE, FIELD,
    GOAL_R, GOLDEN_CHANCE, MAX_ON_FIELD, SPAWN_INTERVAL, SPEED,
};
use crate::game::events::{GoalSide, TickEvent, TickEventData};
use crate::game::state::{Ball, BallKind, Bumper, GameState, InputRecord, InputTarget};

/// Run one simulation tick.
///
/// `bumper_target`, when present, replaces the steering target before
/// the bumper moves. Returns the events observed this tick, in the
/// order they occurred.
pub fn tick(state: &mut GameState, bumper_target: Option<InputTarget>) -> Vec<TickEvent> {
    // 1. Finished games are inert.
    if state.finished {
        return Vec::new();
    }

    let mut events = Vec::new();

    // 2. Advance the clock.
    state.tick_count += 1;
    if state.spawn_cooldown > 0 {
        state.spawn_cooldown -= 1;
    }

    // 3. Apply input (clamped into the bumper box).
    if let Some(target) = bumper_target {
        let (tx, ty) = Bumper::clamp_target(target.x, target.y);
        state.bumper.target_x = tx;
        state.bumper.target_y = ty;
    }

    // 4. Move the bumper toward its target.
    move_bumper(&mut state.bumper);

    // 5. Bind the RNG to (tick, settled bumper position). Every draw
    //    from here on is a function of the position the player
    //    committed to.
    state
        .rng
        .set_tick_context(state.tick_count, state.bumper.x, state.bumper.y);

    // 6. Record the input in force this tick.
    state.input_log.push(InputRecord {
        tick: state.tick_count,
        target: InputTarget {
            x: state.bumper.target_x,
            y: state.bumper.target_y,
        },
    });

    // 7. Spawn.
    maybe_spawn(state, &mut events);

    // 8. Integrate, bounce off walls, decay values.
    update_balls(state, &mut events);

    // 9. Bumper collisions.
    bumper_collisions(state, &mut events);

    // 10. Center recharge.
    center_recharge(state, &mut events);

    // 11. Goals and explosive chains.
    process_goals(state, &mut events);

    // 12. Ball-ball collisions.
    ball_collisions(state, &mut events);

    // 13. Timeout tally.
    timeout_tally(state, &mut events);

    // 14. Compact.
    state.balls.retain(|b| b.alive);

    // 15. Auto-collect: a field of only specials pays out immediately.
    auto_collect(state, &mut events);

    // 16. End of game.
    if state.balls_spawned == state.num_balls && state.balls.is_empty() {
        state.finished = true;
        events.push(TickEvent::new(
            state.tick_count,
            TickEventData::GameEnd {
                total_win: state.total_win,
            },
        ));
    }

    events
}

/// Step the bumper toward its target, at most `MAX_SPEED` per tick.
fn move_bumper(pad: &mut Bumper) {
    let vx = pad.target_x - pad.x;
    let vy = pad.target_y - pad.y;
    let len = (vx * vx + vy * vy).sqrt();
    if len > bumper::MAX_SPEED {
        pad.x = fp_round(pad.x + vx / len * bumper::MAX_SPEED);
        pad.y = fp_round(pad.y + vy / len * bumper::MAX_SPEED);
    } else {
        pad.x = pad.target_x;
        pad.y = pad.target_y;
    }
}

/// Spawn one ball when the cadence, the field cap and the budget allow.
fn maybe_spawn(state: &mut GameState, events: &mut Vec<TickEvent>) {
    if state.tick_count % SPAWN_INTERVAL != 0
        || state.balls.len() >= MAX_ON_FIELD
        || state.spawn_cooldown > 0
        || state.balls_spawned >= state.num_balls
    {
        return;
    }

    let r_x = state.rng.next_double("spawn_x");
    let r_angle = state.rng.next_double("spawn_angle");
    let r_type = state.rng.next_double("spawn_type");

    let x = fp_round(0.5 + r_x * 8.0);
    let y = FIELD - 0.3;

    // Downward fan: 220..320 degrees.
    let angle = (220.0 + r_angle * 100.0) * PI / 180.0;
    let dx = fp_round(angle.cos() * SPEED);
    let dy = fp_round(angle.sin() * SPEED);

    let kind = if r_type < GOLDEN_CHANCE {
        BallKind::Golden
    } else if r_type < GOLDEN_CHANCE + EXPLOSIVE_CHANCE {
        BallKind::Explosive
    } else {
        BallKind::Normal
    };

    let id = state.next_ball_id;
    state.next_ball_id += 1;
    state.balls.push(Ball {
        id,
        x,
        y,
        dx,
        dy,
        value: 9,
        ticks_since_countdown: 0,
        kind,
        multiplier: kind.multiplier(),
        alive: true,
        died_from_timeout: false,
    });
    state.balls_spawned += 1;
    state.spawn_cooldown = config::SPAWN_COOLDOWN;

    events.push(TickEvent::new(
        state.tick_count,
        TickEventData::Spawn { id, kind, x, y },
    ));
}

/// Integrate positions, reflect off walls, run the value countdown, and
/// jitter wall bounces.
fn update_balls(state: &mut GameState, events: &mut Vec<TickEvent>) {
    let GameState {
        balls,
        rng,
        tick_count,
        ..
    } = state;

    for ball in balls.iter_mut() {
        if !ball.alive {
            continue;
        }

        ball.ticks_since_countdown += 1;

        ball.x = fp_round(ball.x + ball.dx);
        ball.y = fp_round(ball.y + ball.dy);

        // Wall reflection, each axis independently: snap back to the
        // rim and negate that component.
        let mut hit_wall = false;
        if ball.x < BALL_R {
            ball.x = BALL_R;
            ball.dx = -ball.dx;
            hit_wall = true;
        } else if ball.x > FIELD - BALL_R {
            ball.x = FIELD - BALL_R;
            ball.dx = -ball.dx;
            hit_wall = true;
        }
        if ball.y < BALL_R {
            ball.y = BALL_R;
            ball.dy = -ball.dy;
            hit_wall = true;
        } else if ball.y > FIELD - BALL_R {
            ball.y = FIELD - BALL_R;
            ball.dy = -ball.dy;
            hit_wall = true;
        }

        // Value countdown; only normal balls decay.
        if ball.kind.is_normal() && ball.ticks_since_countdown >= COUNTDOWN && ball.value > 0 {
            ball.value -= 1;
            ball.ticks_since_countdown = 0;
            if ball.value == 0 {
                ball.alive = false;
                ball.died_from_timeout = true;
                events.push(TickEvent::new(
                    *tick_count,
                    TickEventData::Timeout { id: ball.id },
                ));
            }
        }

        // Bounce randomisation, only for survivors.
        if ball.alive && hit_wall {
            let r = rng.next_double(&format!("wall_{}", ball.id));
            (ball.dx, ball.dy) = jitter(ball.dx, ball.dy, r);
        }
    }
}

/// Balls crossing the center disc are relaunched outward; normal balls
/// also get their value restored.
fn center_recharge(state: &mut GameState, events: &mut Vec<TickEvent>) {
    let GameState {
        balls,
        rng,
        tick_count,
        ..
    } = state;

    for ball in balls.iter_mut() {
        if !ball.alive {
            continue;
        }
        let d = dist(ball.x, ball.y, CENTER_X, CENTER_Y);
        if d >= CENTER_R + BALL_R {
            continue;
        }

        let (nx, ny) = unit_normal(CENTER_X, CENTER_Y, ball.x, ball.y, d);
        ball.dx = fp_round(nx * SPEED);
        ball.dy = fp_round(ny * SPEED);

        let r = rng.next_double(&format!("center_{}", ball.id));
        (ball.dx, ball.dy) = jitter(ball.dx, ball.dy, r);

        if ball.kind.is_normal() && ball.value < 9 {
            ball.value = 9;
            ball.ticks_since_countdown = 0;
            events.push(TickEvent::new(
                *tick_count,
                TickEventData::Recharge { id: ball.id },
            ));
        }
    }
}

/// Score balls that reached a goal; explosive scorers detonate and
/// collect every other live ball in the upper half.
fn process_goals(state: &mut GameState, events: &mut Vec<TickEvent>) {
    for i in 0..state.balls.len() {
        if !state.balls[i].alive {
            continue;
        }
        let d_left = dist(state.balls[i].x, state.balls[i].y, 0.0, 0.0);
        let d_right = dist(state.balls[i].x, state.balls[i].y, FIELD, 0.0);
        if d_left >= GOAL_R && d_right >= GOAL_R {
            continue;
        }
        let side = if d_left < GOAL_R {
            GoalSide::Left
        } else {
            GoalSide::Right
        };

        let prize = state.balls[i].prize(state.progressive);
        state.total_win += prize;
        state.balls[i].alive = false;

        let kind = state.balls[i].kind;
        if kind == BallKind::Golden {
            state.timeout_count = 0;
        }
        state.bump_progressive();

        events.push(TickEvent::new(
            state.tick_count,
            TickEventData::Goal {
                id: state.balls[i].id,
                side,
                prize,
            },
        ));

        // Chain: victims in insertion order, progressive bumped per
        // victim, so later victims score at a higher multiplier.
        if kind == BallKind::Explosive {
            state.timeout_count = 0;
            for v in 0..state.balls.len() {
                if v == i || !state.balls[v].alive {
                    continue;
                }
                if state.balls[v].y >= FIELD / 2.0 {
                    continue;
                }
                let victim_prize = state.balls[v].prize(state.progressive);
                state.total_win += victim_prize;
                state.bump_progressive();
                state.balls[v].alive = false;
                events.push(TickEvent::new(
                    state.tick_count,
                    TickEventData::Exploded {
                        id: state.balls[v].id,
                        prize: victim_prize,
                    },
                ));
            }
        }
    }
}

/// Count timeout deaths; a full streak resets the progressive.
fn timeout_tally(state: &mut GameState, events: &mut Vec<TickEvent>) {
    for i in 0..state.balls.len() {
        if state.balls[i].alive || !state.balls[i].died_from_timeout {
            continue;
        }
        state.balls[i].died_from_timeout = false;
        state.timeout_count += 1;
        if state.timeout_count >= config::TIMEOUT_LIMIT {
            state.progressive = 1;
            state.timeout_count = 0;
            events.push(TickEvent::new(
                state.tick_count,
                TickEventData::ProgressiveReset,
            ));
        }
    }
}

/// When only golden/explosive balls remain they cannot decay, so they
/// are paid out as if each reached a goal, and the field clears.
fn auto_collect(state: &mut GameState, events: &mut Vec<TickEvent>) {
    if state.balls.is_empty() || state.balls.iter().any(|b| b.kind.is_normal()) {
        return;
    }
    for i in 0..state.balls.len() {
        let prize = state.balls[i].prize(state.progressive);
        state.total_win += prize;
        state.bump_progressive();
        events.push(TickEvent::new(
            state.tick_count,
            TickEventData::AutoCollect {
                id: state.balls[i].id,
                prize,
            },
        ));
    }
    state.balls.clear();
}

// =============================================================================
// TESTS
// =============================================================================
