//! Collision Resolution
//!
//! The bumper reflection pass and the ball-ball pair scan. Both run in
//! insertion order and draw labelled randomness, so their ordering is
//! part of the replay contract.

use std::f64::consts::PI;

use crate::core::geom::{clamp, dist, fp_round, rotate};
use crate::game::config::{bumper, BALL_R, FIELD, SPEED};
use crate::game::events::{TickEvent, TickEventData};
use crate::game::state::GameState;

/// Rotate a velocity by the bounce-randomisation angle `(r - 0.5) * 0.1π`
/// and pin both components. Used by every jitter draw in the engine.
#[inline]
pub(crate) fn jitter(dx: f64, dy: f64, r: f64) -> (f64, f64) {
    let (ndx, ndy) = rotate(dx, dy, (r - 0.5) * 0.1 * PI);
    (fp_round(ndx), fp_round(ndy))
}

/// Unit vector from `(fx, fy)` toward `(tx, ty)`, or `(1, 0)` when the
/// points coincide.
#[inline]
pub(crate) fn unit_normal(fx: f64, fy: f64, tx: f64, ty: f64, d: f64) -> (f64, f64) {
    if d > 0.0 {
        ((tx - fx) / d, (ty - fy) / d)
    } else {
        (1.0, 0.0)
    }
}

/// Keep a position inside the playable square.
#[inline]
fn clamp_to_field(v: f64) -> f64 {
    clamp(v, BALL_R, FIELD - BALL_R)
}

// =============================================================================
// BUMPER COLLISIONS
// =============================================================================

/// Reflect every ball overlapping the bumper, snap it to the rim, then
/// jitter its direction with a `bumper_{id}` draw.
pub(crate) fn bumper_collisions(state: &mut GameState, events: &mut Vec<TickEvent>) {
    let GameState {
        balls,
        rng,
        bumper: pad,
        tick_count,
        ..
    } = state;

    for ball in balls.iter_mut() {
        if !ball.alive {
            continue;
        }
        let d = dist(ball.x, ball.y, pad.x, pad.y);
        let reach = BALL_R + bumper::RADIUS;
        if d >= reach || d <= 0.0 {
            continue;
        }

        let (nx, ny) = ((ball.x - pad.x) / d, (ball.y - pad.y) / d);

        // Reflect: v' = v - 2 (v . n) n
        let dot = ball.dx * nx + ball.dy * ny;
        ball.dx = fp_round(ball.dx - 2.0 * dot * nx);
        ball.dy = fp_round(ball.dy - 2.0 * dot * ny);

        // Snap to the rim, kept inside the field.
        ball.x = clamp_to_field(fp_round(pad.x + nx * reach));
        ball.y = clamp_to_field(fp_round(pad.y + ny * reach));

        let r = rng.next_double(&format!("bumper_{}", ball.id));
        (ball.dx, ball.dy) = jitter(ball.dx, ball.dy, r);

        events.push(TickEvent::new(
            *tick_count,
            TickEventData::BumperHit { id: ball.id },
        ));
    }
}

// =============================================================================
// BALL-BALL COLLISIONS
// =============================================================================

/// Upper-triangle pair scan over the ball list.
///
/// Pair labels use the list indices `i`/`j` (not ball ids); a pair is
/// processed only while both balls are still alive, so earlier kills in
/// the same pass shadow later pairs.
pub(crate) fn ball_collisions(state: &mut GameState, events: &mut Vec<TickEvent>) {
    let len = state.balls.len();

    for i in 0..len {
        for j in (i + 1)..len {
            if !state.balls[i].alive || !state.balls[j].alive {
                continue;
            }
            let d = dist(
                state.balls[i].x,
                state.balls[i].y,
                state.balls[j].x,
                state.balls[j].y,
            );
            if d >= 2.0 * BALL_R {
                continue;
            }

            let special_i = !state.balls[i].kind.is_normal();
            let special_j = !state.balls[j].kind.is_normal();

            match (special_i, special_j) {
                (true, true) => resolve_elastic(state, i, j, d),
                (true, false) => resolve_special_wins(state, events, i, j),
                (false, true) => resolve_special_wins(state, events, j, i),
                (false, false) => {
                    if state.balls[i].value == state.balls[j].value {
                        resolve_coin_flip(state, events, i, j);
                    } else {
                        resolve_value_duel(state, events, i, j, d);
                    }
                }
            }
        }
    }
}

/// Two specials bounce elastically: resolve the overlap, launch each
/// along the contact normal at full speed, jitter both. No credit
/// changes hands and no event is emitted.
fn resolve_elastic(state: &mut GameState, i: usize, j: usize, d: f64) {
    let GameState { balls, rng, .. } = state;
    let (head, tail) = balls.split_at_mut(j);
    let b1 = &mut head[i];
    let b2 = &mut tail[0];

    let (nx, ny) = unit_normal(b1.x, b1.y, b2.x, b2.y, d);

    // Nudge each out by half the overlap, staying on the field.
    if d > 0.0 {
        let half = (2.0 * BALL_R - d) / 2.0;
        b1.x = clamp_to_field(fp_round(b1.x - nx * half));
        b1.y = clamp_to_field(fp_round(b1.y - ny * half));
        b2.x = clamp_to_field(fp_round(b2.x + nx * half));
        b2.y = clamp_to_field(fp_round(b2.y + ny * half));
    }

    b1.dx = fp_round(-nx * SPEED);
    b1.dy = fp_round(-ny * SPEED);
    b2.dx = fp_round(nx * SPEED);
    b2.dy = fp_round(ny * SPEED);

    let r1 = rng.next_double(&format!("coll_{}_{}_1", i, j));
    (b1.dx, b1.dy) = jitter(b1.dx, b1.dy, r1);
    let r2 = rng.next_double(&format!("coll_{}_{}_2", i, j));
    (b2.dx, b2.dy) = jitter(b2.dx, b2.dy, r2);
}

/// A special meets a normal: the normal dies for a single credit.
fn resolve_special_wins(
    state: &mut GameState,
    events: &mut Vec<TickEvent>,
    special: usize,
    normal: usize,
) {
    state.balls[normal].alive = false;
    state.total_win += 1;
    events.push(TickEvent::new(
        state.tick_count,
        TickEventData::Collision {
            winner: state.balls[special].id,
            loser: state.balls[normal].id,
            prize: 1,
        },
    ));
}

/// Equal-value normals: double the value, flip a coin for the survivor.
fn resolve_coin_flip(state: &mut GameState, events: &mut Vec<TickEvent>, i: usize, j: usize) {
    let prize = state.balls[i].value as u64 * 2;
    state.total_win += prize;

    let r = state.rng.next_double(&format!("double_{}_{}", i, j));
    let (winner, loser) = if r < 0.5 { (i, j) } else { (j, i) };
    state.balls[loser].alive = false;

    events.push(TickEvent::new(
        state.tick_count,
        TickEventData::Collision {
            winner: state.balls[winner].id,
            loser: state.balls[loser].id,
            prize,
        },
    ));
}

/// Unequal normals: the lower value dies, the winner flees the corpse.
fn resolve_value_duel(
    state: &mut GameState,
    events: &mut Vec<TickEvent>,
    i: usize,
    j: usize,
    d: f64,
) {
    let (winner, loser) = if state.balls[i].value > state.balls[j].value {
        (i, j)
    } else {
        (j, i)
    };

    state.total_win += 1;
    state.balls[loser].alive = false;

    let (lx, ly) = (state.balls[loser].x, state.balls[loser].y);

    let GameState { balls, rng, .. } = state;
    let w = &mut balls[winner];
    let (nx, ny) = unit_normal(lx, ly, w.x, w.y, d);
    w.dx = fp_round(nx * SPEED);
    w.dy = fp_round(ny * SPEED);

    let r = rng.next_double(&format!("win_{}", w.id));
    (w.dx, w.dy) = jitter(w.dx, w.dy, r);

    events.push(TickEvent::new(
        state.tick_count,
        TickEventData::Collision {
            winner: state.balls[winner].id,
            loser: state.balls[loser].id,
            prize: 1,
        },
    ));
}

// =============================================================================
// TESTS
// =============================================================================
