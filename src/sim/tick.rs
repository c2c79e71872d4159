//! Per-frame simulation step
//!
//! One synchronous pass over the whole flock per frame, in this order:
//! pause/quit handling, scramble timers, position integration, sheep-sheep
//! contact resolution (ascending index pairs, outer loop over the higher
//! index), dog repulsion, fence check, speed ramp.
//!
//! `dt` is the raw wall-clock delta since the previous frame, deliberately
//! unclamped: a pathologically long frame produces a correspondingly large
//! position jump. Scrambles and the contact rewind run against the same
//! velocity the integration used, so the rewind reconstructs the exact
//! pre-step positions.

use glam::Vec2;

use super::collision::Aabb;
use super::state::{SessionPhase, Sheep, WorldState, random_cardinal};
use crate::consts::DOG_START;

/// Velocity sums below this count as exactly opposite (head-on)
const HEAD_ON_EPS: f32 = 1e-5;
/// Velocity-axis components below this are too small to divide by
const AXIS_EPS: f32 = 1e-5;

/// Input sampled by the shell for a single frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Pointer position in normalized device coordinates, roughly [-1, 1]
    pub pointer: Vec2,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Quit request (one-shot)
    pub quit: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            pointer: DOG_START,
            pause: false,
            quit: false,
        }
    }
}

/// Advance the session by one frame
pub fn tick(state: &mut WorldState, input: &FrameInput, dt: f32) {
    if input.pause {
        state.phase = match state.phase {
            SessionPhase::Paused => SessionPhase::Running,
            SessionPhase::Running => SessionPhase::Paused,
            SessionPhase::Ended => SessionPhase::Ended,
        };
    }
    if state.phase != SessionPhase::Running {
        return;
    }
    if input.quit {
        state.phase = SessionPhase::Ended;
        log::info!("quit after {:.2}s", state.survival_secs);
        return;
    }

    state.survival_secs += dt;
    state.dog = input.pointer;

    let speed = state.params.speed;
    let radius = state.params.radius;

    // Scramble timers run before integration so a fresh direction moves the
    // sheep this frame and the contact rewind below stays exact.
    for sheep in state.sheep.iter_mut() {
        sheep.since_scramble += dt;
        if sheep.since_scramble >= state.params.scramble_interval {
            sheep.vel = random_cardinal(&mut state.rng);
            sheep.since_scramble = 0.0;
        }
        sheep.pos += sheep.vel * speed * dt;
    }

    // Sheep-sheep contacts: each later-indexed sheep against every earlier one
    for i in 1..state.sheep.len() {
        let (head, tail) = state.sheep.split_at_mut(i);
        let high = &mut tail[0];
        for low in head.iter_mut() {
            resolve_contact(low, high, speed, radius, dt);
        }
    }

    // Dog repulsion, edge-triggered by the per-sheep latch
    let dog_box = Aabb::around(state.dog, radius * state.params.dog_scale);
    for sheep in state.sheep.iter_mut() {
        if sheep.aabb(radius).overlaps(&dog_box) {
            if !sheep.dog_latch {
                sheep.vel = -sheep.vel;
                sheep.dog_latch = true;
            }
        } else {
            sheep.dog_latch = false;
        }
    }

    // Any sheep touching a fence band ends the session
    let fence = state.pen.fence_bands();
    let breached = state
        .sheep
        .iter()
        .any(|s| fence.iter().any(|band| s.aabb(radius).overlaps(band)));
    if breached {
        state.phase = SessionPhase::Ended;
        log::info!("a sheep breached the fence after {:.2}s", state.survival_secs);
        return;
    }

    state.params.speed += state.params.speedup_rate * dt;
}

/// Resolve one overlapping pair
///
/// Both sheep are first rewound to their pre-integration positions, which
/// separates the pair and guarantees a contact is handled exactly once.
/// Exactly opposite velocities invert both (head-on); otherwise the sheep
/// that would have reached the contact point later rams the one that got
/// there first, handing over its velocity and bouncing back itself.
fn resolve_contact(low: &mut Sheep, high: &mut Sheep, speed: f32, radius: f32, dt: f32) {
    if !high.aabb(radius).overlaps(&low.aabb(radius)) {
        return;
    }

    high.pos -= high.vel * speed * dt;
    low.pos -= low.vel * speed * dt;

    let head_on = {
        let sum = low.vel + high.vel;
        sum.x.abs() < HEAD_ON_EPS && sum.y.abs() < HEAD_ON_EPS
    };
    if head_on {
        low.vel = -low.vel;
        high.vel = -high.vel;
        return;
    }

    // T-bone: time each sheep needs to cover the separation along its own
    // motion axis. A near-zero axis component has no usable time; the pair
    // then degrades to the head-on resolution.
    let sep = low.pos - high.pos;
    let (Some(t_low), Some(t_high)) = (
        axis_time(low.vel, -sep, speed),
        axis_time(high.vel, sep, speed),
    ) else {
        low.vel = -low.vel;
        high.vel = -high.vel;
        return;
    };

    // Earlier arrival is the rammed sheep; ties favor the lower index
    let (rammed, rammer) = if t_low <= t_high {
        (low, high)
    } else {
        (high, low)
    };
    let ram_vel = rammer.vel;
    rammed.vel = ram_vel;
    rammer.vel = -ram_vel;
}

/// Signed time for an axis-bound mover to cover `sep` along its motion axis
fn axis_time(vel: Vec2, sep: Vec2, speed: f32) -> Option<f32> {
    let (v, d) = if vel.x.abs() >= vel.y.abs() {
        (vel.x * speed, sep.x)
    } else {
        (vel.y * speed, sep.y)
    };
    if v.abs() < AXIS_EPS {
        None
    } else {
        Some(d / v)
    }
}
