//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by flock index)
//! - No rendering or platform dependencies
//!
//! The step runs on the raw frame delta, not a fixed timestep: an unbounded
//! `dt` is part of the game's contract (see `tick`).

pub mod collision;
pub mod draw;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use draw::{DrawRect, palette, scene};
pub use state::{ConfigError, Pen, SessionPhase, Sheep, SimParams, WorldState};
pub use tick::{FrameInput, tick};
