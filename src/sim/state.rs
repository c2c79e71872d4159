//! Session state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::collision::Aabb;
use crate::consts::*;

/// Rejected at construction time; never surfaced mid-session.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("agent radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("dog scale must be positive, got {0}")]
    NonPositiveDogScale(f32),
    #[error("start speed must be positive, got {0}")]
    NonPositiveSpeed(f32),
    #[error("speedup rate must be non-negative, got {0}")]
    NegativeSpeedupRate(f32),
    #[error("scramble interval must be positive, got {0}")]
    NonPositiveScrambleInterval(f32),
    #[error("pen corners must trace an axis-aligned square")]
    NonSquarePen,
    #[error("fence pad {pad} must be non-negative and smaller than half the pen side {half_side}")]
    BadFencePad { pad: f32, half_side: f32 },
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No simulation update; rendering and input polling continue
    Paused,
    /// Active gameplay
    Running,
    /// A sheep breached the fence or the player quit (terminal)
    Ended,
}

/// One member of the flock
///
/// `vel` is always a unit cardinal direction; displacement per frame is
/// `vel * params.speed * dt`, so the global speed ramp reaches every sheep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sheep {
    pub pos: Vec2,
    pub vel: Vec2,
    /// True iff the sheep's box overlapped the dog's box last step.
    /// Keeps the repulsion edge-triggered across a continuous overlap.
    pub dog_latch: bool,
    /// Seconds since this sheep's direction was last scrambled
    pub since_scramble: f32,
}

impl Sheep {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            dog_latch: false,
            since_scramble: 0.0,
        }
    }

    /// Bounding box at the current position
    #[inline]
    pub fn aabb(&self, radius: f32) -> Aabb {
        Aabb::around(self.pos, radius)
    }
}

/// Shared simulation parameters, immutable per step except for `speed`
///
/// `speed` is the one field the step rewrites (it ramps linearly with
/// elapsed play time and never decreases).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub speed: f32,
    pub radius: f32,
    pub dog_scale: f32,
    pub speedup_rate: f32,
    pub scramble_interval: f32,
}

impl SimParams {
    pub fn new(
        radius: f32,
        dog_scale: f32,
        start_speed: f32,
        speedup_rate: f32,
        scramble_interval: f32,
    ) -> Result<Self, ConfigError> {
        if !(radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(radius));
        }
        if !(dog_scale > 0.0) {
            return Err(ConfigError::NonPositiveDogScale(dog_scale));
        }
        if !(start_speed > 0.0) {
            return Err(ConfigError::NonPositiveSpeed(start_speed));
        }
        if !(speedup_rate >= 0.0) {
            return Err(ConfigError::NegativeSpeedupRate(speedup_rate));
        }
        if !(scramble_interval > 0.0) {
            return Err(ConfigError::NonPositiveScrambleInterval(scramble_interval));
        }
        Ok(Self {
            speed: start_speed,
            radius,
            dog_scale,
            speedup_rate,
            scramble_interval,
        })
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            speed: START_SPEED,
            radius: SHEEP_RADIUS,
            dog_scale: DOG_SCALE,
            speedup_rate: SPEEDUP_RATE,
            scramble_interval: SCRAMBLE_INTERVAL,
        }
    }
}

/// The square pen, as four corners traced corner-to-corner, plus the inward
/// pad that trips the out-of-bounds check slightly before the fence line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    corners: [Vec2; 4],
    pad: f32,
}

impl Pen {
    const AXIS_TOL: f32 = 1e-6;

    /// Validates that the corners trace an axis-aligned square and that the
    /// pad fits inside it.
    pub fn new(corners: [Vec2; 4], pad: f32) -> Result<Self, ConfigError> {
        let mut side_len = 0.0f32;
        let mut prev_horizontal = None;
        for k in 0..4 {
            let side = corners[(k + 1) % 4] - corners[k];
            let horizontal = side.y.abs() < Self::AXIS_TOL;
            let vertical = side.x.abs() < Self::AXIS_TOL;
            // Each side runs along exactly one axis, alternating axes
            if horizontal == vertical {
                return Err(ConfigError::NonSquarePen);
            }
            if prev_horizontal == Some(horizontal) {
                return Err(ConfigError::NonSquarePen);
            }
            prev_horizontal = Some(horizontal);
            let len = side.x.abs().max(side.y.abs());
            if k == 0 {
                side_len = len;
            } else if (len - side_len).abs() > Self::AXIS_TOL {
                return Err(ConfigError::NonSquarePen);
            }
        }
        if side_len < Self::AXIS_TOL {
            return Err(ConfigError::NonSquarePen);
        }
        let half_side = side_len / 2.0;
        if !(0.0..half_side).contains(&pad) {
            return Err(ConfigError::BadFencePad { pad, half_side });
        }
        Ok(Self { corners, pad })
    }

    /// Axis-aligned square centered on the origin
    pub fn square(half_extent: f32, pad: f32) -> Result<Self, ConfigError> {
        Self::new(
            [
                Vec2::new(-half_extent, half_extent),
                Vec2::new(half_extent, half_extent),
                Vec2::new(half_extent, -half_extent),
                Vec2::new(-half_extent, -half_extent),
            ],
            pad,
        )
    }

    pub fn corners(&self) -> [Vec2; 4] {
        self.corners
    }

    pub fn pad(&self) -> f32 {
        self.pad
    }

    /// The four edge bands, each spanning corner-to-corner widened by `pad`
    /// on both ends and both sides.
    pub fn bands(&self, pad: f32) -> [Aabb; 4] {
        let pad = Vec2::splat(pad);
        std::array::from_fn(|k| {
            Aabb::from_corners(self.corners[k] - pad, self.corners[(k + 1) % 4] + pad)
        })
    }

    /// Edge bands at the out-of-bounds pad
    pub fn fence_bands(&self) -> [Aabb; 4] {
        self.bands(self.pad)
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            corners: [
                Vec2::new(-PEN_HALF_EXTENT, PEN_HALF_EXTENT),
                Vec2::new(PEN_HALF_EXTENT, PEN_HALF_EXTENT),
                Vec2::new(PEN_HALF_EXTENT, -PEN_HALF_EXTENT),
                Vec2::new(-PEN_HALF_EXTENT, -PEN_HALF_EXTENT),
            ],
            pad: FENCE_PAD,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct WorldState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub params: SimParams,
    pub pen: Pen,
    pub phase: SessionPhase,
    /// The flock, iterated in index order for determinism
    pub sheep: Vec<Sheep>,
    /// Dog position; tracks the pointer while running
    pub dog: Vec2,
    /// Accumulated unpaused play time - the score at game over
    pub survival_secs: f32,
    pub(crate) rng: Pcg32,
}

impl WorldState {
    /// New session with the built-in parameters. Starts paused.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimParams::default(), Pen::default())
    }

    /// New session with validated custom parameters
    pub fn with_config(seed: u64, params: SimParams, pen: Pen) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let sheep = spawn_flock(&mut rng, SHEEP_COUNT);
        Self {
            seed,
            params,
            pen,
            phase: SessionPhase::Paused,
            sheep,
            dog: DOG_START,
            survival_secs: 0.0,
            rng,
        }
    }
}

/// One of the four cardinal unit directions, uniformly at random
pub(crate) fn random_cardinal(rng: &mut Pcg32) -> Vec2 {
    match rng.random_range(0..4u32) {
        0 => Vec2::X,
        1 => Vec2::NEG_X,
        2 => Vec2::Y,
        _ => Vec2::NEG_Y,
    }
}

/// Sheep evenly spaced on a circle, each pointed a random cardinal way
fn spawn_flock(rng: &mut Pcg32, count: usize) -> Vec<Sheep> {
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU / count as f32 * i as f32;
            let pos = SPAWN_RADIUS * Vec2::new(angle.sin(), angle.cos());
            Sheep::new(pos, random_cardinal(rng))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDINALS: [Vec2; 4] = [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y];

    #[test]
    fn test_new_session_starts_paused() {
        let state = WorldState::new(7);
        assert_eq!(state.phase, SessionPhase::Paused);
        assert_eq!(state.sheep.len(), SHEEP_COUNT);
        assert_eq!(state.dog, DOG_START);
        assert_eq!(state.survival_secs, 0.0);
    }

    #[test]
    fn test_spawn_on_circle_with_cardinal_directions() {
        let state = WorldState::new(42);
        for sheep in &state.sheep {
            assert!((sheep.pos.length() - SPAWN_RADIUS).abs() < 1e-5);
            assert!(CARDINALS.contains(&sheep.vel));
            assert!(!sheep.dog_latch);
            assert_eq!(sheep.since_scramble, 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_flock() {
        let a = WorldState::new(99999);
        let b = WorldState::new(99999);
        assert_eq!(a.sheep, b.sheep);
    }

    #[test]
    fn test_random_cardinal_covers_all_directions() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let v = random_cardinal(&mut rng);
            let idx = CARDINALS.iter().position(|c| *c == v).expect("non-cardinal");
            seen[idx] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn test_params_validation() {
        assert!(SimParams::new(0.1, 1.0, 0.1, 0.1, 2.0).is_ok());
        assert!(matches!(
            SimParams::new(0.0, 1.0, 0.1, 0.1, 2.0),
            Err(ConfigError::NonPositiveRadius(_))
        ));
        assert!(matches!(
            SimParams::new(0.1, -1.0, 0.1, 0.1, 2.0),
            Err(ConfigError::NonPositiveDogScale(_))
        ));
        assert!(matches!(
            SimParams::new(0.1, 1.0, 0.1, -0.1, 2.0),
            Err(ConfigError::NegativeSpeedupRate(_))
        ));
    }

    #[test]
    fn test_pen_validation() {
        assert!(Pen::square(0.8, 0.1).is_ok());
        assert!(matches!(
            Pen::square(0.8, 0.9),
            Err(ConfigError::BadFencePad { .. })
        ));
        // Rectangle, not square
        let rect = [
            Vec2::new(-1.0, 0.5),
            Vec2::new(1.0, 0.5),
            Vec2::new(1.0, -0.5),
            Vec2::new(-1.0, -0.5),
        ];
        assert!(matches!(Pen::new(rect, 0.1), Err(ConfigError::NonSquarePen)));
        // Degenerate
        let point = [Vec2::ZERO; 4];
        assert!(matches!(Pen::new(point, 0.0), Err(ConfigError::NonSquarePen)));
    }

    #[test]
    fn test_fence_bands_geometry() {
        let pen = Pen::default();
        let bands = pen.fence_bands();
        // Top band spans the full padded width and hugs the top fence line
        assert_eq!(bands[0].min, Vec2::new(-0.9, 0.7));
        assert_eq!(bands[0].max, Vec2::new(0.9, 0.9));
        // Right band is normalized even though its corner pair arrives
        // top-to-bottom
        assert_eq!(bands[1].min, Vec2::new(0.7, -0.7));
        assert_eq!(bands[1].max, Vec2::new(0.9, 0.7));
    }
}
