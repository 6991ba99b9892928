//! Darkfield - a pitch-black first-person exploration game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, monster AI, LIDAR scanning)
//! - `settings`: User preferences persisted as JSON
//!
//! The crate is headless: a presentation layer feeds it input snapshots and
//! frame timestamps, and reads back a [`sim::Frame`] each tick. Nothing in
//! here touches a display surface.

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Maximum wall-clock delta applied per tick (seconds). Prevents
    /// tunneling after a long stall (tab backgrounded, debugger pause).
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Obstacle field
    pub const FIELD_HALF_EXTENT: f32 = 50.0;
    pub const WALL_COUNT: usize = 20;
    pub const WALL_HEIGHT: f32 = 3.0;
    pub const WALL_DEPTH: f32 = 0.5;
    pub const WALL_MIN_WIDTH: f32 = 5.0;
    pub const WALL_MAX_WIDTH: f32 = 15.0;
    pub const POLE_COUNT: usize = 100;
    pub const POLE_RADIUS: f32 = 0.2;
    pub const POLE_MIN_HEIGHT: f32 = 5.0;
    pub const POLE_MAX_HEIGHT: f32 = 10.0;

    /// Escape ship: placed at a random bearing at this distance from origin
    pub const SHIP_DISTANCE: f32 = 50.0;
    /// Reaching this distance from the ship center wins the run
    pub const SHIP_RADIUS: f32 = 3.0;
    /// Hull radius used by the scan ray cast
    pub const SHIP_SCAN_RADIUS: f32 = 2.0;
    pub const SHIP_CENTER_HEIGHT: f32 = 1.0;

    /// Player defaults
    pub const PLAYER_EYE_HEIGHT: f32 = 1.6;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_COLLISION_RADIUS: f32 = 0.5;
    /// Soft clearance multiplier for per-tick movement
    pub const PLAYER_MOVE_MARGIN: f32 = 1.2;
    /// Hard clearance multiplier for spawn validation
    pub const SPAWN_MARGIN: f32 = 2.0;
    pub const SPAWN_RADIUS: f32 = 20.0;
    pub const SPAWN_MAX_ATTEMPTS: u32 = 50;

    /// Scan timing
    pub const SCAN_COOLDOWN: f32 = 2.0;
    pub const SCAN_DURATION: f32 = 2.0;
    /// Full vertical sweeps per second while scanning
    pub const SCAN_SWEEP_RATE: f32 = 0.5;

    /// Scan geometry
    pub const SCAN_BEAM_COUNT: usize = 12;
    pub const SCAN_BEAM_LENGTH: f32 = 100.0;
    pub const MAX_SCAN_DISTANCE: f32 = 80.0;
    pub const MIN_SCAN_DISTANCE: f32 = 5.0;
    /// Bounded angular jitter per beam (radians)
    pub const SCAN_BEAM_NOISE: f32 = 0.02;
    pub const HORIZONTAL_SCAN_RANGE: f32 = std::f32::consts::PI;
    pub const VERTICAL_SCAN_RANGE: f32 = std::f32::consts::FRAC_PI_2;

    /// Return density: `base * falloff^(10 * normalized_distance)`, floored
    pub const SCAN_DENSITY_BASE: f32 = 1.0;
    pub const SCAN_DENSITY_FALLOFF: f32 = 0.8;
    pub const SCAN_DENSITY_MIN: f32 = 0.05;

    /// Seconds a scan return stays alive
    pub const SCAN_DECAY: f32 = 10.0;
    /// Cap on live returns; oldest are evicted first
    pub const MAX_SCAN_RETURNS: usize = 4096;

    /// Monster defaults
    pub const MONSTER_SPAWN: Vec2 = Vec2::new(10.0, 10.0);
    pub const MONSTER_CENTER_HEIGHT: f32 = 1.0;
    pub const MONSTER_RADIUS: f32 = 1.0;
    pub const MONSTER_COLLISION_RADIUS: f32 = 1.0;
    pub const MONSTER_BASE_SPEED: f32 = 1.2;
    pub const MONSTER_FLEE_SPEED: f32 = 2.4;
    pub const MONSTER_ATTACK_SPEED: f32 = 3.0;
    pub const MONSTER_MOVE_MARGIN: f32 = 1.0;
    pub const STALKING_DISTANCE: f32 = 15.0;
    pub const FLEE_DURATION: f32 = 5.0;

    /// Path planning
    pub const PATH_UPDATE_INTERVAL: f32 = 1.0;
    pub const PATH_POINT_DISTANCE: f32 = 5.0;
    pub const PATH_MAX_STEPS: u32 = 10;
    pub const PATH_SIDESTEP_ATTEMPTS: u32 = 5;
    pub const WAYPOINT_ARRIVAL: f32 = 1.0;

    /// Indicator thresholds
    pub const INDICATOR_SHIP_NEAR: f32 = 30.0;
    pub const INDICATOR_SHIP_VERY_NEAR: f32 = 10.0;
    pub const INDICATOR_MONSTER_RANGE: f32 = 20.0;
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Horizontal (ground-plane) distance between two world positions
#[inline]
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    xz(a).distance(xz(b))
}

/// Forward direction for a yaw angle. Yaw 0 looks down -Z; positive yaw
/// turns left, matching the pointer-look convention of the presentation.
#[inline]
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}
