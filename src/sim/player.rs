//! Player controller: look, collision-validated movement, scan gating

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::environment::Environment;
use crate::consts::*;
use crate::xz;

/// Scan episode + cooldown bookkeeping, owned by the player.
///
/// Invariant: `is_scanning` and `can_trigger` are never both true. A scan
/// may only start while `can_trigger` is set, which clears it immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanState {
    pub is_scanning: bool,
    /// Episode completion fraction; crosses 1.0 after `SCAN_DURATION`
    pub progress: f32,
    /// Sweep phase driving beam angles, advanced at `SCAN_SWEEP_RATE`
    pub sweep: f32,
    pub cooldown_elapsed: f32,
    pub can_trigger: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            is_scanning: false,
            progress: 0.0,
            sweep: 0.0,
            cooldown_elapsed: 0.0,
            can_trigger: true,
        }
    }
}

/// The player agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    /// Facing angle around the vertical axis; 0 looks down -Z
    pub yaw: f32,
    pub speed: f32,
    pub collision_radius: f32,
    pub scan: ScanState,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: Vec3::new(spawn.x, PLAYER_EYE_HEIGHT, spawn.y),
            yaw: 0.0,
            speed: PLAYER_SPEED,
            collision_radius: PLAYER_COLLISION_RADIUS,
            scan: ScanState::default(),
        }
    }

    /// Apply pointer motion to the facing angle
    pub fn turn(&mut self, delta: f32, sensitivity: f32) {
        self.yaw -= delta * sensitivity;
    }

    /// Attempt a move along local input axes (`x` strafe, `y` fwd/back with
    /// forward negative), rotated by the current facing. The displacement is
    /// committed atomically: a blocked candidate means no movement at all,
    /// no axis-separated sliding.
    pub fn try_move(&mut self, axes: Vec2, env: &Environment, dt: f32) -> bool {
        if axes == Vec2::ZERO {
            return false;
        }
        let local = Vec3::new(axes.x, 0.0, axes.y);
        let dir = (Quat::from_rotation_y(self.yaw) * local).normalize_or_zero();
        let candidate = self.pos + dir * self.speed * dt;

        let clearance = self.collision_radius * PLAYER_MOVE_MARGIN;
        if env.is_blocked(xz(candidate), clearance) {
            return false;
        }
        self.pos = candidate;
        true
    }

    /// Start a scan episode. Ignored while one is running or the cooldown
    /// has not re-armed; that is a normal occurrence, not an error.
    pub fn trigger_scan(&mut self) -> bool {
        if !self.scan.can_trigger || self.scan.is_scanning {
            return false;
        }
        self.scan.is_scanning = true;
        self.scan.progress = 0.0;
        self.scan.sweep = 0.0;
        self.scan.cooldown_elapsed = 0.0;
        self.scan.can_trigger = false;
        true
    }

    /// Advance an active scan episode. Returns true on the tick the episode
    /// completes (progress crossed 1.0) so the scanner can release its beams.
    pub fn tick_scan(&mut self, dt: f32) -> bool {
        if !self.scan.is_scanning {
            return false;
        }
        self.scan.progress += dt / SCAN_DURATION;
        self.scan.sweep += dt * SCAN_SWEEP_RATE;
        if self.scan.progress >= 1.0 {
            self.scan.is_scanning = false;
            self.scan.sweep = 0.0;
            return true;
        }
        false
    }

    /// Accumulate cooldown time; re-arms once `SCAN_COOLDOWN` has elapsed.
    /// The crossing depends on summed delta times, never on tick count.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.scan.can_trigger {
            return;
        }
        self.scan.cooldown_elapsed += dt;
        if self.scan.cooldown_elapsed >= SCAN_COOLDOWN && !self.scan.is_scanning {
            self.scan.can_trigger = true;
            self.scan.cooldown_elapsed = 0.0;
        }
    }

    /// Cooldown recharge fraction for the HUD bar, 0..1
    pub fn cooldown_fraction(&self) -> f32 {
        if self.scan.can_trigger {
            1.0
        } else {
            (self.scan.cooldown_elapsed / SCAN_COOLDOWN).min(1.0)
        }
    }
}
