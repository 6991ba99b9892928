//! Static world model: obstacle field, escape ship, spatial queries
//!
//! Generated once at startup from the run seed and structurally immutable
//! afterwards. Movement asks `is_blocked`, spawning asks `find_safe_spawn`,
//! and the scanner asks `cast_ray`; nothing mutates the obstacle set.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom;
use crate::consts::*;

/// A rotated rectangular wall. Height matters only to the ray cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub center: Vec2,
    pub half_extent: Vec2,
    pub height: f32,
    pub yaw: f32,
}

/// A thin vertical pole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pole {
    pub center: Vec2,
    pub radius: f32,
    pub height: f32,
}

/// The escape ship: reaching it wins the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec3,
}

/// What a scan ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    Ground,
    Wall,
    Pole,
    Monster,
    Ship,
}

/// Nearest intersection found by [`Environment::cast_ray`]
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub target: HitTarget,
}

/// The generated world. Collections are exposed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    walls: Vec<Wall>,
    poles: Vec<Pole>,
    ship: Ship,
}

impl Environment {
    /// Generate the obstacle field and ship placement from the run RNG
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut walls = Vec::with_capacity(WALL_COUNT);
        for _ in 0..WALL_COUNT {
            let width = rng.random_range(WALL_MIN_WIDTH..WALL_MAX_WIDTH);
            walls.push(Wall {
                center: Vec2::new(
                    rng.random_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                    rng.random_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                ),
                half_extent: Vec2::new(width / 2.0, WALL_DEPTH / 2.0),
                height: WALL_HEIGHT,
                yaw: rng.random_range(0.0..std::f32::consts::PI),
            });
        }

        let mut poles = Vec::with_capacity(POLE_COUNT);
        for _ in 0..POLE_COUNT {
            poles.push(Pole {
                center: Vec2::new(
                    rng.random_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                    rng.random_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                ),
                radius: POLE_RADIUS,
                height: rng.random_range(POLE_MIN_HEIGHT..POLE_MAX_HEIGHT),
            });
        }

        let bearing = rng.random_range(0.0..std::f32::consts::TAU);
        let ship = Ship {
            pos: Vec3::new(
                bearing.cos() * SHIP_DISTANCE,
                SHIP_CENTER_HEIGHT,
                bearing.sin() * SHIP_DISTANCE,
            ),
        };

        log::info!(
            "Generated environment: {} walls, {} poles, ship at ({:.1}, {:.1})",
            walls.len(),
            poles.len(),
            ship.pos.x,
            ship.pos.z
        );

        Self { walls, poles, ship }
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn poles(&self) -> &[Pole] {
        &self.poles
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    /// True if a candidate ground-plane position collides with any obstacle.
    ///
    /// `clearance` is the caller's collision radius times its margin; player
    /// movement, monster movement, and spawn validation each pass their own.
    pub fn is_blocked(&self, pos: Vec2, clearance: f32) -> bool {
        for wall in &self.walls {
            if geom::point_in_rotated_rect(pos, wall.center, wall.half_extent, wall.yaw, clearance)
            {
                return true;
            }
        }
        for pole in &self.poles {
            if geom::point_in_circle(pos, pole.center, pole.radius + clearance) {
                return true;
            }
        }
        false
    }

    /// Rejection-sample an unblocked position within `spawn_radius` of the
    /// origin. Falls back to the origin after `max_attempts` failures; that
    /// is degraded, not fatal.
    pub fn find_safe_spawn(
        &self,
        rng: &mut impl Rng,
        max_attempts: u32,
        spawn_radius: f32,
        clearance: f32,
    ) -> Vec2 {
        for _ in 0..max_attempts {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let distance = rng.random::<f32>() * spawn_radius;
            let candidate = Vec2::new(angle.cos() * distance, angle.sin() * distance);
            if !self.is_blocked(candidate, clearance) {
                return candidate;
            }
        }
        log::warn!("no safe spawn position found after {max_attempts} attempts, using origin");
        Vec2::ZERO
    }

    /// Cast a ray against the union of ground, walls, poles, ship, and the
    /// monster, returning only the nearest hit. `dir` must be normalized.
    pub fn cast_ray(&self, origin: Vec3, dir: Vec3, monster_center: Vec3) -> Option<RayHit> {
        let mut best: Option<(f32, HitTarget)> = None;
        let mut consider = |t: Option<f32>, target: HitTarget| {
            if let Some(t) = t {
                if best.is_none_or(|(best_t, _)| t < best_t) {
                    best = Some((t, target));
                }
            }
        };

        consider(geom::ray_ground(origin, dir), HitTarget::Ground);
        for wall in &self.walls {
            consider(
                geom::ray_rotated_box(
                    origin,
                    dir,
                    wall.center,
                    wall.half_extent,
                    wall.yaw,
                    wall.height,
                ),
                HitTarget::Wall,
            );
        }
        for pole in &self.poles {
            consider(
                geom::ray_vertical_cylinder(origin, dir, pole.center, pole.radius, pole.height),
                HitTarget::Pole,
            );
        }
        consider(
            geom::ray_sphere(origin, dir, self.ship.pos, SHIP_SCAN_RADIUS),
            HitTarget::Ship,
        );
        consider(
            geom::ray_sphere(origin, dir, monster_center, MONSTER_RADIUS),
            HitTarget::Monster,
        );

        best.map(|(t, target)| RayHit {
            point: origin + dir * t,
            distance: t,
            target,
        })
    }

    /// World with no obstacles (open ground, ship far away)
    #[cfg(test)]
    pub(crate) fn open(ship_pos: Vec3) -> Self {
        Self {
            walls: Vec::new(),
            poles: Vec::new(),
            ship: Ship { pos: ship_pos },
        }
    }

    /// Hand-placed world for tests
    #[cfg(test)]
    pub(crate) fn with_parts(walls: Vec<Wall>, poles: Vec<Pole>, ship: Ship) -> Self {
        Self { walls, poles, ship }
    }
}
