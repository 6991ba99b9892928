//! Monster AI: stalk, flee when scanned, chase when scanned again
//!
//! Behavior transitions fire only on scan-hit events and the flee timeout.
//! Movement uses the same `is_blocked` validation as the player, with the
//! monster's own clearance.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::environment::Environment;
use crate::consts::*;
use crate::{flat_distance, xz};

/// The three behavior states. Speed is coupled to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Shadowing the player from a distance (initial state)
    Stalking,
    /// Bolting directly away after the first scan hit
    Fleeing,
    /// Hunting the player's live position after the second hit
    Chasing,
}

/// Faults surfaced by the per-tick update. The loop logs these and skips
/// the monster's tick rather than crashing the simulation.
#[derive(Debug, Error)]
pub enum MonsterError {
    #[error("monster position became non-finite")]
    NonFinitePosition,
}

/// The monster agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub pos: Vec3,
    pub behavior: Behavior,
    pub collision_radius: f32,
    waypoints: Vec<Vec3>,
    current_waypoint: usize,
    path_timer: f32,
    flee_timer: f32,
    scanned_once: bool,
    scanned_twice: bool,
}

impl Monster {
    pub fn new() -> Self {
        Self {
            pos: Vec3::new(MONSTER_SPAWN.x, MONSTER_CENTER_HEIGHT, MONSTER_SPAWN.y),
            behavior: Behavior::Stalking,
            collision_radius: MONSTER_COLLISION_RADIUS,
            waypoints: Vec::new(),
            current_waypoint: 0,
            // Expired so the first tick plans immediately
            path_timer: PATH_UPDATE_INTERVAL,
            flee_timer: 0.0,
            scanned_once: false,
            scanned_twice: false,
        }
    }

    /// Movement speed for the current behavior state
    pub fn speed(&self) -> f32 {
        match self.behavior {
            Behavior::Stalking => MONSTER_BASE_SPEED,
            Behavior::Fleeing => MONSTER_FLEE_SPEED,
            Behavior::Chasing => MONSTER_ATTACK_SPEED,
        }
    }

    /// React to being painted by a scan beam. Transitions are monotonic and
    /// idempotent: the first hit triggers flight, a later hit while not
    /// fleeing triggers the chase, anything beyond that is a no-op.
    pub fn on_scan_hit(&mut self) {
        if !self.scanned_once {
            self.scanned_once = true;
            self.behavior = Behavior::Fleeing;
            self.flee_timer = 0.0;
            log::info!("monster scanned, fleeing");
        } else if !self.scanned_twice && self.behavior != Behavior::Fleeing {
            self.scanned_twice = true;
            self.behavior = Behavior::Chasing;
            self.path_timer = PATH_UPDATE_INTERVAL;
            log::info!("monster scanned again, now aggressive");
        }
    }

    /// Advance one tick: flee movement, periodic replanning, or waypoint
    /// following. Never touches the terminal game flags; the loop owns the
    /// catch check.
    pub fn update(
        &mut self,
        player_pos: Vec3,
        env: &Environment,
        rng: &mut impl Rng,
        dt: f32,
    ) -> Result<(), MonsterError> {
        if self.behavior == Behavior::Fleeing {
            self.flee_tick(player_pos, env, dt);
            return self.check_finite();
        }

        self.path_timer += dt;
        if self.path_timer >= PATH_UPDATE_INTERVAL {
            self.path_timer = 0.0;
            self.replan(player_pos, env, rng);
        }

        self.follow_waypoints(env, dt)?;
        self.check_finite()
    }

    /// Direct flight away from the player, ignoring the waypoint system.
    /// A blocked step simply does not move this tick; no replanning.
    fn flee_tick(&mut self, player_pos: Vec3, env: &Environment, dt: f32) {
        self.flee_timer += dt;
        if self.flee_timer > FLEE_DURATION {
            self.behavior = Behavior::Stalking;
            self.path_timer = PATH_UPDATE_INTERVAL;
            log::info!("monster stopped fleeing");
            return;
        }

        let away = (xz(self.pos) - xz(player_pos)).normalize_or_zero();
        if away == Vec2::ZERO {
            return;
        }
        let step = away * self.speed() * dt;
        let candidate = self.pos + Vec3::new(step.x, 0.0, step.y);
        if !env.is_blocked(xz(candidate), self.collision_radius * MONSTER_MOVE_MARGIN) {
            self.pos = candidate;
        }
    }

    fn replan(&mut self, player_pos: Vec3, env: &Environment, rng: &mut impl Rng) {
        if self.scanned_twice {
            // Chase the live player position directly
            self.waypoints = vec![Vec3::new(player_pos.x, MONSTER_CENTER_HEIGHT, player_pos.z)];
        } else {
            // Stalking point sits on the monster's side of the player,
            // STALKING_DISTANCE out
            let to_player = (xz(player_pos) - xz(self.pos)).normalize_or_zero();
            let stalk = xz(player_pos) - to_player * STALKING_DISTANCE;
            let target = Vec3::new(stalk.x, MONSTER_CENTER_HEIGHT, stalk.y);
            self.waypoints = generate_path(self.pos, target, self.collision_radius, env, rng);
        }
        self.current_waypoint = 0;
    }

    fn follow_waypoints(&mut self, env: &Environment, dt: f32) -> Result<(), MonsterError> {
        let Some(&waypoint) = self.waypoints.get(self.current_waypoint) else {
            return Ok(());
        };

        if flat_distance(self.pos, waypoint) < WAYPOINT_ARRIVAL {
            self.current_waypoint += 1;
            if self.current_waypoint >= self.waypoints.len() {
                self.waypoints.clear();
                self.current_waypoint = 0;
            }
            return Ok(());
        }

        let dir = (xz(waypoint) - xz(self.pos)).normalize_or_zero();
        let step = dir * self.speed() * dt;
        let candidate = self.pos + Vec3::new(step.x, 0.0, step.y);
        if !candidate.is_finite() {
            return Err(MonsterError::NonFinitePosition);
        }

        if env.is_blocked(xz(candidate), self.collision_radius * MONSTER_MOVE_MARGIN) {
            // Stuck: force a replan on the next tick
            self.path_timer = PATH_UPDATE_INTERVAL;
        } else {
            self.pos = candidate;
        }
        Ok(())
    }

    fn check_finite(&self) -> Result<(), MonsterError> {
        if self.pos.is_finite() {
            Ok(())
        } else {
            Err(MonsterError::NonFinitePosition)
        }
    }

    #[cfg(test)]
    pub(crate) fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }
}

impl Default for Monster {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy path construction: fixed-length steps toward the target, with a
/// few randomized sidesteps when the straight-line point is blocked. Always
/// appends the exact target and terminates after a bounded attempt budget.
pub fn generate_path(
    start: Vec3,
    target: Vec3,
    collision_radius: f32,
    env: &Environment,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    let clearance = collision_radius * MONSTER_MOVE_MARGIN;
    let mut path = Vec::new();
    let mut current = start;
    let mut attempts = 0;

    while flat_distance(current, target) > PATH_POINT_DISTANCE && attempts < PATH_MAX_STEPS {
        let dir = (xz(target) - xz(current)).normalize_or_zero();
        let step = dir * PATH_POINT_DISTANCE;
        let next = current + Vec3::new(step.x, 0.0, step.y);

        if let Some(valid) = find_clear_point(next, PATH_POINT_DISTANCE, clearance, env, rng) {
            path.push(valid);
            current = valid;
        }
        // A step with no clear point is skipped; the budget still shrinks
        attempts += 1;
    }

    // The target itself is appended regardless of validity; the follower's
    // blocked-step handling copes if it is unreachable
    path.push(target);
    path
}

/// The straight-line candidate if clear, otherwise a few random samples
/// within `radius` of it
fn find_clear_point(
    center: Vec3,
    radius: f32,
    clearance: f32,
    env: &Environment,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    if !env.is_blocked(xz(center), clearance) {
        return Some(center);
    }
    for _ in 0..PATH_SIDESTEP_ATTEMPTS {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let dist = rng.random::<f32>() * radius;
        let candidate = center + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);
        if !env.is_blocked(xz(candidate), clearance) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::environment::{Pole, Ship};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn open_env() -> Environment {
        Environment::open(Vec3::new(50.0, 1.0, 0.0))
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_initial_state_is_stalking() {
        let monster = Monster::new();
        assert_eq!(monster.behavior, Behavior::Stalking);
        assert_eq!(monster.speed(), MONSTER_BASE_SPEED);
    }

    #[test]
    fn test_first_hit_flees_second_hit_chases() {
        let mut monster = Monster::new();

        monster.on_scan_hit();
        assert_eq!(monster.behavior, Behavior::Fleeing);
        assert_eq!(monster.speed(), MONSTER_FLEE_SPEED);

        // A hit while fleeing must NOT escalate to chasing
        monster.on_scan_hit();
        assert_eq!(monster.behavior, Behavior::Fleeing);

        // Let the flee expire
        let env = open_env();
        let mut rng = rng();
        monster
            .update(Vec3::new(100.0, 1.6, 100.0), &env, &mut rng, FLEE_DURATION + 0.1)
            .unwrap();
        assert_eq!(monster.behavior, Behavior::Stalking);

        // Now the second hit escalates
        monster.on_scan_hit();
        assert_eq!(monster.behavior, Behavior::Chasing);
        assert_eq!(monster.speed(), MONSTER_ATTACK_SPEED);

        // Further hits are no-ops
        monster.on_scan_hit();
        assert_eq!(monster.behavior, Behavior::Chasing);
    }

    #[test]
    fn test_fleeing_moves_directly_away_from_player() {
        let env = open_env();
        let mut rng = rng();
        let mut monster = Monster::new();
        monster.pos = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, 0.0);
        monster.on_scan_hit();

        let player = Vec3::new(-5.0, PLAYER_EYE_HEIGHT, 0.0);
        monster.update(player, &env, &mut rng, 0.5).unwrap();

        // Away from the player means +x here
        assert!(monster.pos.x > 0.0);
        assert!((monster.pos.x - MONSTER_FLEE_SPEED * 0.5).abs() < 1e-4);
        assert!(monster.pos.z.abs() < 1e-4);
    }

    #[test]
    fn test_blocked_flee_step_does_not_move() {
        // Ring the monster in with poles so every step is blocked
        let mut poles = Vec::new();
        for i in 0..16 {
            let angle = i as f32 / 16.0 * std::f32::consts::TAU;
            poles.push(Pole {
                center: Vec2::new(angle.cos() * 1.5, angle.sin() * 1.5),
                radius: 1.0,
                height: 6.0,
            });
        }
        let env = Environment::with_parts(
            Vec::new(),
            poles,
            Ship {
                pos: Vec3::new(50.0, 1.0, 0.0),
            },
        );
        let mut rng = rng();
        let mut monster = Monster::new();
        monster.pos = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, 0.0);
        monster.on_scan_hit();

        let before = monster.pos;
        monster
            .update(Vec3::new(-5.0, PLAYER_EYE_HEIGHT, 0.0), &env, &mut rng, 0.1)
            .unwrap();
        assert_eq!(monster.pos, before);
        // Still fleeing; blocked flight does not replan
        assert_eq!(monster.behavior, Behavior::Fleeing);
    }

    #[test]
    fn test_stalking_replans_toward_offset_point() {
        let env = open_env();
        let mut rng = rng();
        let mut monster = Monster::new();
        monster.pos = Vec3::new(20.0, MONSTER_CENTER_HEIGHT, 0.0);

        let player = Vec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0);
        monster.update(player, &env, &mut rng, 0.016).unwrap();

        // Final waypoint is the stalking point: on the monster's side of the
        // player, i.e. at (15, 0)
        let last = *monster.waypoints().last().unwrap();
        assert!((last.x - STALKING_DISTANCE).abs() < 1e-3);
        assert!(last.z.abs() < 1e-3);
    }

    #[test]
    fn test_chasing_targets_live_player_position() {
        let env = open_env();
        let mut rng = rng();
        let mut monster = Monster::new();
        monster.scanned_once = true;
        monster.scanned_twice = true;
        monster.behavior = Behavior::Chasing;

        let player = Vec3::new(7.0, PLAYER_EYE_HEIGHT, -3.0);
        monster.update(player, &env, &mut rng, 0.016).unwrap();

        assert_eq!(monster.waypoints().len(), 1);
        let wp = monster.waypoints()[0];
        assert_eq!((wp.x, wp.z), (7.0, -3.0));
    }

    #[test]
    fn test_waypoint_consumed_on_arrival() {
        let env = open_env();
        let mut rng = rng();
        let mut monster = Monster::new();
        monster.pos = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, 0.0);
        monster.waypoints = vec![Vec3::new(0.5, MONSTER_CENTER_HEIGHT, 0.0)];
        monster.path_timer = 0.0; // Keep the planner quiet this tick

        monster
            .update(Vec3::new(-40.0, PLAYER_EYE_HEIGHT, -40.0), &env, &mut rng, 0.016)
            .unwrap();
        assert!(monster.waypoints().is_empty());
    }

    #[test]
    fn test_generate_path_steps_and_exact_target() {
        let env = open_env();
        let mut rng = rng();
        let start = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, 0.0);
        let target = Vec3::new(20.0, MONSTER_CENTER_HEIGHT, 0.0);

        let path = generate_path(start, target, MONSTER_COLLISION_RADIUS, &env, &mut rng);
        assert_eq!(*path.last().unwrap(), target);
        // Open ground: straight-line points spaced PATH_POINT_DISTANCE apart
        assert!(path.len() >= 3);
        for pair in path.windows(2) {
            assert!(flat_distance(pair[0], pair[1]) <= PATH_POINT_DISTANCE + 1e-3);
        }
    }

    #[test]
    fn test_generate_path_is_bounded() {
        let env = open_env();
        let mut rng = rng();
        // Far beyond what PATH_MAX_STEPS of PATH_POINT_DISTANCE can cover
        let start = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, 0.0);
        let target = Vec3::new(500.0, MONSTER_CENTER_HEIGHT, 0.0);

        let path = generate_path(start, target, MONSTER_COLLISION_RADIUS, &env, &mut rng);
        assert!(path.len() <= PATH_MAX_STEPS as usize + 1);
        assert_eq!(*path.last().unwrap(), target);
    }
}
