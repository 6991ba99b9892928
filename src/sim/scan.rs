//! LIDAR scanner: beam sweep, hit clustering, decaying return cloud
//!
//! Each tick of an active scan episode fires `SCAN_BEAM_COUNT` rays fanned
//! across the horizontal range, with the vertical angle driven by the sweep
//! phase. A hit within range rolls against a distance-based density and, on
//! success, deposits a cluster of returns shaped for the target kind.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::environment::{Environment, HitTarget};
use super::player::Player;
use crate::consts::*;
use crate::yaw_forward;

/// What kind of surface a return came from; drives its display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnCategory {
    Ground,
    Obstacle,
    Monster,
    Ship,
}

impl ReturnCategory {
    /// Display color as RGB bytes
    pub fn color(self) -> [u8; 3] {
        match self {
            ReturnCategory::Ground | ReturnCategory::Obstacle => [0, 255, 0],
            ReturnCategory::Monster => [255, 0, 0],
            ReturnCategory::Ship => [255, 255, 0],
        }
    }
}

/// One point of the persistent scan cloud
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanReturn {
    pub pos: Vec3,
    pub category: ReturnCategory,
    /// Seconds since this return was deposited
    pub age: f32,
}

impl ScanReturn {
    /// Fade from 1.0 at birth to 0.0 at `SCAN_DECAY`
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / SCAN_DECAY).clamp(0.0, 1.0)
    }
}

/// A live beam for the presentation layer to draw
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeamSegment {
    pub origin: Vec3,
    pub end: Vec3,
}

/// Faults surfaced by [`Scanner::emit`]. The loop aborts the scan episode
/// and releases the beams rather than crashing.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("beam {0} direction is degenerate")]
    DegenerateBeam(usize),
    #[error("beam {0} hit a non-finite point")]
    NonFiniteHit(usize),
    #[error("beam index {0} outside pool capacity")]
    BeamIndex(usize),
}

/// Fixed-capacity beam slots, one per sweep beam. Slots are rewritten in
/// place each emit and released together when the episode ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamPool {
    slots: Vec<Option<BeamSegment>>,
}

impl BeamPool {
    fn new() -> Self {
        Self {
            slots: vec![None; SCAN_BEAM_COUNT],
        }
    }

    fn set(&mut self, index: usize, segment: BeamSegment) -> Result<(), ScanError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ScanError::BeamIndex(index))?;
        *slot = Some(segment);
        Ok(())
    }

    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Beams currently lit
    pub fn active(&self) -> impl Iterator<Item = &BeamSegment> {
        self.slots.iter().flatten()
    }
}

/// Density in 0..=1 at a hit distance: full inside `MIN_SCAN_DISTANCE`,
/// exponential falloff out to `MAX_SCAN_DISTANCE`, floored
pub fn scan_density(distance: f32) -> f32 {
    let normalized =
        ((distance - MIN_SCAN_DISTANCE) / (MAX_SCAN_DISTANCE - MIN_SCAN_DISTANCE)).clamp(0.0, 1.0);
    (SCAN_DENSITY_BASE * SCAN_DENSITY_FALLOFF.powf(10.0 * normalized)).max(SCAN_DENSITY_MIN)
}

/// The scan subsystem: beam pool plus the decaying return cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scanner {
    returns: Vec<ScanReturn>,
    beams: BeamPool,
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            returns: Vec::new(),
            beams: BeamPool::new(),
        }
    }

    pub fn returns(&self) -> &[ScanReturn] {
        &self.returns
    }

    pub fn beams(&self) -> &BeamPool {
        &self.beams
    }

    /// Age the cloud and drop fully faded returns
    pub fn decay(&mut self, dt: f32) {
        for ret in &mut self.returns {
            ret.age += dt;
        }
        self.returns.retain(|ret| ret.age < SCAN_DECAY);
    }

    /// Release all beams, e.g. when an episode ends or is aborted
    pub fn reset(&mut self) {
        self.beams.release_all();
    }

    /// Fire one tick's worth of beams. Returns true if any beam painted the
    /// monster densely enough to register (the monster only notices a scan
    /// that actually lights it up).
    pub fn emit(
        &mut self,
        player: &Player,
        env: &Environment,
        monster_pos: Vec3,
        rng: &mut impl Rng,
    ) -> Result<bool, ScanError> {
        let mut hit_monster = false;
        let sweep = player.scan.sweep.fract();
        let origin = player.pos;

        for i in 0..SCAN_BEAM_COUNT {
            let beam_progress = (i as f32 / SCAN_BEAM_COUNT as f32 + sweep).fract();
            let horizontal = -HORIZONTAL_SCAN_RANGE / 2.0
                + HORIZONTAL_SCAN_RANGE * beam_progress
                + (rng.random::<f32>() - 0.5) * SCAN_BEAM_NOISE;
            let vertical = -VERTICAL_SCAN_RANGE / 2.0
                + VERTICAL_SCAN_RANGE * sweep
                + (rng.random::<f32>() - 0.5) * SCAN_BEAM_NOISE;

            // Yaw the facing direction, then pitch around its right vector
            let yawed = Quat::from_rotation_y(horizontal) * yaw_forward(player.yaw);
            let right = Vec3::Y.cross(yawed).normalize_or_zero();
            let dir = (Quat::from_axis_angle(right, vertical) * yawed).normalize_or_zero();
            if dir == Vec3::ZERO || !dir.is_finite() {
                return Err(ScanError::DegenerateBeam(i));
            }

            self.beams.set(
                i,
                BeamSegment {
                    origin,
                    end: origin + dir * SCAN_BEAM_LENGTH,
                },
            )?;

            let Some(hit) = env.cast_ray(origin, dir, monster_pos) else {
                continue;
            };
            if hit.distance > MAX_SCAN_DISTANCE {
                continue;
            }
            if !hit.point.is_finite() {
                return Err(ScanError::NonFiniteHit(i));
            }

            let density = scan_density(hit.distance);
            if rng.random::<f32>() >= density {
                continue;
            }

            match hit.target {
                HitTarget::Ground => self.emit_ground_cluster(hit.point, density, rng),
                HitTarget::Monster => {
                    hit_monster = true;
                    self.emit_column_cluster(
                        monster_pos,
                        ReturnCategory::Monster,
                        16,
                        12,
                        MONSTER_RADIUS * 0.8,
                        MONSTER_RADIUS * 0.4,
                        1.0,
                        density,
                        rng,
                    );
                }
                HitTarget::Ship => self.emit_column_cluster(
                    hit.point,
                    ReturnCategory::Ship,
                    16,
                    12,
                    SHIP_SCAN_RADIUS * 0.8,
                    SHIP_SCAN_RADIUS * 0.4,
                    1.0,
                    density,
                    rng,
                ),
                HitTarget::Wall | HitTarget::Pole => self.emit_column_cluster(
                    hit.point,
                    ReturnCategory::Obstacle,
                    12,
                    8,
                    0.2,
                    0.4,
                    2.0,
                    density,
                    rng,
                ),
            }
        }

        Ok(hit_monster)
    }

    /// Concentric rings around a ground hit, with occasional inter-ring
    /// points and a handful of scatter
    fn emit_ground_cluster(&mut self, point: Vec3, density: f32, rng: &mut impl Rng) {
        const BASE_RADIUS: f32 = 1.5;
        let num_points = ((8.0 * density) as usize).max(4);

        for ring in 0..3 {
            let ring_radius = BASE_RADIUS * (ring + 1) as f32 / 2.0;
            let in_ring = ((num_points * (ring + 1)) as f32 * density) as usize;
            for j in 0..in_ring.max(4) {
                let angle = j as f32 / in_ring.max(4) as f32 * std::f32::consts::TAU;
                let radius = ring_radius * (0.9 + rng.random::<f32>() * 0.2);
                self.push_return(
                    Vec3::new(
                        point.x + angle.cos() * radius,
                        point.y + 0.01 + rng.random::<f32>() * 0.02,
                        point.z + angle.sin() * radius,
                    ),
                    ReturnCategory::Ground,
                );

                if rng.random::<f32>() < 0.3 {
                    let a = rng.random_range(0.0..std::f32::consts::TAU);
                    let r = ring_radius * (0.5 + rng.random::<f32>() * 0.5);
                    self.push_return(
                        Vec3::new(
                            point.x + a.cos() * r,
                            point.y + 0.01 + rng.random::<f32>() * 0.02,
                            point.z + a.sin() * r,
                        ),
                        ReturnCategory::Ground,
                    );
                }
            }
        }

        for _ in 0..8 {
            let r = BASE_RADIUS * 2.0 * rng.random::<f32>();
            let a = rng.random_range(0.0..std::f32::consts::TAU);
            self.push_return(
                Vec3::new(
                    point.x + a.cos() * r,
                    point.y + 0.01 + rng.random::<f32>() * 0.02,
                    point.z + a.sin() * r,
                ),
                ReturnCategory::Ground,
            );
        }
    }

    /// A ring-of-columns silhouette around a vertical target: rings of
    /// points in the ground plane, each stacked over `2 * half_span` with a
    /// per-point density roll
    #[allow(clippy::too_many_arguments)]
    fn emit_column_cluster(
        &mut self,
        center: Vec3,
        category: ReturnCategory,
        base_points: usize,
        base_heights: usize,
        radius_base: f32,
        radius_spread: f32,
        half_span: f32,
        density: f32,
        rng: &mut impl Rng,
    ) {
        let num_points = ((base_points as f32 * density) as usize).max(4);
        let num_heights = ((base_heights as f32 * density) as usize).max(2);

        for j in 0..num_points {
            let angle = j as f32 / num_points as f32 * std::f32::consts::TAU;
            let radius = radius_base + rng.random::<f32>() * radius_spread;
            let x = center.x + angle.cos() * radius;
            let z = center.z + angle.sin() * radius;

            for k in 0..num_heights {
                if rng.random::<f32>() < density {
                    let y = center.y - half_span
                        + (2.0 * half_span * k as f32 / (num_heights - 1) as f32)
                        + (rng.random::<f32>() - 0.5) * 0.2;
                    self.push_return(Vec3::new(x, y, z), category);
                }
            }
        }
    }

    fn push_return(&mut self, pos: Vec3, category: ReturnCategory) {
        if self.returns.len() >= MAX_SCAN_RETURNS {
            // Oldest first: the cloud is push-ordered
            self.returns.remove(0);
        }
        self.returns.push(ScanReturn {
            pos,
            category,
            age: 0.0,
        });
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(9)
    }

    fn far_monster() -> Vec3 {
        Vec3::new(500.0, MONSTER_CENTER_HEIGHT, 500.0)
    }

    #[test]
    fn test_density_full_up_close_floored_far_out() {
        assert_eq!(scan_density(0.0), SCAN_DENSITY_BASE);
        assert_eq!(scan_density(MIN_SCAN_DISTANCE), SCAN_DENSITY_BASE);
        let far = scan_density(MAX_SCAN_DISTANCE);
        assert!(far < scan_density(MAX_SCAN_DISTANCE / 2.0));
        assert!(far >= SCAN_DENSITY_MIN);
        // Monotonic across the band
        let mut last = f32::INFINITY;
        for step in 0..=20 {
            let d = scan_density(MIN_SCAN_DISTANCE + step as f32 * 3.75);
            assert!(d <= last);
            last = d;
        }
    }

    #[test]
    fn test_return_opacity_fades_linearly() {
        let mut ret = ScanReturn {
            pos: Vec3::ZERO,
            category: ReturnCategory::Ground,
            age: 0.0,
        };
        assert_eq!(ret.opacity(), 1.0);
        ret.age = SCAN_DECAY / 2.0;
        assert!((ret.opacity() - 0.5).abs() < 1e-6);
        ret.age = SCAN_DECAY + 1.0;
        assert_eq!(ret.opacity(), 0.0);
    }

    #[test]
    fn test_decay_removes_expired_returns() {
        let mut scanner = Scanner::new();
        scanner.push_return(Vec3::ZERO, ReturnCategory::Ground);
        scanner.decay(SCAN_DECAY / 2.0);
        assert_eq!(scanner.returns().len(), 1);
        scanner.push_return(Vec3::ONE, ReturnCategory::Obstacle);
        scanner.decay(SCAN_DECAY / 2.0);
        // First return expired exactly at SCAN_DECAY, second is half gone
        assert_eq!(scanner.returns().len(), 1);
        assert_eq!(scanner.returns()[0].category, ReturnCategory::Obstacle);
    }

    #[test]
    fn test_return_cap_evicts_oldest() {
        let mut scanner = Scanner::new();
        for i in 0..MAX_SCAN_RETURNS + 10 {
            scanner.push_return(Vec3::new(i as f32, 0.0, 0.0), ReturnCategory::Ground);
        }
        assert_eq!(scanner.returns().len(), MAX_SCAN_RETURNS);
        // The 10 oldest are gone
        assert_eq!(scanner.returns()[0].pos.x, 10.0);
    }

    #[test]
    fn test_emit_ground_sweep_fills_beams_and_cloud() {
        let env = Environment::open(Vec3::new(200.0, 1.0, 0.0));
        let mut rng = rng();
        // Late in the sweep the vertical angle pitches every beam downward;
        // all 12 hit nearby ground at full density
        let mut player = Player::new(Vec2::ZERO);
        player.scan.sweep = 0.9;

        let mut scanner = Scanner::new();
        let hit = scanner.emit(&player, &env, far_monster(), &mut rng).unwrap();
        assert!(!hit);
        assert_eq!(scanner.beams().active().count(), SCAN_BEAM_COUNT);
        assert!(!scanner.returns().is_empty());
        for ret in scanner.returns() {
            assert_eq!(ret.category, ReturnCategory::Ground);
            assert!(ret.pos.y < 0.1);
            assert_eq!(ret.age, 0.0);
        }

        scanner.reset();
        assert_eq!(scanner.beams().active().count(), 0);
        // Returns survive the episode ending
        assert!(!scanner.returns().is_empty());
    }

    #[test]
    fn test_emit_reports_monster_hit() {
        let env = Environment::open(Vec3::new(200.0, 1.0, 0.0));
        let mut rng = rng();
        let mut player = Player::new(Vec2::ZERO);
        // Mid-sweep: vertical angle level, and one beam points straight ahead
        player.scan.sweep = 0.5;
        let monster_pos = Vec3::new(0.0, MONSTER_CENTER_HEIGHT, -10.0);

        let mut scanner = Scanner::new();
        let mut hit = false;
        for _ in 0..20 {
            hit |= scanner.emit(&player, &env, monster_pos, &mut rng).unwrap();
            if hit {
                break;
            }
        }
        assert!(hit, "forward beam never registered the monster");

        let monster_returns: Vec<_> = scanner
            .returns()
            .iter()
            .filter(|r| r.category == ReturnCategory::Monster)
            .collect();
        assert!(!monster_returns.is_empty());
        for ret in monster_returns {
            let flat = Vec2::new(ret.pos.x - monster_pos.x, ret.pos.z - monster_pos.z).length();
            assert!(flat <= MONSTER_RADIUS * 1.2 + 1e-4);
        }
    }

    #[test]
    fn test_beam_pool_rejects_out_of_range() {
        let mut pool = BeamPool::new();
        let seg = BeamSegment {
            origin: Vec3::ZERO,
            end: Vec3::ONE,
        };
        assert!(pool.set(SCAN_BEAM_COUNT - 1, seg).is_ok());
        assert!(matches!(
            pool.set(SCAN_BEAM_COUNT, seg),
            Err(ScanError::BeamIndex(_))
        ));
    }

    proptest! {
        /// Fading depends only on accumulated time, never on how it is
        /// split into ticks.
        #[test]
        fn prop_decay_is_framerate_independent(
            dts in prop::collection::vec(0.001f32..0.5, 1..100)
        ) {
            let mut scanner = Scanner::new();
            scanner.push_return(Vec3::ZERO, ReturnCategory::Ground);

            let mut total = 0.0f32;
            for dt in dts {
                scanner.decay(dt);
                total += dt;
                if total >= SCAN_DECAY {
                    break;
                }
                prop_assert_eq!(scanner.returns().len(), 1);
                let expected = (1.0 - total / SCAN_DECAY).clamp(0.0, 1.0);
                prop_assert!((scanner.returns()[0].opacity() - expected).abs() < 1e-6);
            }
            if total >= SCAN_DECAY {
                prop_assert!(scanner.returns().is_empty());
            }
        }
    }
}
