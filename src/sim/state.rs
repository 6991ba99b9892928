//! Game state and run setup
//!
//! Everything needed to reproduce or resume a run lives here, including the
//! RNG. Two states built from the same seed and fed the same inputs stay
//! identical forever.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::environment::Environment;
use super::monster::Monster;
use super::player::Player;
use super::scan::Scanner;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; no component advances
    Paused,
    /// Player reached the escape ship
    Won,
    /// The monster caught the player
    Lost,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Unpaused simulation time
    pub time_secs: f64,
    pub env: Environment,
    pub player: Player,
    pub monster: Monster,
    pub scanner: Scanner,
}

impl GameState {
    /// Generate a new run: obstacle field, ship placement, and a validated
    /// player spawn, all drawn from the seed
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let env = Environment::generate(&mut rng);
        let spawn = env.find_safe_spawn(
            &mut rng,
            SPAWN_MAX_ATTEMPTS,
            SPAWN_RADIUS,
            PLAYER_COLLISION_RADIUS * SPAWN_MARGIN,
        );
        log::info!("new run: seed {seed}, spawn ({:.1}, {:.1})", spawn.x, spawn.y);

        Self {
            seed,
            rng,
            phase: GamePhase::Playing,
            time_secs: 0.0,
            env,
            player: Player::new(spawn),
            monster: Monster::new(),
            scanner: Scanner::new(),
        }
    }
}
