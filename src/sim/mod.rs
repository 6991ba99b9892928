//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Per-frame deltas clamped at the entry point
//! - No rendering or platform dependencies

pub mod environment;
pub mod frame;
pub mod geom;
pub mod monster;
pub mod player;
pub mod scan;
pub mod state;
pub mod tick;

pub use environment::{Environment, HitTarget, Pole, RayHit, Ship, Wall};
pub use frame::{Frame, IndicatorColor};
pub use monster::{Behavior, Monster, MonsterError, generate_path};
pub use player::{Player, ScanState};
pub use scan::{
    BeamPool, BeamSegment, ReturnCategory, ScanError, ScanReturn, Scanner, scan_density,
};
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, tick};
