//! Read-only per-tick view handed to the presentation layer

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::monster::Behavior;
use super::scan::{BeamPool, ScanReturn};
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::flat_distance;

/// Proximity indicator state, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorColor {
    /// The monster is hunting and close (red)
    MonsterChasing,
    /// Within winning reach of the ship (green)
    VeryNearShip,
    /// Ship nearby (yellow)
    NearShip,
    /// Nothing of note (blue)
    Far,
}

/// Everything a renderer or HUD needs for one frame. Borrows from the
/// state; no copies of the return cloud.
#[derive(Debug)]
pub struct Frame<'a> {
    pub player_pos: Vec3,
    pub player_yaw: f32,
    pub monster_pos: Vec3,
    pub returns: &'a [ScanReturn],
    pub beams: &'a BeamPool,
    pub scanning: bool,
    pub scan_progress: f32,
    /// Cooldown recharge for the HUD bar, 0..1
    pub cooldown_fraction: f32,
    pub indicator: IndicatorColor,
    pub phase: GamePhase,
}

impl GameState {
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            player_pos: self.player.pos,
            player_yaw: self.player.yaw,
            monster_pos: self.monster.pos,
            returns: self.scanner.returns(),
            beams: self.scanner.beams(),
            scanning: self.player.scan.is_scanning,
            scan_progress: self.player.scan.progress,
            cooldown_fraction: self.player.cooldown_fraction(),
            indicator: indicator_color(self),
            phase: self.phase,
        }
    }
}

impl Frame<'_> {
    pub fn game_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::Lost
    }
}

/// A hunting monster in range overrides any ship proximity
fn indicator_color(state: &GameState) -> IndicatorColor {
    let monster_dist = flat_distance(state.player.pos, state.monster.pos);
    if state.monster.behavior == Behavior::Chasing && monster_dist < INDICATOR_MONSTER_RANGE {
        return IndicatorColor::MonsterChasing;
    }
    let ship_dist = flat_distance(state.player.pos, state.env.ship().pos);
    if ship_dist < INDICATOR_SHIP_VERY_NEAR {
        IndicatorColor::VeryNearShip
    } else if ship_dist < INDICATOR_SHIP_NEAR {
        IndicatorColor::NearShip
    } else {
        IndicatorColor::Far
    }
}
