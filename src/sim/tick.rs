//! Per-frame simulation step
//!
//! Advances the whole simulation from one input snapshot and a wall-clock
//! delta. Component faults are logged and skipped; the loop itself never
//! fails.

use glam::Vec2;

use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::flat_distance;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Request a scan this tick (edge, not level)
    pub scan: bool,
    /// Pause toggle
    pub pause: bool,
    /// Yaw delta in radians, sensitivity already applied by the caller
    pub turn_delta: f32,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Clamp the delta so a long stall cannot tunnel anything through walls
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::Won | GamePhase::Lost => return,
        GamePhase::Playing => {}
    }

    state.time_secs += f64::from(dt);

    // Player: look, move, scan bookkeeping
    state.player.turn(input.turn_delta, 1.0);
    let axes = movement_axes(input);
    if axes != Vec2::ZERO {
        state.player.try_move(axes, &state.env, dt);
    }
    if input.scan {
        state.player.trigger_scan();
    }
    state.player.tick_cooldown(dt);
    if state.player.tick_scan(dt) {
        state.scanner.reset();
    }

    if flat_distance(state.player.pos, state.env.ship().pos) < SHIP_RADIUS {
        state.phase = GamePhase::Won;
        log::info!("player reached the ship");
        return;
    }

    let player_pos = state.player.pos;
    if let Err(err) = state.monster.update(player_pos, &state.env, &mut state.rng, dt) {
        log::error!("monster update failed, skipping tick: {err}");
    }

    let catch_range = state.player.collision_radius + state.monster.collision_radius;
    if flat_distance(state.player.pos, state.monster.pos) < catch_range {
        state.phase = GamePhase::Lost;
        log::info!("the monster caught the player");
        return;
    }

    state.scanner.decay(dt);
    if state.player.scan.is_scanning {
        match state
            .scanner
            .emit(&state.player, &state.env, state.monster.pos, &mut state.rng)
        {
            Ok(true) => state.monster.on_scan_hit(),
            Ok(false) => {}
            Err(err) => {
                // Abort the episode; the cooldown still applies
                log::error!("scan aborted: {err}");
                state.scanner.reset();
                state.player.scan.is_scanning = false;
                state.player.scan.sweep = 0.0;
            }
        }
    }
}

fn movement_axes(input: &TickInput) -> Vec2 {
    let mut axes = Vec2::ZERO;
    if input.forward {
        axes.y -= 1.0;
    }
    if input.back {
        axes.y += 1.0;
    }
    if input.left {
        axes.x -= 1.0;
    }
    if input.right {
        axes.x += 1.0;
    }
    axes
}
