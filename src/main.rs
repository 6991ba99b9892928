//! Headless demo driver
//!
//! Runs a scripted session against the simulation core and logs what
//! happens. Useful for smoke-testing without a renderer attached.

use std::time::{SystemTime, UNIX_EPOCH};

use darkfield::Settings;
use darkfield::sim::{GamePhase, GameState, TickInput, tick};

fn main() {
    env_logger::init();

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    let mut state = GameState::new(seed);
    let dt = 1.0 / 60.0;

    // Scripted session: walk forward while slowly sweeping the view,
    // scanning every four seconds
    for i in 0..60 * 60 {
        let input = TickInput {
            forward: true,
            scan: i % 240 == 0,
            turn_delta: (i as f32 * 0.01).sin() * 0.1 * settings.mouse_sensitivity,
            ..TickInput::default()
        };
        tick(&mut state, &input, dt);

        if i % 300 == 0 {
            let frame = state.frame();
            log::info!(
                "t={:5.1}s pos=({:6.2}, {:6.2}) returns={} indicator={:?}",
                state.time_secs,
                frame.player_pos.x,
                frame.player_pos.z,
                frame.returns.len(),
                frame.indicator,
            );
        }

        match state.phase {
            GamePhase::Won => {
                log::info!("escaped at t={:.1}s", state.time_secs);
                break;
            }
            GamePhase::Lost => {
                log::info!("caught at t={:.1}s", state.time_secs);
                break;
            }
            _ => {}
        }
    }

    let frame = state.frame();
    log::info!(
        "session over: phase {:?}, {} returns live",
        frame.phase,
        frame.returns.len()
    );
}
