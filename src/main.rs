//! Astro Miner headless runner
//!
//! Runs the simulation without a window: loads settings (optional JSON path as
//! the first argument), starts a game and lets a simple autopilot fly it for a
//! fixed number of ticks. Set `RUST_LOG=debug` to follow every event.

#[cfg(not(target_arch = "wasm32"))]
const DEMO_TICKS: u64 = 20_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use astro_miner::Settings;
    use astro_miner::sim::{GamePhase, GameState, Sale, TickInput, tick};

    env_logger::init();
    log::info!("Astro Miner (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Ok(Settings::default()),
    };
    let settings = match settings.and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let mut state = GameState::new(settings);
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start);

    while state.time_ticks < DEMO_TICKS && state.phase != GamePhase::GameOver {
        let input = autopilot(&state);
        tick(&mut state, &input);
        for event in &state.events {
            log::debug!("t={} {:?}", state.time_ticks, event);
        }

        if state.rescue_needed && !state.request_rescue() {
            log::warn!("Stranded without money for a rescue");
            break;
        }
        if state.shop_open {
            state.sell_crystals(Sale::All);
            state.buy_fuel();
            state.close_shop();
        }
    }

    println!(
        "Finished after {} ticks: {:?}, level {}, ${}, {} lives, {} crystals in the bin",
        state.time_ticks,
        state.phase,
        state.level,
        state.money,
        state.lives,
        state.bin.len()
    );
}

/// Spin slowly, fire constantly, and head home to the station when the tank
/// runs low or the bin is full enough to be worth selling
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &astro_miner::sim::GameState) -> astro_miner::sim::TickInput {
    use astro_miner::nose_direction;
    use astro_miner::sim::TickInput;

    let mut input = TickInput {
        fire: true,
        dock: state.near_station,
        ..Default::default()
    };
    let Some(ship) = state.universe.ship_body() else {
        return input;
    };
    let Some(ship_state) = ship.ship_state() else {
        return input;
    };

    let station = state
        .universe
        .station()
        .and_then(|key| state.universe.get(key))
        .map(|station| station.position);
    let go_home = ship_state.low_fuel_warning || state.bin.len() > 40;

    match station {
        Some(home) if go_home && !state.near_station => {
            let to_home = (home - ship.position).normalize_or_zero();
            let facing = nose_direction(ship.angle);
            // Turn towards the station, thrust once roughly aligned
            if facing.perp_dot(to_home) > 0.05 {
                input.rotate_right = true;
            } else if facing.perp_dot(to_home) < -0.05 {
                input.rotate_left = true;
            }
            input.thrust = facing.dot(to_home) > 0.9 && ship.heading.length() < 3.0;
        }
        _ => {
            input.rotate_left = state.time_ticks % 90 < 30;
            input.thrust = state.time_ticks % 240 < 10;
        }
    }
    input
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core has no browser front end
}
