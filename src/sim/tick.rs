//! Fixed timestep simulation tick
//!
//! One call advances the whole game by one frame: player input, world motion,
//! the saucer, collisions and their consequences, then the bookkeeping
//! (crystal pickup, fuel, levels, extra lives).

use glam::Vec2;
use rand::Rng;

use super::body::{Body, BodyKind};
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState, SaucerSize};
use super::universe::{BodyKey, Collision};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Turn counter-clockwise
    pub rotate_left: bool,
    /// Turn clockwise
    pub rotate_right: bool,
    pub thrust: bool,
    pub fire: bool,
    pub hyperspace: bool,
    /// Open the shop (only works in docking range)
    pub dock: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a new game from the title or game-over screen
    pub start: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Exploding => {
                state.paused_from = state.phase;
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = state.paused_from,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::Attract | GamePhase::GameOver if input.start => state.start_game(),
        _ => {}
    }

    match state.phase {
        GamePhase::Playing => {
            apply_input(state, input);
            update_hyperspace(state);
            state.universe.update_objects();
            state.camera.update(&state.universe);
            saucer_logic(state);
            let collisions = state.universe.check_collisions();
            for collision in collisions {
                handle_collision(state, collision);
            }
            collect_crystals(state);
            check_fuel_and_docking(state);
            if state.universe.rocks().is_empty() {
                level_up(state);
            }
            check_extra_life(state);
        }
        GamePhase::Exploding => {
            state.universe.update_objects();
            state.camera.update(&state.universe);
            saucer_logic(state);
            state.exploding_ticks += 1;
            if state.exploding_ticks > EXPLODING_TICKS {
                finish_explosion(state);
            }
        }
        // Title and game-over screens: the universe keeps drifting
        _ => {
            state.universe.update_objects();
            state.universe.resolve_rock_rock_physics();
            state.camera.update(&state.universe);
        }
    }

    state.bin.advance();
    state.time_ticks += 1;
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.dock {
        state.open_shop();
    }

    let Some(ship_key) = state.universe.ship() else {
        return;
    };
    let Some(ship) = state.universe.get_mut(ship_key) else {
        return;
    };

    if input.rotate_left {
        ship.rotate(SHIP_TURN_ANGLE);
    }
    if input.rotate_right {
        ship.rotate(-SHIP_TURN_ANGLE);
    }

    if input.thrust {
        ship.thrust();
    } else if let Some(ship_state) = ship.ship_state_mut() {
        ship_state.thrusting = false;
    }

    if input.hyperspace
        && let Some(ship_state) = ship.ship_state_mut()
        && !ship_state.in_hyperspace()
    {
        ship_state.hyperspace_ticks = HYPERSPACE_TICKS;
        state.events.push(GameEvent::Hyperspace);
    }

    if input.fire {
        let heading = ship.muzzle_heading();
        if state
            .universe
            .fire_bullet(ship_key, heading, SHIP_BULLET_TTL)
            .is_some()
        {
            state.events.push(GameEvent::ShotFired { by_ship: true });
        }
    }
}

/// Count down hyperspace and drop the ship somewhere random when it ends
fn update_hyperspace(state: &mut GameState) {
    let (width, height) = (state.universe.width, state.universe.height);
    let Some(ship) = state.universe.ship_body_mut() else {
        return;
    };
    let Some(ship_state) = ship.ship_state_mut() else {
        return;
    };
    if !ship_state.in_hyperspace() {
        return;
    }

    ship_state.hyperspace_ticks -= 1;
    if ship_state.hyperspace_ticks == 0 {
        let margin = HYPERSPACE_EDGE_MARGIN;
        ship.position = Vec2::new(
            state.rng.random_range(margin..(width - margin).max(margin + 1.0)),
            state.rng.random_range(margin..(height - margin).max(margin + 1.0)),
        );
        log::debug!("Ship left hyperspace at {:?}", ship.position);
    }
}

/// Retire the saucer after its laps, let it shoot at the ship, and send a new
/// one every `saucer_interval` ticks
fn saucer_logic(state: &mut GameState) {
    if let Some(saucer) = state.universe.saucer()
        && state
            .universe
            .get(saucer)
            .and_then(Body::saucer_state)
            .is_some_and(|s| s.laps >= SAUCER_MAX_LAPS)
    {
        state.universe.remove(saucer);
        log::debug!("Saucer left after {} laps", SAUCER_MAX_LAPS);
    }

    let ship_position = state.universe.ship_body().map(|ship| ship.position);

    if let (Some(saucer_key), Some(target)) = (state.universe.saucer(), ship_position)
        && let Some(saucer) = state.universe.get(saucer_key)
        && let Some(saucer_state) = saucer.saucer_state()
    {
        let heading = (target - saucer.position).normalize_or_zero() * SAUCER_BULLET_VELOCITY;
        let ttl = saucer_state.size.bullet_ttl();
        if heading != Vec2::ZERO && state.universe.fire_bullet(saucer_key, heading, ttl).is_some() {
            state.events.push(GameEvent::ShotFired { by_ship: false });
        }
    }

    let interval = state.settings.saucer_interval;
    let due = interval > 0 && state.time_ticks > 0 && state.time_ticks % interval == 0;
    if let Some(target) = ship_position
        && due
        && state.universe.saucer().is_none()
    {
        let (_, size) = spawn::spawn_saucer(
            &mut state.universe,
            &mut state.rng,
            target,
            state.settings.screen_width,
        );
        state.events.push(GameEvent::SaucerSpawned { size });
        log::info!("{:?} saucer incoming", size);
    }
}

fn handle_collision(state: &mut GameState, collision: Collision) {
    match collision {
        Collision::ShipRock { ship, rock } => {
            destroy_rock(state, rock);
            kill_ship(state, ship);
        }
        Collision::BulletRock { bullet, rock } => {
            if state.universe.remove(bullet).is_some() {
                destroy_rock(state, rock);
            }
        }
        Collision::BulletShip { bullet, ship } => {
            if state.universe.remove(bullet).is_some() {
                kill_ship(state, ship);
            }
        }
        Collision::BulletSaucer { bullet, saucer } => {
            if state.universe.contains(saucer)
                && state.universe.remove(bullet).is_some()
                && let Some(size) = kill_saucer(state, saucer)
            {
                state.money += size.reward();
            }
        }
        Collision::SaucerRock { saucer, rock } => {
            if state.universe.contains(saucer) {
                destroy_rock(state, rock);
                kill_saucer(state, saucer);
            }
        }
        Collision::SaucerShip { saucer, ship } => {
            if state.universe.contains(saucer) {
                kill_saucer(state, saucer);
                kill_ship(state, ship);
            }
        }
    }
}

/// Break up a rock and pay for it. Only the first hit on a rock counts.
fn destroy_rock(state: &mut GameState, rock: BodyKey) {
    let Some(body) = state.universe.remove(rock) else {
        return;
    };
    let BodyKind::Rock { size, material } = body.kind else {
        return;
    };

    state.money += size.reward();
    if size.split().is_some() {
        spawn::split_rock(
            &mut state.universe,
            &mut state.rng,
            body.position,
            size,
            material,
        );
    } else {
        spawn::spawn_crystals(&mut state.universe, &mut state.rng, body.position, material);
    }
    spawn::spawn_debris(&mut state.universe, &mut state.rng, body.position);
    state.events.push(GameEvent::RockDestroyed { size, material });
}

fn kill_ship(state: &mut GameState, ship: BodyKey) {
    let Some(body) = state.universe.remove(ship) else {
        return;
    };

    spawn::explode_ship(&mut state.universe, &mut state.rng, body.position, body.angle);
    state.lives = state.lives.saturating_sub(1);
    state.exploding_ticks = 0;
    state.rescue_needed = false;
    state.near_station = false;
    state.shop_open = false;
    state.phase = GamePhase::Exploding;
    state.events.push(GameEvent::ShipDestroyed);
    log::info!("Ship destroyed, {} lives left", state.lives);
}

fn kill_saucer(state: &mut GameState, saucer: BodyKey) -> Option<SaucerSize> {
    let body = state.universe.remove(saucer)?;
    let size = body.saucer_state()?.size;
    spawn::spawn_debris(&mut state.universe, &mut state.rng, body.position);
    state.events.push(GameEvent::SaucerDestroyed { size });
    Some(size)
}

/// Scoop up every floating crystal near the ship into the bin
fn collect_crystals(state: &mut GameState) {
    let Some(ship) = state.universe.ship_body() else {
        return;
    };
    if ship.in_hyperspace() {
        return;
    }
    let reach = ship.position;

    let in_range: Vec<BodyKey> = state
        .universe
        .crystals()
        .iter()
        .copied()
        .filter(|&key| {
            state
                .universe
                .get(key)
                .is_some_and(|c| c.position.distance(reach) <= CRYSTAL_COLLECTION_RADIUS)
        })
        .collect();

    let mut count = 0;
    for key in in_range {
        if let Some(Body {
            kind: BodyKind::Crystal { material },
            ..
        }) = state.universe.remove(key)
        {
            state.bin.add_particle(material, 1);
            count += 1;
        }
    }
    if count > 0 {
        state.events.push(GameEvent::CrystalsCollected { count });
    }
}

fn check_fuel_and_docking(state: &mut GameState) {
    let Some(ship) = state.universe.ship_body() else {
        return;
    };

    if let Some(ship_state) = ship.ship_state()
        && !ship_state.has_fuel()
        && !state.rescue_needed
    {
        state.rescue_needed = true;
        state.events.push(GameEvent::OutOfFuel);
        log::info!("Out of fuel");
    }

    state.near_station = state
        .universe
        .station()
        .and_then(|key| state.universe.get(key))
        .is_some_and(|station| station.distance_to(ship) <= STATION_DOCKING_RANGE);
    if !state.near_station {
        state.shop_open = false;
    }
}

fn level_up(state: &mut GameState) {
    state.level += 1;
    spawn::add_random_rocks(&mut state.universe, &mut state.rng, spawn::LEVEL_UP_ROCKS);
    state.events.push(GameEvent::LevelUp);
    log::info!(
        "Level {}: {} new rocks",
        state.level,
        spawn::LEVEL_UP_ROCKS
    );
}

fn check_extra_life(state: &mut GameState) {
    if state.money > 0 && state.money > state.next_life {
        state.next_life += state.settings.extra_life_step;
        state.lives += 1;
        state.events.push(GameEvent::ExtraLife);
        log::info!("Extra life, {} lives", state.lives);
    }
}

fn finish_explosion(state: &mut GameState) {
    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!("Game over with ${}", state.money);
    } else {
        state.spawn_ship();
        state.phase = GamePhase::Playing;
    }
}
