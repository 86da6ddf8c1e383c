//! Body factories
//!
//! Everything that puts new rocks, debris, crystals, wreckage or saucers into
//! the universe goes through here, drawing from the caller's seeded RNG.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::{Body, ROCK_SHAPE_COUNT, SHIP_SHAPE};
use super::state::{Material, RockSize, SaucerSize};
use super::universe::{BodyKey, Universe};
use crate::consts::*;

/// Belt centres and level-up rocks keep this far from the spawn point
const BELT_CLEARANCE: f32 = 1000.0;
const LEVEL_ROCK_CLEARANCE: f32 = 800.0;
/// Rocks added by each level up
pub const LEVEL_UP_ROCKS: usize = 24;
/// Give up looking for a far-enough spot after this many draws
const PLACEMENT_ATTEMPTS: usize = 256;

/// Random drift for a new rock. Zero components are nudged so no rock sits
/// still or moves along an axis.
pub fn random_rock_heading(rng: &mut impl Rng, size: RockSize) -> Vec2 {
    let speed = size.speed();
    let mut heading = Vec2::new(
        rng.random_range(-speed..speed),
        rng.random_range(-speed..speed),
    );
    if heading.x == 0.0 {
        heading.x = 0.1;
    }
    if heading.y == 0.0 {
        heading.y = 0.1;
    }
    heading
}

/// Add one rock; the ore is rolled unless given
pub fn spawn_rock(
    universe: &mut Universe,
    rng: &mut impl Rng,
    position: Vec2,
    size: RockSize,
    material: Option<Material>,
) -> BodyKey {
    let heading = random_rock_heading(rng, size);
    let material = material.unwrap_or_else(|| Material::from_roll(rng.random()));
    let shape = rng.random_range(0..ROCK_SHAPE_COUNT);
    universe.add(Body::rock(position, heading, size, material, shape))
}

/// Point in the middle 80% of the universe, preferably farther than
/// `clearance` from the centre
fn random_far_point(universe: &Universe, rng: &mut impl Rng, clearance: f32) -> Vec2 {
    let center = universe.center();
    let mut point = center;
    for _ in 0..PLACEMENT_ATTEMPTS {
        point = Vec2::new(
            rng.random_range(universe.width * 0.1..universe.width * 0.9),
            rng.random_range(universe.height * 0.1..universe.height * 0.9),
        );
        if point.distance(center) > clearance {
            return point;
        }
    }
    log::debug!("No spot {} from centre, using {:?}", clearance, point);
    point
}

/// Replace all rocks with `belts` rings of `rocks_per_belt` rocks each.
///
/// Large rocks make up 60% of a belt, medium 25% and small 15%.
pub fn create_asteroid_belts(
    universe: &mut Universe,
    rng: &mut impl Rng,
    belts: u32,
    rocks_per_belt: u32,
) {
    universe.clear_rocks();

    for _ in 0..belts {
        let center = random_far_point(universe, rng, BELT_CLEARANCE);
        let radius = rng.random_range(300.0..800.0);

        for _ in 0..rocks_per_belt {
            let angle = rng.random_range(0.0..TAU);
            let mut distance = rng.random_range(radius * 0.3..radius);
            distance += rng.random_range(-radius * 0.2..radius * 0.2);

            let offset = Vec2::new(angle.cos(), angle.sin()) * distance;
            let position = (center + offset).clamp(
                Vec2::splat(REGION_PADDING),
                Vec2::new(
                    universe.width - REGION_PADDING,
                    universe.height - REGION_PADDING,
                ),
            );

            let roll: f32 = rng.random();
            let size = if roll < 0.6 {
                RockSize::Large
            } else if roll < 0.85 {
                RockSize::Medium
            } else {
                RockSize::Small
            };
            spawn_rock(universe, rng, position, size, None);
        }
    }

    log::debug!(
        "Created {} belts, {} rocks",
        belts,
        universe.rocks().len()
    );
}

/// Scatter `count` rocks across the universe, away from the spawn point
pub fn add_random_rocks(universe: &mut Universe, rng: &mut impl Rng, count: usize) {
    for _ in 0..count {
        let position = random_far_point(universe, rng, LEVEL_ROCK_CLEARANCE);
        let roll: f32 = rng.random();
        let size = if roll < 0.5 {
            RockSize::Large
        } else if roll < 0.8 {
            RockSize::Medium
        } else {
            RockSize::Small
        };
        spawn_rock(universe, rng, position, size, None);
    }
}

/// Two pieces of the next size down, near `position`, same ore
pub fn split_rock(
    universe: &mut Universe,
    rng: &mut impl Rng,
    position: Vec2,
    size: RockSize,
    material: Material,
) -> Vec<BodyKey> {
    let Some(piece) = size.split() else {
        return Vec::new();
    };
    (0..2)
        .map(|_| {
            let offset = Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));
            spawn_rock(universe, rng, position + offset, piece, Some(material))
        })
        .collect()
}

/// Burst of short-lived point debris
pub fn spawn_debris(universe: &mut Universe, rng: &mut impl Rng, position: Vec2) {
    for _ in 0..DEBRIS_COUNT {
        let offset = Vec2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
        let heading = Vec2::new(
            rng.random_range(-DEBRIS_SPEED..=DEBRIS_SPEED),
            rng.random_range(-DEBRIS_SPEED..=DEBRIS_SPEED),
        );
        universe.add(Body::debris(position + offset, heading));
    }
}

/// Drop 3 to 8 crystals of `material`; returns how many
pub fn spawn_crystals(
    universe: &mut Universe,
    rng: &mut impl Rng,
    position: Vec2,
    material: Material,
) -> u32 {
    let count = rng.random_range(3..=8);
    for _ in 0..count {
        let offset = Vec2::new(rng.random_range(-15.0..15.0), rng.random_range(-15.0..15.0));
        let speed = rng.random_range(0.5..=1.5);
        let angle = rng.random_range(0.0..TAU);
        let heading = Vec2::new(angle.cos(), angle.sin()) * speed;
        universe.add(Body::crystal(position + offset, heading, material));
    }
    count
}

/// Break a ship into its five hull lines, drifting away from where it was
pub fn explode_ship(universe: &mut Universe, rng: &mut impl Rng, position: Vec2, angle: f32) {
    let n = SHIP_SHAPE.len();
    for i in 0..n {
        let line = [SHIP_SHAPE[i], SHIP_SHAPE[(i + 1) % n]];
        let offset = Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
        let heading = Vec2::new(
            (offset.x + 0.1) / rng.random_range(20.0..40.0),
            (offset.y + 0.1) / rng.random_range(20.0..40.0),
        );
        universe.add(Body::wreckage(position + offset, heading, line, angle));
    }
}

/// A saucer entering 500 units left of `target`; small 40% of the time
pub fn spawn_saucer(
    universe: &mut Universe,
    rng: &mut impl Rng,
    target: Vec2,
    lap_width: f32,
) -> (BodyKey, SaucerSize) {
    let size = if rng.random_range(0..10) <= 3 {
        SaucerSize::Small
    } else {
        SaucerSize::Large
    };
    let position = Vec2::new(target.x - 500.0, target.y + rng.random_range(-200.0..200.0));
    (universe.add(Body::saucer(position, size, lap_width)), size)
}

/// Where the station is parked for a new game
pub fn station_position(universe: &Universe) -> Vec2 {
    universe.center() + Vec2::new(STATION_OFFSET, 0.0)
}
