//! Astro Miner - a top-down asteroid mining arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (universe registry, collisions, crystal bin, economy)
//! - `settings`: Game setup values loaded once at start
//! - `error`: Start-up and validation errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Padding around a queried region so partially visible bodies are kept
    pub const REGION_PADDING: f32 = 50.0;

    /// Separation below which a contact normal is considered degenerate
    pub const MIN_CONTACT_DISTANCE: f32 = 0.1;

    /// Rock-rock restitution
    pub const ROCK_RESTITUTION: f32 = 0.8;
    /// Collision radius per rock size (large, medium, small)
    pub const ROCK_RADII: [f32; 3] = [35.0, 22.0, 12.0];
    /// Mass per rock size (large, medium, small)
    pub const ROCK_MASSES: [f32; 3] = [3.0, 2.0, 1.0];
    /// Polygon scale per rock size
    pub const ROCK_SCALES: [f32; 3] = [2.5, 1.5, 0.6];
    /// Max heading component per rock size
    pub const ROCK_SPEEDS: [f32; 3] = [1.5, 3.0, 2.5];
    /// Money earned per destroyed rock size
    pub const ROCK_REWARDS: [u32; 3] = [50, 100, 200];
    /// Degrees per tick every rock turns
    pub const ROCK_SPIN: f32 = 1.0;
    /// Max random angle kick (degrees) on a rock-rock impact
    pub const ROCK_IMPACT_SPIN: f32 = 5.0;

    /// Ship handling
    pub const SHIP_ACCELERATION: f32 = 0.2;
    pub const SHIP_DECELERATION: f32 = -0.005;
    pub const SHIP_MAX_VELOCITY: f32 = 10.0;
    pub const SHIP_TURN_ANGLE: f32 = 6.0;
    pub const SHIP_BULLET_VELOCITY: f32 = 13.0;
    pub const SHIP_MAX_BULLETS: usize = 4;
    pub const SHIP_BULLET_TTL: i32 = 35;
    pub const SHIP_MAX_FUEL: f32 = 100.0;
    pub const SHIP_FUEL_PER_THRUST: f32 = 0.3;
    /// Fraction of the tank under which the low fuel warning is raised
    pub const LOW_FUEL_FRACTION: f32 = 0.2;
    pub const HYPERSPACE_TICKS: u32 = 100;
    /// Minimum distance from the universe edge after a hyperspace jump
    pub const HYPERSPACE_EDGE_MARGIN: f32 = 100.0;

    /// Saucer tuning per size (large, small)
    pub const SAUCER_SPEEDS: [f32; 2] = [1.5, 2.5];
    pub const SAUCER_SCALES: [f32; 2] = [1.5, 1.0];
    pub const SAUCER_REWARDS: [u32; 2] = [500, 1000];
    pub const SAUCER_BULLET_TTL: [i32; 2] = [60, 90];
    pub const SAUCER_BULLET_VELOCITY: f32 = 5.0;
    pub const SAUCER_MAX_BULLETS: usize = 1;
    /// Laps flown before the saucer leaves
    pub const SAUCER_MAX_LAPS: u32 = 2;

    /// Transient bodies
    pub const DEBRIS_TTL: i32 = 50;
    pub const DEBRIS_COUNT: usize = 25;
    pub const DEBRIS_SPEED: f32 = 1.5;
    pub const CRYSTAL_TTL: i32 = 600;
    pub const CRYSTAL_FRICTION: f32 = 0.995;
    pub const CRYSTAL_SIZE: f32 = 4.0;
    pub const CRYSTAL_COLLECTION_RADIUS: f32 = 40.0;
    /// Ticks the ship wreckage lingers before respawn
    pub const EXPLODING_TICKS: u32 = 180;

    /// Space station
    pub const STATION_DOCKING_RANGE: f32 = 80.0;
    /// Station offset from the universe centre
    pub const STATION_OFFSET: f32 = 150.0;

    /// Economy
    pub const FUEL_COST_PER_UNIT: f32 = 3.0;
    pub const RESCUE_COST: u32 = 100;
    pub const RESCUE_FUEL: f32 = 10.0;
    /// Rescued ships are parked this far left of the station
    pub const RESCUE_PARKING_OFFSET: f32 = 100.0;

    /// Camera smoothing factor per tick
    pub const CAMERA_FOLLOW_SPEED: f32 = 0.1;

    /// Crystal bin physics
    pub const BIN_GRAVITY: f32 = 0.2;
    pub const BIN_MAX_VELOCITY: f32 = 8.0;
    pub const BIN_PARTICLE_RADIUS: f32 = 6.0;
    pub const BIN_PARTICLE_RESTITUTION: f32 = 0.8;
    /// Fraction of the overlap each moving particle is pushed out by
    pub const BIN_SEPARATION_SHARE: f32 = 0.51;
    pub const BIN_WALL_BOUNCE: f32 = 0.6;
    pub const BIN_FLOOR_FRICTION: f32 = 0.98;
    pub const SETTLE_VELOCITY: f32 = 0.15;
    pub const SLOW_VELOCITY: f32 = 0.5;
    pub const FAST_VELOCITY: f32 = 1.0;
    pub const SETTLE_DAMPING: f32 = 0.9;
    pub const SLOW_DAMPING: f32 = 0.95;
    pub const SETTLE_TICKS: u32 = 30;
    pub const MAX_SETTLING_TICKS: u32 = 300;
}

/// Rotate a model-space point by `degrees`.
///
/// Uses the screen-space convention of the vector sprites (y grows downward),
/// so a positive angle turns the ship's nose to the left.
#[inline]
pub fn rotate_point(point: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(point.x * cos + point.y * sin, point.y * cos - point.x * sin)
}

/// Unit vector a body with the given angle points its nose along
#[inline]
pub fn nose_direction(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(-sin, -cos)
}
