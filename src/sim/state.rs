//! Game state and core simulation types
//!
//! Everything one run of the game owns lives in [`GameState`]; the per-entity
//! payloads carried by [`super::BodyKind`] are defined here as well.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::Body;
use super::camera::Camera;
use super::crystal_bin::CrystalBin;
use super::spawn;
use super::universe::{BodyKey, Universe};
use crate::Settings;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, rocks drift in the background
    Attract,
    /// Active gameplay
    Playing,
    /// Ship wreckage is drifting, waiting to respawn
    Exploding,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Ore found in rocks and the crystals they drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Coal,
    Iron,
    Gold,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Coal, Material::Iron, Material::Gold];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Coal => "Coal",
            Material::Iron => "Iron",
            Material::Gold => "Gold",
        }
    }

    /// Sale price of one crystal
    pub fn value(&self) -> u32 {
        match self {
            Material::Coal => 1,
            Material::Iron => 3,
            Material::Gold => 10,
        }
    }

    /// Colour of a crystal of this material
    pub fn crystal_color(&self) -> [u8; 3] {
        match self {
            Material::Coal => [64, 64, 64],
            Material::Iron => [169, 169, 169],
            Material::Gold => [255, 215, 0],
        }
    }

    /// Tint of a rock carrying this ore
    pub fn rock_color(&self) -> [u8; 3] {
        match self {
            Material::Coal => [80, 80, 80],
            Material::Iron => [140, 140, 140],
            Material::Gold => [200, 180, 60],
        }
    }

    /// Pick an ore from a uniform roll in `[0, 1)`: gold 10%, iron 30%, coal the rest
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.1 {
            Material::Gold
        } else if roll < 0.4 {
            Material::Iron
        } else {
            Material::Coal
        }
    }

    fn index(&self) -> usize {
        match self {
            Material::Coal => 0,
            Material::Iron => 1,
            Material::Gold => 2,
        }
    }
}

/// Per-material tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialCounts([u32; 3]);

impl MaterialCounts {
    pub fn get(&self, material: Material) -> u32 {
        self.0[material.index()]
    }

    pub fn add(&mut self, material: Material) {
        self.0[material.index()] += 1;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Rock sizes, largest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RockSize {
    Large,
    Medium,
    Small,
}

impl RockSize {
    fn index(&self) -> usize {
        match self {
            RockSize::Large => 0,
            RockSize::Medium => 1,
            RockSize::Small => 2,
        }
    }

    /// Radius of the circle used for rock-rock contacts
    pub fn radius(&self) -> f32 {
        ROCK_RADII[self.index()]
    }

    pub fn mass(&self) -> f32 {
        ROCK_MASSES[self.index()]
    }

    pub fn scale(&self) -> f32 {
        ROCK_SCALES[self.index()]
    }

    /// Max absolute heading component for a fresh rock
    pub fn speed(&self) -> f32 {
        ROCK_SPEEDS[self.index()]
    }

    pub fn reward(&self) -> u32 {
        ROCK_REWARDS[self.index()]
    }

    /// Size of the two pieces a destroyed rock breaks into
    pub fn split(&self) -> Option<RockSize> {
        match self {
            RockSize::Large => Some(RockSize::Medium),
            RockSize::Medium => Some(RockSize::Small),
            RockSize::Small => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaucerSize {
    Large,
    Small,
}

impl SaucerSize {
    fn index(&self) -> usize {
        match self {
            SaucerSize::Large => 0,
            SaucerSize::Small => 1,
        }
    }

    pub fn speed(&self) -> f32 {
        SAUCER_SPEEDS[self.index()]
    }

    pub fn scale(&self) -> f32 {
        SAUCER_SCALES[self.index()]
    }

    /// Money for shooting it down
    pub fn reward(&self) -> u32 {
        SAUCER_REWARDS[self.index()]
    }

    pub fn bullet_ttl(&self) -> i32 {
        SAUCER_BULLET_TTL[self.index()]
    }
}

/// Ship-only state carried on its body
#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    pub fuel: f32,
    pub low_fuel_warning: bool,
    /// Ticks left in hyperspace (0 = in normal space)
    pub hyperspace_ticks: u32,
    /// Thrust was applied this tick (drives the exhaust flame)
    pub thrusting: bool,
}

impl Default for ShipState {
    fn default() -> Self {
        Self {
            fuel: SHIP_MAX_FUEL,
            low_fuel_warning: false,
            hyperspace_ticks: 0,
            thrusting: false,
        }
    }
}

impl ShipState {
    #[inline]
    pub fn in_hyperspace(&self) -> bool {
        self.hyperspace_ticks > 0
    }

    #[inline]
    pub fn has_fuel(&self) -> bool {
        self.fuel > 0.0
    }

    /// Fuel level in percent (0-100)
    pub fn fuel_percentage(&self) -> f32 {
        self.fuel / SHIP_MAX_FUEL * 100.0
    }

    /// Fuel needed to fill the tank
    pub fn missing_fuel(&self) -> f32 {
        (SHIP_MAX_FUEL - self.fuel).max(0.0)
    }

    pub fn refill(&mut self) {
        self.fuel = SHIP_MAX_FUEL;
        self.low_fuel_warning = false;
    }

    /// Spend one thrust worth of fuel
    pub fn burn_fuel(&mut self) {
        self.fuel = (self.fuel - SHIP_FUEL_PER_THRUST).max(0.0);
        self.low_fuel_warning = self.fuel < SHIP_MAX_FUEL * LOW_FUEL_FRACTION;
    }
}

/// Saucer-only state carried on its body
#[derive(Debug, Clone, PartialEq)]
pub struct SaucerState {
    pub size: SaucerSize,
    /// Completed laps (one lap = one screen width flown)
    pub laps: u32,
    /// World x where the current lap began
    pub lap_start_x: f32,
    pub lap_width: f32,
}

/// Something the audio/UI layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ShotFired { by_ship: bool },
    RockDestroyed { size: RockSize, material: Material },
    ShipDestroyed,
    SaucerSpawned { size: SaucerSize },
    SaucerDestroyed { size: SaucerSize },
    CrystalsCollected { count: u32 },
    ExtraLife,
    LevelUp,
    OutOfFuel,
    Rescued,
    FuelPurchased { cost: u32 },
    CrystalsSold { earned: u32 },
    Docked,
    Hyperspace,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub universe: Universe,
    pub camera: Camera,
    /// Collected crystals
    pub bin: CrystalBin,
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub(crate) paused_from: GamePhase,
    pub money: u32,
    pub lives: u32,
    /// Money mark for the next extra life
    pub next_life: u32,
    /// Levels cleared this run
    pub level: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks spent in the current explosion
    pub exploding_ticks: u32,
    /// Ship is within docking range of the station
    pub near_station: bool,
    pub shop_open: bool,
    /// Ship ran dry and is waiting for the rescue service
    pub rescue_needed: bool,
    /// Events raised by the latest tick
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create the attract-mode state for the given settings
    pub fn new(settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let mut universe = Universe::new(
            settings.universe_width,
            settings.universe_height,
            settings.seed,
        );
        spawn::create_asteroid_belts(&mut universe, &mut rng, 6, 20);

        let camera = Camera::new(
            settings.screen_width,
            settings.screen_height,
            settings.universe_width,
            settings.universe_height,
        );

        Self {
            bin: CrystalBin::for_screen(settings.screen_width, settings.seed),
            universe,
            camera,
            phase: GamePhase::Attract,
            paused_from: GamePhase::Attract,
            money: settings.starting_money,
            lives: 0,
            next_life: settings.extra_life_step,
            level: 0,
            time_ticks: 0,
            exploding_ticks: 0,
            near_station: false,
            shop_open: false,
            rescue_needed: false,
            events: Vec::new(),
            rng,
            settings,
        }
    }

    /// Reset everything and begin a new run
    pub fn start_game(&mut self) {
        let settings = &self.settings;
        self.universe = Universe::new(
            settings.universe_width,
            settings.universe_height,
            settings.seed.wrapping_add(self.time_ticks),
        );
        self.bin = CrystalBin::for_screen(settings.screen_width, settings.seed);
        self.money = settings.starting_money;
        self.lives = settings.starting_lives;
        self.next_life = settings.extra_life_step;
        self.level = 0;
        self.exploding_ticks = 0;
        self.near_station = false;
        self.shop_open = false;
        self.rescue_needed = false;

        let belts = settings.belts.max(1);
        let per_belt = settings.rocks / belts;
        self.spawn_ship();
        spawn::create_asteroid_belts(&mut self.universe, &mut self.rng, belts, per_belt);
        let station = spawn::station_position(&self.universe);
        self.universe.add(Body::station(station));
        self.phase = GamePhase::Playing;
        log::info!(
            "New game: {} rocks in {} belts, ${}",
            self.universe.rocks().len(),
            belts,
            self.money
        );
    }

    /// Put a fresh ship at the universe centre and follow it
    pub fn spawn_ship(&mut self) -> BodyKey {
        let center = self.universe.center();
        let key = self.universe.add(Body::ship(center));
        self.camera.set_target(Some(key));
        key
    }

    /// Ship state, if a ship is alive
    pub fn ship(&self) -> Option<&ShipState> {
        self.universe.ship_body().and_then(|b| b.ship_state())
    }

    /// Bodies inside the camera's view (plus padding), for the renderer
    pub fn visible_bodies(&self) -> Vec<BodyKey> {
        let region = self.camera.visible_region();
        self.universe
            .query_region(region.x, region.y, region.width, region.height)
    }
}
