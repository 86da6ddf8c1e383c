//! Spatial bodies: positioned, moving, rotatable polygons
//!
//! A body keeps its outline in model space. World-space points are produced on
//! demand by rotating about the origin first and translating second, so the
//! bounding box is always derived from the current position and angle.

use glam::Vec2;

use super::state::{Material, RockSize, SaucerSize, SaucerState, ShipState};
use super::universe::BodyKey;
use crate::consts::*;
use crate::{nose_direction, rotate_point};

/// Ship outline, nose up
pub const SHIP_SHAPE: [Vec2; 5] = [
    Vec2::new(0.0, -10.0),
    Vec2::new(6.0, 10.0),
    Vec2::new(3.0, 7.0),
    Vec2::new(-3.0, 7.0),
    Vec2::new(-6.0, 10.0),
];

/// Saucer outline before scaling
pub const SAUCER_SHAPE: [Vec2; 11] = [
    Vec2::new(-9.0, 0.0),
    Vec2::new(-3.0, -3.0),
    Vec2::new(-2.0, -6.0),
    Vec2::new(-2.0, -6.0),
    Vec2::new(2.0, -6.0),
    Vec2::new(3.0, -3.0),
    Vec2::new(9.0, 0.0),
    Vec2::new(-9.0, 0.0),
    Vec2::new(-3.0, 4.0),
    Vec2::new(3.0, 4.0),
    Vec2::new(9.0, 0.0),
];

/// Unit sprite used for bullets and debris
pub const POINT_SHAPE: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
];

/// Station hull, docking ports and panels
pub const STATION_SHAPE: [Vec2; 21] = [
    Vec2::new(-20.0, -15.0),
    Vec2::new(20.0, -15.0),
    Vec2::new(20.0, 15.0),
    Vec2::new(-20.0, 15.0),
    Vec2::new(-20.0, -15.0),
    Vec2::new(-20.0, -5.0),
    Vec2::new(-30.0, -5.0),
    Vec2::new(-30.0, 5.0),
    Vec2::new(-20.0, 5.0),
    Vec2::new(20.0, -5.0),
    Vec2::new(30.0, -5.0),
    Vec2::new(30.0, 5.0),
    Vec2::new(20.0, 5.0),
    Vec2::new(-10.0, -15.0),
    Vec2::new(-10.0, -25.0),
    Vec2::new(10.0, -25.0),
    Vec2::new(10.0, -15.0),
    Vec2::new(-15.0, 15.0),
    Vec2::new(-15.0, 25.0),
    Vec2::new(15.0, 25.0),
    Vec2::new(15.0, 15.0),
];

/// Number of distinct rock outlines
pub const ROCK_SHAPE_COUNT: usize = 4;

/// Unscaled rock outline `index % ROCK_SHAPE_COUNT`
pub fn rock_shape(index: usize) -> Vec<Vec2> {
    let raw: &[(f32, f32)] = match index % ROCK_SHAPE_COUNT {
        0 => &[
            (-4.0, -12.0),
            (6.0, -12.0),
            (13.0, -4.0),
            (13.0, 5.0),
            (6.0, 13.0),
            (0.0, 13.0),
            (0.0, 4.0),
            (-8.0, 13.0),
            (-15.0, 4.0),
            (-7.0, 1.0),
            (-15.0, -3.0),
        ],
        1 => &[
            (-6.0, -12.0),
            (1.0, -5.0),
            (8.0, -12.0),
            (15.0, -5.0),
            (12.0, 0.0),
            (15.0, 6.0),
            (5.0, 13.0),
            (-7.0, 13.0),
            (-14.0, 7.0),
            (-14.0, -5.0),
        ],
        2 => &[
            (-7.0, -12.0),
            (1.0, -9.0),
            (8.0, -12.0),
            (15.0, -5.0),
            (8.0, -3.0),
            (15.0, 4.0),
            (8.0, 12.0),
            (-3.0, 10.0),
            (-6.0, 12.0),
            (-14.0, 7.0),
            (-10.0, 0.0),
            (-14.0, -5.0),
        ],
        _ => &[
            (-7.0, -11.0),
            (3.0, -11.0),
            (13.0, -5.0),
            (13.0, -2.0),
            (2.0, 2.0),
            (13.0, 8.0),
            (6.0, 14.0),
            (2.0, 10.0),
            (-7.0, 14.0),
            (-15.0, 5.0),
            (-15.0, -5.0),
            (-5.0, -5.0),
            (-7.0, -11.0),
        ],
    };
    raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

/// Diamond outline of a floating crystal
pub fn crystal_shape() -> Vec<Vec2> {
    let s = CRYSTAL_SIZE;
    vec![
        Vec2::new(0.0, -s),
        Vec2::new(s, 0.0),
        Vec2::new(0.0, s),
        Vec2::new(-s, 0.0),
    ]
}

/// What a body is; set by whoever creates it
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Rock { size: RockSize, material: Material },
    Bullet { owner: BodyKey },
    Debris,
    /// A line of the ship's hull after an explosion
    Wreckage,
    Crystal { material: Material },
    Ship(ShipState),
    Saucer(SaucerState),
    Station,
}

/// Registry view a body is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Rock,
    Bullet,
    Debris,
    Crystal,
    Ship,
    Saucer,
    Station,
}

impl BodyKind {
    pub fn category(&self) -> Category {
        match self {
            BodyKind::Rock { .. } => Category::Rock,
            BodyKind::Bullet { .. } => Category::Bullet,
            BodyKind::Debris | BodyKind::Wreckage => Category::Debris,
            BodyKind::Crystal { .. } => Category::Crystal,
            BodyKind::Ship(_) => Category::Ship,
            BodyKind::Saucer(_) => Category::Saucer,
            BodyKind::Station => Category::Station,
        }
    }
}

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Smallest box containing every point; `None` for an empty list
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn around(center: Vec2, half_extent: f32) -> Self {
        Self {
            min: center - Vec2::splat(half_extent),
            max: center + Vec2::splat(half_extent),
        }
    }

    /// Top-left corner
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.min
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap: boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Any positioned, moving polygon in the universe
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    /// Velocity in world units per tick
    pub heading: Vec2,
    /// Orientation in degrees
    pub angle: f32,
    /// Degrees added to `angle` every tick
    pub spin: f32,
    /// Outline in model space
    pub points: Vec<Vec2>,
    /// Ticks left to live; `None` lives until removed
    pub ttl: Option<i32>,
    pub color: [u8; 3],
}

impl Body {
    pub fn new(kind: BodyKind, position: Vec2, heading: Vec2, points: Vec<Vec2>) -> Self {
        Self {
            kind,
            position,
            heading,
            angle: 0.0,
            spin: 0.0,
            points,
            ttl: None,
            color: [255, 255, 255],
        }
    }

    pub fn with_ttl(mut self, ttl: i32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// A rock of the given outline, scaled for its size
    pub fn rock(
        position: Vec2,
        heading: Vec2,
        size: RockSize,
        material: Material,
        shape: usize,
    ) -> Self {
        let points = rock_shape(shape)
            .into_iter()
            .map(|p| p * size.scale())
            .collect();
        Self::new(BodyKind::Rock { size, material }, position, heading, points)
            .with_spin(ROCK_SPIN)
            .with_color(material.rock_color())
    }

    pub fn bullet(owner: BodyKey, position: Vec2, heading: Vec2, ttl: i32) -> Self {
        Self::new(
            BodyKind::Bullet { owner },
            position,
            heading,
            POINT_SHAPE.to_vec(),
        )
        .with_ttl(ttl)
    }

    pub fn debris(position: Vec2, heading: Vec2) -> Self {
        Self::new(BodyKind::Debris, position, heading, POINT_SHAPE.to_vec())
            .with_ttl(DEBRIS_TTL)
    }

    /// One hull line flying away from an exploded ship
    pub fn wreckage(position: Vec2, heading: Vec2, line: [Vec2; 2], angle: f32) -> Self {
        Self::new(BodyKind::Wreckage, position, heading, line.to_vec())
            .with_angle(angle)
            .with_ttl(EXPLODING_TICKS as i32)
    }

    pub fn crystal(position: Vec2, heading: Vec2, material: Material) -> Self {
        Self::new(
            BodyKind::Crystal { material },
            position,
            heading,
            crystal_shape(),
        )
        .with_ttl(CRYSTAL_TTL)
        .with_color(material.crystal_color())
    }

    pub fn ship(position: Vec2) -> Self {
        Self::new(
            BodyKind::Ship(ShipState::default()),
            position,
            Vec2::ZERO,
            SHIP_SHAPE.to_vec(),
        )
    }

    /// A saucer entering at `position`, flying right; one lap is `lap_width` units
    pub fn saucer(position: Vec2, size: SaucerSize, lap_width: f32) -> Self {
        let points = SAUCER_SHAPE.iter().map(|&p| p * size.scale()).collect();
        let state = SaucerState {
            size,
            laps: 0,
            lap_start_x: position.x,
            lap_width,
        };
        Self::new(
            BodyKind::Saucer(state),
            position,
            Vec2::new(size.speed(), 0.0),
            points,
        )
    }

    pub fn station(position: Vec2) -> Self {
        Self::new(
            BodyKind::Station,
            position,
            Vec2::ZERO,
            STATION_SHAPE.to_vec(),
        )
        .with_color([0, 255, 255])
    }

    /// Advance one tick: apply heading and spin, count down ttl, then the
    /// kind-specific behaviour
    pub fn advance(&mut self) {
        if matches!(self.kind, BodyKind::Station) {
            return;
        }

        self.position += self.heading;
        self.angle += self.spin;
        if let Some(ttl) = self.ttl.as_mut() {
            *ttl -= 1;
        }

        match &mut self.kind {
            BodyKind::Crystal { .. } => {
                self.heading *= CRYSTAL_FRICTION;
            }
            BodyKind::Ship(_) => {
                // Space drag
                if self.heading != Vec2::ZERO {
                    self.heading += self.heading * SHIP_DECELERATION;
                }
            }
            BodyKind::Saucer(saucer) => {
                let travelled = self.position.x - saucer.lap_start_x;
                if saucer.lap_width > 0.0 && travelled >= saucer.lap_width {
                    saucer.laps += 1;
                    saucer.lap_start_x += saucer.lap_width;
                }
                let progress = (self.position.x - saucer.lap_start_x) / saucer.lap_width;
                // Dive across the middle third of every lap
                self.heading.y = if progress > 0.33 && progress < 0.66 {
                    self.heading.x
                } else {
                    0.0
                };
            }
            _ => {}
        }
    }

    /// Outline rotated by `angle` and moved to `position`
    pub fn world_points(&self) -> Vec<Vec2> {
        self.points
            .iter()
            .map(|&p| rotate_point(p, self.angle) + self.position)
            .collect()
    }

    /// Bounding box of the current world-space outline
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.world_points())
            .unwrap_or_else(|| Bounds::around(self.position, 5.0))
    }

    /// Still counts for collisions (no ttl, or ttl left)
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ttl.is_none_or(|t| t > 0)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        !self.is_active()
    }

    pub fn distance_to(&self, other: &Body) -> f32 {
        self.position.distance(other.position)
    }

    pub fn rock_size(&self) -> Option<RockSize> {
        match self.kind {
            BodyKind::Rock { size, .. } => Some(size),
            _ => None,
        }
    }

    pub fn ship_state(&self) -> Option<&ShipState> {
        match &self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn ship_state_mut(&mut self) -> Option<&mut ShipState> {
        match &mut self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn saucer_state(&self) -> Option<&SaucerState> {
        match &self.kind {
            BodyKind::Saucer(saucer) => Some(saucer),
            _ => None,
        }
    }

    /// Ship currently in hyperspace
    pub fn in_hyperspace(&self) -> bool {
        self.ship_state().is_some_and(|s| s.in_hyperspace())
    }

    /// Turn by `degrees` (positive is counter-clockwise on screen)
    pub fn rotate(&mut self, degrees: f32) {
        self.angle += degrees;
    }

    /// Fire the ship's engine for one tick. Returns false when there is no
    /// fuel, the ship is at top speed, or this is not a ship.
    pub fn thrust(&mut self) -> bool {
        let speed = self.heading.length();
        let angle = self.angle;
        let Some(ship) = self.ship_state_mut() else {
            return false;
        };
        if !ship.has_fuel() {
            ship.thrusting = false;
            return false;
        }
        if speed > SHIP_MAX_VELOCITY {
            return false;
        }
        ship.burn_fuel();
        ship.thrusting = true;
        self.heading += nose_direction(angle) * SHIP_ACCELERATION;
        true
    }

    /// Direction and speed of a bullet fired along the nose
    pub fn muzzle_heading(&self) -> Vec2 {
        nose_direction(self.angle) * SHIP_BULLET_VELOCITY
    }
}
