//! Crystal collection bin
//!
//! Collected crystals drop into a small box drawn on the HUD and pile up under
//! gravity. The simulation is independent of the universe: it has its own
//! coordinates (screen space), its own RNG and is stepped once per frame.
//!
//! A particle that has been still long enough becomes *settled*: its velocity
//! is zeroed, it is never integrated again and the others treat it as a wall.
//! A particle that keeps jittering is force-settled after a bounded number of
//! slow ticks, so every pile comes to rest.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Material, MaterialCounts};
use crate::consts::*;

/// Outer size of the bin on screen
pub const BIN_WIDTH: f32 = 300.0;
pub const BIN_HEIGHT: f32 = 120.0;
/// Distance from the top of the screen
pub const BIN_TOP: f32 = 10.0;
/// Space reserved for the bin title
const TITLE_HEIGHT: f32 = 30.0;
const SIDE_INSET: f32 = 5.0;
/// Drop points stay this far from the side walls
const DROP_MARGIN: f32 = 20.0;
/// Crystals appear this far above the inner area
const DROP_HEIGHT: f32 = 10.0;

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BinBounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One crystal in the bin
#[derive(Debug, Clone, PartialEq)]
pub struct BinParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub material: Material,
    pub settled: bool,
    /// Consecutive near-still ticks
    pub settle_timer: u32,
    /// Slow ticks since the particle last moved fast
    pub total_settling_attempts: u32,
}

impl BinParticle {
    pub fn new(material: Material, position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            radius: BIN_PARTICLE_RADIUS,
            material,
            settled: false,
            settle_timer: 0,
            total_settling_attempts: 0,
        }
    }

    pub fn value(&self) -> u32 {
        self.material.value()
    }

    pub fn color(&self) -> [u8; 3] {
        self.material.crystal_color()
    }

    fn settle(&mut self) {
        self.settled = true;
        self.velocity = Vec2::ZERO;
    }

    /// Gravity, speed limit, then integrate
    fn integrate(&mut self) {
        self.velocity.y += BIN_GRAVITY;
        self.velocity = self.velocity.clamp_length_max(BIN_MAX_VELOCITY);
        self.position += self.velocity;
    }

    /// Keep the particle inside `area`, bouncing off the walls it touched
    fn contain(&mut self, area: &BinBounds) {
        let r = self.radius;
        let bounce = !self.settled;

        if self.position.x - r < area.x {
            self.position.x = area.x + r;
            if bounce {
                self.velocity.x = self.velocity.x.abs() * BIN_WALL_BOUNCE;
            }
        }
        if self.position.x + r > area.right() {
            self.position.x = area.right() - r;
            if bounce {
                self.velocity.x = -self.velocity.x.abs() * BIN_WALL_BOUNCE;
            }
        }
        if self.position.y + r > area.bottom() {
            self.position.y = area.bottom() - r;
            if bounce {
                self.velocity.y = -self.velocity.y.abs() * BIN_WALL_BOUNCE;
                self.velocity.x *= BIN_FLOOR_FRICTION;
            }
        }
        if self.position.y - r < area.y {
            self.position.y = area.y + r;
            if bounce {
                self.velocity.y = self.velocity.y.abs() * BIN_WALL_BOUNCE;
            }
        }

        self.position.x = self.position.x.clamp(area.x + r, area.right() - r);
        self.position.y = self.position.y.clamp(area.y + r, area.bottom() - r);
    }

    /// Update the settling counters from the current velocity
    fn classify(&mut self) {
        let (vx, vy) = (self.velocity.x.abs(), self.velocity.y.abs());

        if vx < SETTLE_VELOCITY && vy < SETTLE_VELOCITY {
            self.settle_timer += 1;
            self.total_settling_attempts += 1;
            self.velocity *= SETTLE_DAMPING;
            if self.settle_timer > SETTLE_TICKS {
                self.settle();
            }
        } else if vx < SLOW_VELOCITY && vy < SLOW_VELOCITY {
            self.total_settling_attempts += 1;
            self.settle_timer = 0;
            self.velocity *= SLOW_DAMPING;
        } else {
            self.settle_timer = 0;
            if vx > FAST_VELOCITY || vy > FAST_VELOCITY {
                self.total_settling_attempts = 0;
            }
        }

        if self.total_settling_attempts > MAX_SETTLING_TICKS {
            self.settle();
        }
    }
}

/// Push `particle` out of `other` and resolve their contact.
///
/// A settled particle never moves; the moving one bounces off it like a wall.
fn collide(particle: &mut BinParticle, other: &mut BinParticle) {
    let delta = particle.position - other.position;
    let distance = delta.length();
    let min_distance = particle.radius + other.radius;
    if distance >= min_distance || distance <= MIN_CONTACT_DISTANCE {
        return;
    }

    // Points from `other` towards `particle`
    let normal = delta / distance;
    let overlap = min_distance - distance;

    if other.settled {
        bounce_off_settled(particle, normal, overlap);
    } else if particle.settled {
        bounce_off_settled(other, -normal, overlap);
    } else {
        let push = normal * (overlap * BIN_SEPARATION_SHARE);
        particle.position += push;
        other.position -= push;

        let closing = (particle.velocity - other.velocity).dot(normal);
        if closing > 0.0 {
            return;
        }
        let impulse = normal * (closing * BIN_PARTICLE_RESTITUTION * 0.5);
        particle.velocity -= impulse;
        other.velocity += impulse;
    }
}

/// `normal` points away from the settled particle
fn bounce_off_settled(particle: &mut BinParticle, normal: Vec2, overlap: f32) {
    particle.position += normal * overlap;
    let approach = particle.velocity.dot(normal);
    if approach < 0.0 {
        particle.velocity -= normal * (2.0 * approach * BIN_PARTICLE_RESTITUTION);
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[derive(Debug, Clone)]
pub struct CrystalBin {
    /// Outer frame, for drawing
    pub frame: BinBounds,
    /// Area particles are confined to
    pub inner: BinBounds,
    particles: Vec<BinParticle>,
    rng: Pcg32,
}

impl CrystalBin {
    /// Only the fixed-size frame from `for_screen` leaves room to drop crystals
    fn with_frame(frame: BinBounds, seed: u64) -> Self {
        let inner = BinBounds::new(
            frame.x + SIDE_INSET,
            frame.y + TITLE_HEIGHT,
            frame.width - 2.0 * SIDE_INSET,
            frame.height - TITLE_HEIGHT - SIDE_INSET,
        );
        Self {
            frame,
            inner,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// The standard bin, centred at the top of a screen of the given width
    pub fn for_screen(screen_width: f32, seed: u64) -> Self {
        let x = ((screen_width - BIN_WIDTH) / 2.0).floor();
        Self::with_frame(BinBounds::new(x, BIN_TOP, BIN_WIDTH, BIN_HEIGHT), seed)
    }

    /// Drop `amount` crystals of `material` in from the top
    pub fn add_particle(&mut self, material: Material, amount: u32) {
        let inner = self.inner;
        for _ in 0..amount {
            let x = self
                .rng
                .random_range(inner.x + DROP_MARGIN..=inner.right() - DROP_MARGIN);
            let velocity = Vec2::new(
                self.rng.random_range(-2.0..=2.0),
                self.rng.random_range(-1.0..=1.0),
            );
            let position = Vec2::new(x, inner.y - DROP_HEIGHT);
            self.particles.push(BinParticle::new(material, position, velocity));
        }
    }

    /// Step every particle once, in insertion order
    pub fn advance(&mut self) -> &[BinParticle] {
        for i in 0..self.particles.len() {
            self.step_particle(i);
        }
        &self.particles
    }

    fn step_particle(&mut self, index: usize) {
        if self.particles[index].settled {
            return;
        }
        self.particles[index].integrate();

        for other in 0..self.particles.len() {
            if other == index {
                continue;
            }
            let (particle, other) = pair_mut(&mut self.particles, index, other);
            collide(particle, other);
        }

        let particle = &mut self.particles[index];
        particle.contain(&self.inner);
        particle.classify();
    }

    pub fn particles(&self) -> &[BinParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn total_value(&self) -> u32 {
        self.particles.iter().map(BinParticle::value).sum()
    }

    pub fn counts(&self) -> MaterialCounts {
        let mut counts = MaterialCounts::default();
        for particle in &self.particles {
            counts.add(particle.material);
        }
        counts
    }

    /// Empty the bin; returns the money earned
    pub fn sell_all(&mut self) -> u32 {
        let earned = self.total_value();
        self.particles.clear();
        earned
    }

    /// Sell every crystal of one material; returns the money earned
    pub fn sell_material(&mut self, material: Material) -> u32 {
        let mut earned = 0;
        self.particles.retain(|p| {
            if p.material == material {
                earned += p.value();
                false
            } else {
                true
            }
        });
        earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bin() -> CrystalBin {
        CrystalBin::for_screen(1024.0, 7)
    }

    #[test]
    fn test_standard_layout() {
        let bin = bin();
        assert_eq!(bin.frame, BinBounds::new(362.0, 10.0, 300.0, 120.0));
        assert_eq!(bin.inner, BinBounds::new(367.0, 40.0, 290.0, 85.0));
    }

    #[test]
    fn test_any_screen_width_gives_full_size_bin() {
        for width in [0.0, 100.0, 4000.0] {
            let mut bin = CrystalBin::for_screen(width, 3);
            assert_eq!(bin.frame.width, BIN_WIDTH);
            assert_eq!(bin.inner.width, 290.0);
            bin.add_particle(Material::Gold, 5);
            for _ in 0..10 {
                bin.advance();
            }
            assert_eq!(bin.len(), 5);
        }
    }

    #[test]
    fn test_drop_position_and_velocity() {
        let mut bin = bin();
        bin.add_particle(Material::Iron, 50);
        for p in bin.particles() {
            assert!(p.position.x >= bin.inner.x + 20.0);
            assert!(p.position.x <= bin.inner.right() - 20.0);
            assert_eq!(p.position.y, bin.inner.y - 10.0);
            assert!(p.velocity.x.abs() <= 2.0);
            assert!(p.velocity.y.abs() <= 1.0);
            assert!(!p.settled);
        }
    }

    #[test]
    fn test_sales_and_counts() {
        let mut bin = bin();
        bin.add_particle(Material::Coal, 4);
        bin.add_particle(Material::Iron, 2);
        bin.add_particle(Material::Gold, 1);
        assert_eq!(bin.total_value(), 4 + 6 + 10);

        let counts = bin.counts();
        assert_eq!(counts.get(Material::Coal), 4);
        assert_eq!(counts.total(), 7);

        assert_eq!(bin.sell_material(Material::Iron), 6);
        assert_eq!(bin.counts().get(Material::Iron), 0);
        assert_eq!(bin.sell_material(Material::Iron), 0);
        assert_eq!(bin.sell_all(), 14);
        assert!(bin.is_empty());
        assert_eq!(bin.sell_all(), 0);
    }

    #[test]
    fn test_settled_particles_rest_inside() {
        let mut bin = bin();
        bin.add_particle(Material::Coal, 30);
        let inner = bin.inner;
        for _ in 0..400 {
            bin.advance();
        }
        for p in bin.particles().iter().filter(|p| p.settled) {
            assert!(p.position.x >= inner.x + p.radius - 1e-3);
            assert!(p.position.x <= inner.right() - p.radius + 1e-3);
            assert!(p.position.y >= inner.y + p.radius - 1e-3);
            assert!(p.position.y <= inner.bottom() - p.radius + 1e-3);
            assert_eq!(p.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_settled_particle_is_immovable() {
        let mut bin = bin();
        let floor = bin.inner.bottom() - BIN_PARTICLE_RADIUS;
        let x = bin.inner.x + 100.0;
        let mut resting = BinParticle::new(Material::Gold, Vec2::new(x, floor), Vec2::ZERO);
        resting.settle();
        bin.particles.push(resting);
        bin.particles.push(BinParticle::new(
            Material::Coal,
            Vec2::new(x + 3.0, floor - 20.0),
            Vec2::new(0.0, 3.0),
        ));

        for _ in 0..50 {
            bin.advance();
        }
        assert_eq!(bin.particles()[0].position, Vec2::new(x, floor));
        assert_eq!(bin.particles()[0].velocity, Vec2::ZERO);
        assert_ne!(bin.particles()[1].position.x, x + 3.0);
    }

    #[test]
    fn test_moving_pair_is_pushed_apart() {
        let mut a = BinParticle::new(Material::Coal, Vec2::new(10.0, 0.0), Vec2::new(-1.0, 0.0));
        let mut b = BinParticle::new(Material::Coal, Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        collide(&mut a, &mut b);
        // Overlap 2, each moved by 51% of it
        assert!((a.position.x - 11.02).abs() < 1e-4);
        assert!((b.position.x - -1.02).abs() < 1e-4);
        // Closing speed 2, each gets 0.4 * 2 back
        assert!((a.velocity.x - -0.2).abs() < 1e-4);
        assert!((b.velocity.x - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_force_settle_after_long_jitter() {
        let mut particle = BinParticle::new(Material::Coal, Vec2::ZERO, Vec2::new(0.3, 0.0));
        particle.total_settling_attempts = MAX_SETTLING_TICKS;
        particle.classify();
        assert!(particle.settled);
        assert_eq!(particle.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_fast_motion_resets_attempts() {
        let mut particle = BinParticle::new(Material::Coal, Vec2::ZERO, Vec2::new(1.5, 0.0));
        particle.total_settling_attempts = 120;
        particle.settle_timer = 10;
        particle.classify();
        assert_eq!(particle.total_settling_attempts, 0);
        assert_eq!(particle.settle_timer, 0);
    }

    proptest! {
        #[test]
        fn prop_single_crystal_settles(
            x in 0.0f32..=1.0,
            vx in -2.0f32..=2.0,
            vy in -1.0f32..=1.0,
        ) {
            let mut bin = bin();
            let inner = bin.inner;
            let drop_x = inner.x + 20.0 + x * (inner.width - 40.0);
            bin.particles.push(BinParticle::new(
                Material::Gold,
                Vec2::new(drop_x, inner.y - 10.0),
                Vec2::new(vx, vy),
            ));

            let mut ticks = 0;
            while !bin.particles()[0].settled && ticks < 330 {
                bin.advance();
                ticks += 1;
            }
            prop_assert!(bin.particles()[0].settled, "not settled after {} ticks", ticks);
        }
    }
}
