//! World registry
//!
//! The universe owns every live body. Bodies live in a slotmap so handles stay
//! valid (or safely stale) across removals; a master list keeps insertion
//! order and category views give fast access to rocks, bullets and so on.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use slotmap::{SecondaryMap, SlotMap};

use super::body::{Body, BodyKind, Bounds, Category};
use super::collision::{CircleBody, Contact, polygon_edges_intersect, resolve_circle_pair};
use crate::consts::*;

slotmap::new_key_type! {
    /// Stable handle to a body in the [`Universe`]
    pub struct BodyKey;
}

/// A contact the game loop has to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    ShipRock { ship: BodyKey, rock: BodyKey },
    BulletRock { bullet: BodyKey, rock: BodyKey },
    BulletShip { bullet: BodyKey, ship: BodyKey },
    BulletSaucer { bullet: BodyKey, saucer: BodyKey },
    SaucerRock { saucer: BodyKey, rock: BodyKey },
    SaucerShip { saucer: BodyKey, ship: BodyKey },
}

#[derive(Debug, Clone)]
pub struct Universe {
    pub width: f32,
    pub height: f32,
    bodies: SlotMap<BodyKey, Body>,
    /// Every live body in insertion order
    objects: Vec<BodyKey>,
    rocks: Vec<BodyKey>,
    bullets: Vec<BodyKey>,
    debris: Vec<BodyKey>,
    crystals: Vec<BodyKey>,
    ship: Option<BodyKey>,
    saucer: Option<BodyKey>,
    station: Option<BodyKey>,
    /// Rock impact wobble
    rng: Pcg32,
}

impl Universe {
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self {
            width,
            height,
            bodies: SlotMap::with_key(),
            objects: Vec::new(),
            rocks: Vec::new(),
            bullets: Vec::new(),
            debris: Vec::new(),
            crystals: Vec::new(),
            ship: None,
            saucer: None,
            station: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Register a body and file it under its category.
    ///
    /// The ship, saucer and station slots hold one body each; adding another
    /// replaces (and removes) the previous one.
    pub fn add(&mut self, body: Body) -> BodyKey {
        let category = body.kind.category();
        if let Some(previous) = self.slot(category) {
            log::warn!("Replacing existing {:?} {:?}", category, previous);
            self.remove(previous);
        }

        let key = self.bodies.insert(body);
        self.objects.push(key);
        match category {
            Category::Ship => self.ship = Some(key),
            Category::Saucer => self.saucer = Some(key),
            Category::Station => self.station = Some(key),
            _ => {
                if let Some(view) = self.view_mut(category) {
                    view.push(key);
                }
            }
        }
        key
    }

    /// Remove a body from the registry and its view. Stale keys are ignored.
    pub fn remove(&mut self, key: BodyKey) -> Option<Body> {
        let body = self.bodies.remove(key)?;
        self.objects.retain(|&k| k != key);
        let category = body.kind.category();
        if let Some(view) = self.view_mut(category) {
            view.retain(|&k| k != key);
        }
        for slot in [&mut self.ship, &mut self.saucer, &mut self.station] {
            if *slot == Some(key) {
                *slot = None;
            }
        }
        Some(body)
    }

    fn slot(&self, category: Category) -> Option<BodyKey> {
        match category {
            Category::Ship => self.ship,
            Category::Saucer => self.saucer,
            Category::Station => self.station,
            _ => None,
        }
    }

    fn view_mut(&mut self, category: Category) -> Option<&mut Vec<BodyKey>> {
        match category {
            Category::Rock => Some(&mut self.rocks),
            Category::Bullet => Some(&mut self.bullets),
            Category::Debris => Some(&mut self.debris),
            Category::Crystal => Some(&mut self.crystals),
            Category::Ship | Category::Saucer | Category::Station => None,
        }
    }

    #[inline]
    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bodies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> + '_ {
        self.objects
            .iter()
            .filter_map(|&key| self.bodies.get(key).map(|body| (key, body)))
    }

    pub fn rocks(&self) -> &[BodyKey] {
        &self.rocks
    }

    pub fn bullets(&self) -> &[BodyKey] {
        &self.bullets
    }

    /// Debris and ship wreckage
    pub fn debris(&self) -> &[BodyKey] {
        &self.debris
    }

    pub fn crystals(&self) -> &[BodyKey] {
        &self.crystals
    }

    pub fn ship(&self) -> Option<BodyKey> {
        self.ship
    }

    pub fn saucer(&self) -> Option<BodyKey> {
        self.saucer
    }

    pub fn station(&self) -> Option<BodyKey> {
        self.station
    }

    pub fn ship_body(&self) -> Option<&Body> {
        self.ship.and_then(|key| self.bodies.get(key))
    }

    pub fn ship_body_mut(&mut self) -> Option<&mut Body> {
        self.ship.and_then(|key| self.bodies.get_mut(key))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Bodies whose position lies in the rectangle grown by
    /// [`REGION_PADDING`] on every side, edges included
    pub fn query_region(&self, x: f32, y: f32, width: f32, height: f32) -> Vec<BodyKey> {
        let min = Vec2::new(x - REGION_PADDING, y - REGION_PADDING);
        let max = Vec2::new(x + width + REGION_PADDING, y + height + REGION_PADDING);
        self.iter()
            .filter(|(_, body)| {
                let p = body.position;
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            })
            .map(|(key, _)| key)
            .collect()
    }

    /// Move every body one tick, then drop the ones whose ttl ran out.
    ///
    /// All bodies move before any is reaped, so a body never sees a
    /// half-updated neighbour.
    pub fn update_objects(&mut self) {
        for &key in &self.objects {
            if let Some(body) = self.bodies.get_mut(key) {
                body.advance();
            }
        }

        let expired: Vec<BodyKey> = self
            .objects
            .iter()
            .copied()
            .filter(|&key| self.bodies.get(key).is_some_and(Body::is_expired))
            .collect();
        for key in expired {
            self.remove(key);
        }
    }

    /// Live bullets fired by `owner`
    pub fn bullets_owned_by(&self, owner: BodyKey) -> usize {
        self.bullets
            .iter()
            .filter_map(|&key| self.bodies.get(key))
            .filter(|b| matches!(b.kind, BodyKind::Bullet { owner: o } if o == owner))
            .filter(|b| b.is_active())
            .count()
    }

    /// Fire a bullet from the shooter's position.
    ///
    /// Returns `None` when the shooter is gone, is not a ship or saucer, is in
    /// hyperspace, or already has its maximum number of bullets in flight.
    pub fn fire_bullet(&mut self, shooter: BodyKey, heading: Vec2, ttl: i32) -> Option<BodyKey> {
        let body = self.bodies.get(shooter)?;
        let max_bullets = match body.kind {
            BodyKind::Ship(_) => SHIP_MAX_BULLETS,
            BodyKind::Saucer(_) => SAUCER_MAX_BULLETS,
            _ => return None,
        };
        if body.in_hyperspace() || self.bullets_owned_by(shooter) >= max_bullets {
            return None;
        }
        let position = body.position;
        Some(self.add(Body::bullet(shooter, position, heading, ttl)))
    }

    /// Remove every rock (used when a new level is generated from scratch)
    pub fn clear_rocks(&mut self) {
        for key in self.rocks.clone() {
            self.remove(key);
        }
    }

    /// Detect contacts between the ship, saucer, bullets and rocks, then
    /// resolve rock-rock bounces.
    ///
    /// Bounding boxes are computed once at the start of the pass from current
    /// positions. Rock-rock contacts are resolved here and never reported.
    pub fn check_collisions(&mut self) -> Vec<Collision> {
        let bounds: SecondaryMap<BodyKey, Bounds> = self
            .iter()
            .map(|(key, body)| (key, body.bounds()))
            .collect();
        let overlap = |a: BodyKey, b: BodyKey| match (bounds.get(a), bounds.get(b)) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        };

        let mut collisions = Vec::new();
        let ship = self
            .ship_body()
            .filter(|body| !body.in_hyperspace())
            .and(self.ship);
        let saucer = self.saucer;

        // Ship vs rocks: box first, then the outlines
        if let Some(ship_key) = ship {
            let ship_points = self.bodies[ship_key].world_points();
            for &rock in &self.rocks {
                if !overlap(ship_key, rock) {
                    continue;
                }
                let rock_points = self.bodies[rock].world_points();
                if polygon_edges_intersect(&rock_points, &ship_points).is_some() {
                    collisions.push(Collision::ShipRock {
                        ship: ship_key,
                        rock,
                    });
                }
            }
        }

        // Live bullets, the ship's before the saucer's
        let owned_by = |owner: Option<BodyKey>| -> Vec<BodyKey> {
            let Some(owner) = owner else {
                return Vec::new();
            };
            self.bullets
                .iter()
                .copied()
                .filter(|&key| {
                    let bullet = &self.bodies[key];
                    bullet.is_active()
                        && matches!(bullet.kind, BodyKind::Bullet { owner: o } if o == owner)
                })
                .collect()
        };
        let ship_bullets = owned_by(self.ship);
        let saucer_bullets = owned_by(saucer);

        for &bullet in ship_bullets.iter().chain(&saucer_bullets) {
            if let Some(&rock) = self.rocks.iter().find(|&&rock| overlap(bullet, rock)) {
                collisions.push(Collision::BulletRock { bullet, rock });
            }
        }

        if let Some(ship_key) = ship {
            for &bullet in &saucer_bullets {
                if overlap(bullet, ship_key) {
                    collisions.push(Collision::BulletShip {
                        bullet,
                        ship: ship_key,
                    });
                }
            }
        }

        if let Some(saucer_key) = saucer {
            for &bullet in &ship_bullets {
                if overlap(bullet, saucer_key) {
                    collisions.push(Collision::BulletSaucer {
                        bullet,
                        saucer: saucer_key,
                    });
                }
            }
            for &rock in &self.rocks {
                if overlap(saucer_key, rock) {
                    collisions.push(Collision::SaucerRock {
                        saucer: saucer_key,
                        rock,
                    });
                }
            }
            if let Some(ship_key) = ship
                && overlap(saucer_key, ship_key)
            {
                collisions.push(Collision::SaucerShip {
                    saucer: saucer_key,
                    ship: ship_key,
                });
            }
        }

        self.resolve_rock_rock_physics();
        collisions
    }

    fn rock_circle(&self, key: BodyKey) -> Option<CircleBody> {
        let body = self.bodies.get(key)?;
        let size = body.rock_size()?;
        Some(CircleBody {
            position: body.position,
            heading: body.heading,
            radius: size.radius(),
            mass: size.mass(),
        })
    }

    /// Bounce overlapping rocks off each other as circles
    pub fn resolve_rock_rock_physics(&mut self) {
        for i in 0..self.rocks.len() {
            for j in (i + 1)..self.rocks.len() {
                let (a, b) = (self.rocks[i], self.rocks[j]);
                let (Some(mut circle_a), Some(mut circle_b)) =
                    (self.rock_circle(a), self.rock_circle(b))
                else {
                    continue;
                };

                let contact = resolve_circle_pair(&mut circle_a, &mut circle_b, ROCK_RESTITUTION);
                if matches!(contact, Contact::Apart | Contact::Degenerate) {
                    continue;
                }

                let impact = contact == Contact::Impact;
                for (key, circle) in [(a, circle_a), (b, circle_b)] {
                    let wobble = if impact {
                        self.rng.random_range(-ROCK_IMPACT_SPIN..ROCK_IMPACT_SPIN)
                    } else {
                        0.0
                    };
                    if let Some(rock) = self.bodies.get_mut(key) {
                        rock.position = circle.position;
                        rock.heading = circle.heading;
                        rock.angle += wobble;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Material, RockSize, SaucerSize};
    use proptest::prelude::*;

    fn rock_at(position: Vec2, heading: Vec2, size: RockSize) -> Body {
        Body::rock(position, heading, size, Material::Coal, 0).with_spin(0.0)
    }

    #[test]
    fn test_add_files_by_category() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let rock = universe.add(rock_at(Vec2::new(100.0, 100.0), Vec2::ZERO, RockSize::Large));
        let ship = universe.add(Body::ship(Vec2::new(500.0, 500.0)));
        let debris = universe.add(Body::debris(Vec2::ZERO, Vec2::ZERO));

        assert_eq!(universe.len(), 3);
        assert_eq!(universe.rocks(), &[rock]);
        assert_eq!(universe.debris(), &[debris]);
        assert_eq!(universe.ship(), Some(ship));
        let order: Vec<BodyKey> = universe.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![rock, ship, debris]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let rock = universe.add(rock_at(Vec2::ZERO, Vec2::ZERO, RockSize::Small));
        assert!(universe.remove(rock).is_some());
        assert!(universe.remove(rock).is_none());
        assert!(universe.rocks().is_empty());
        assert!(universe.is_empty());
        assert!(!universe.contains(rock));
    }

    #[test]
    fn test_remove_clears_ship_slot() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::ZERO));
        universe.remove(ship);
        assert!(universe.ship().is_none());
        assert!(universe.ship_body().is_none());
    }

    #[test]
    fn test_second_ship_replaces_first() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let first = universe.add(Body::ship(Vec2::ZERO));
        let second = universe.add(Body::ship(Vec2::new(10.0, 10.0)));
        assert_eq!(universe.ship(), Some(second));
        assert!(!universe.contains(first));
        assert_eq!(universe.len(), 1);
    }

    #[test]
    fn test_ttl_one_is_reaped_after_one_update() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let debris = universe.add(Body::debris(Vec2::ZERO, Vec2::ZERO).with_ttl(1));
        let rock = universe.add(rock_at(Vec2::ZERO, Vec2::new(1.0, 0.0), RockSize::Small));
        universe.update_objects();
        assert!(!universe.contains(debris));
        assert!(universe.debris().is_empty());
        assert_eq!(universe.get(rock).unwrap().position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_query_region_padding_is_inclusive() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let on_edge = universe.add(Body::debris(Vec2::new(-50.0, 250.0), Vec2::ZERO));
        let outside = universe.add(Body::debris(Vec2::new(-50.01, 250.0), Vec2::ZERO));
        let far_corner = universe.add(Body::debris(Vec2::new(250.0, 250.0), Vec2::ZERO));

        let found = universe.query_region(0.0, 0.0, 200.0, 200.0);
        assert!(found.contains(&on_edge));
        assert!(found.contains(&far_corner));
        assert!(!found.contains(&outside));
    }

    #[test]
    fn test_fire_bullet_respects_cap() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(500.0, 500.0)));
        for _ in 0..SHIP_MAX_BULLETS {
            assert!(universe.fire_bullet(ship, Vec2::new(0.0, -13.0), 35).is_some());
        }
        assert!(universe.fire_bullet(ship, Vec2::new(0.0, -13.0), 35).is_none());
        assert_eq!(universe.bullets_owned_by(ship), SHIP_MAX_BULLETS);

        let saucer = universe.add(Body::saucer(Vec2::ZERO, SaucerSize::Large, 1024.0));
        assert!(universe.fire_bullet(saucer, Vec2::X, 60).is_some());
        assert!(universe.fire_bullet(saucer, Vec2::X, 60).is_none());
    }

    #[test]
    fn test_rock_cannot_fire() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let rock = universe.add(rock_at(Vec2::ZERO, Vec2::ZERO, RockSize::Small));
        assert!(universe.fire_bullet(rock, Vec2::X, 10).is_none());
    }

    #[test]
    fn test_bullet_hits_at_most_one_rock() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(900.0, 900.0)));
        universe.add(rock_at(Vec2::new(100.0, 100.0), Vec2::ZERO, RockSize::Large));
        universe.add(rock_at(Vec2::new(105.0, 100.0), Vec2::ZERO, RockSize::Large));
        universe.add(Body::bullet(ship, Vec2::new(100.0, 100.0), Vec2::ZERO, 35));

        let hits = universe
            .check_collisions()
            .into_iter()
            .filter(|c| matches!(c, Collision::BulletRock { .. }))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_ship_rock_contact() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(100.0, 100.0)));
        let rock = universe.add(rock_at(Vec2::new(120.0, 100.0), Vec2::ZERO, RockSize::Large));
        let collisions = universe.check_collisions();
        assert!(collisions.contains(&Collision::ShipRock { ship, rock }));
    }

    #[test]
    fn test_ship_in_hyperspace_is_skipped() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(100.0, 100.0)));
        universe.add(rock_at(Vec2::new(120.0, 100.0), Vec2::ZERO, RockSize::Large));
        universe
            .get_mut(ship)
            .and_then(Body::ship_state_mut)
            .unwrap()
            .hyperspace_ticks = HYPERSPACE_TICKS;
        assert!(universe.check_collisions().is_empty());
    }

    /// Ship, saucer, rock and one bullet per shooter, all touching
    struct Pileup {
        universe: Universe,
        ship: BodyKey,
        saucer: BodyKey,
        rock: BodyKey,
        ship_bullet: BodyKey,
        saucer_bullet: BodyKey,
    }

    fn pileup() -> Pileup {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(100.0, 100.0)));
        let saucer = universe.add(Body::saucer(Vec2::new(100.0, 100.0), SaucerSize::Large, 1024.0));
        let rock = universe.add(rock_at(Vec2::new(120.0, 100.0), Vec2::ZERO, RockSize::Large));
        let ship_bullet = universe.add(Body::bullet(ship, Vec2::new(100.0, 95.0), Vec2::ZERO, 35));
        let saucer_bullet =
            universe.add(Body::bullet(saucer, Vec2::new(100.0, 100.0), Vec2::ZERO, 60));
        Pileup {
            universe,
            ship,
            saucer,
            rock,
            ship_bullet,
            saucer_bullet,
        }
    }

    #[test]
    fn test_collision_passes_run_in_order() {
        let mut p = pileup();
        let collisions = p.universe.check_collisions();
        assert_eq!(
            collisions,
            vec![
                Collision::ShipRock {
                    ship: p.ship,
                    rock: p.rock
                },
                Collision::BulletRock {
                    bullet: p.ship_bullet,
                    rock: p.rock
                },
                Collision::BulletRock {
                    bullet: p.saucer_bullet,
                    rock: p.rock
                },
                Collision::BulletShip {
                    bullet: p.saucer_bullet,
                    ship: p.ship
                },
                Collision::BulletSaucer {
                    bullet: p.ship_bullet,
                    saucer: p.saucer
                },
                Collision::SaucerRock {
                    saucer: p.saucer,
                    rock: p.rock
                },
                Collision::SaucerShip {
                    saucer: p.saucer,
                    ship: p.ship
                },
            ]
        );
    }

    #[test]
    fn test_hyperspace_only_hides_the_ship() {
        let mut p = pileup();
        p.universe
            .get_mut(p.ship)
            .and_then(Body::ship_state_mut)
            .unwrap()
            .hyperspace_ticks = HYPERSPACE_TICKS;

        // Ship bullets keep flying and still hit the saucer
        let collisions = p.universe.check_collisions();
        assert_eq!(
            collisions,
            vec![
                Collision::BulletRock {
                    bullet: p.ship_bullet,
                    rock: p.rock
                },
                Collision::BulletRock {
                    bullet: p.saucer_bullet,
                    rock: p.rock
                },
                Collision::BulletSaucer {
                    bullet: p.ship_bullet,
                    saucer: p.saucer
                },
                Collision::SaucerRock {
                    saucer: p.saucer,
                    rock: p.rock
                },
            ]
        );
    }

    #[test]
    fn test_orphaned_bullets_are_inert() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        let saucer = universe.add(Body::saucer(Vec2::ZERO, SaucerSize::Small, 1024.0));
        universe.add(rock_at(Vec2::new(300.0, 300.0), Vec2::ZERO, RockSize::Large));
        universe.add(Body::bullet(saucer, Vec2::new(300.0, 300.0), Vec2::ZERO, 60));
        universe.remove(saucer);
        assert!(universe.check_collisions().is_empty());
    }

    #[test]
    fn test_equal_rocks_head_on() {
        let mut universe = Universe::new(1000.0, 1000.0, 1);
        // Radii sum to 44: one unit of overlap, closing head-on
        let a = universe.add(rock_at(
            Vec2::new(500.0, 500.0),
            Vec2::new(1.0, 0.0),
            RockSize::Medium,
        ));
        let b = universe.add(rock_at(
            Vec2::new(543.0, 500.0),
            Vec2::new(-1.0, 0.0),
            RockSize::Medium,
        ));
        universe.resolve_rock_rock_physics();

        let (ra, rb) = (universe.get(a).unwrap(), universe.get(b).unwrap());
        assert!((ra.heading.x - (-0.8)).abs() < 1e-5);
        assert!((rb.heading.x - 0.8).abs() < 1e-5);
        assert!((ra.distance_to(rb) - 44.0).abs() < 1e-3);
        assert!(ra.angle.abs() <= ROCK_IMPACT_SPIN);
    }

    proptest! {
        #[test]
        fn prop_query_region_matches_padded_rect(
            px in -500.0f32..1500.0,
            py in -500.0f32..1500.0,
            x in 0.0f32..1000.0,
            y in 0.0f32..1000.0,
            w in 0.0f32..500.0,
            h in 0.0f32..500.0,
        ) {
            let mut universe = Universe::new(1000.0, 1000.0, 1);
            let key = universe.add(Body::debris(Vec2::new(px, py), Vec2::ZERO));
            let expected = px >= x - REGION_PADDING
                && px <= x + w + REGION_PADDING
                && py >= y - REGION_PADDING
                && py <= y + h + REGION_PADDING;
            prop_assert_eq!(universe.query_region(x, y, w, h).contains(&key), expected);
        }
    }
}
