//! Viewport onto the universe
//!
//! The camera eases towards a target body and never shows anything outside
//! the universe. Screen coordinates have their origin at the top-left of the
//! view.

use glam::Vec2;

use super::universe::{BodyKey, Universe};
use crate::consts::{CAMERA_FOLLOW_SPEED, REGION_PADDING};

/// Rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Centre of the view in world coordinates
    pub center: Vec2,
    pub screen_size: Vec2,
    pub universe_size: Vec2,
    /// Top-left of the view in world coordinates
    view: Vec2,
    target: Option<BodyKey>,
}

impl Camera {
    /// A camera centred on the universe
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        universe_width: f32,
        universe_height: f32,
    ) -> Self {
        let screen_size = Vec2::new(screen_width, screen_height);
        let universe_size = Vec2::new(universe_width, universe_height);
        let center = (universe_size / 2.0).floor();
        Self {
            center,
            screen_size,
            universe_size,
            view: center - (screen_size / 2.0).floor(),
            target: None,
        }
    }

    pub fn target(&self) -> Option<BodyKey> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<BodyKey>) {
        self.target = target;
    }

    /// Ease towards the target and clamp to the universe. A stale target
    /// leaves the camera where it is.
    pub fn update(&mut self, universe: &Universe) {
        let Some(target) = self.target.and_then(|key| universe.get(key)) else {
            return;
        };

        self.center += (target.position - self.center) * CAMERA_FOLLOW_SPEED;

        let half_screen = (self.screen_size / 2.0).floor();
        self.center = self
            .center
            .max(half_screen)
            .min(self.universe_size - half_screen);
        self.view = self.center - half_screen;
    }

    /// Top-left of the view in world coordinates
    pub fn view_origin(&self) -> Vec2 {
        self.view
    }

    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.view
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.view
    }

    /// Is `world` on screen, allowing `padding` units beyond each edge?
    pub fn is_visible(&self, world: Vec2, padding: f32) -> bool {
        let min = self.view - Vec2::splat(padding);
        let max = self.view + self.screen_size + Vec2::splat(padding);
        world.x >= min.x && world.x <= max.x && world.y >= min.y && world.y <= max.y
    }

    /// [`Camera::is_visible`] with the standard culling padding
    pub fn is_visible_padded(&self, world: Vec2) -> bool {
        self.is_visible(world, REGION_PADDING)
    }

    /// The visible rectangle in world coordinates (no padding)
    pub fn visible_region(&self) -> Region {
        Region {
            x: self.view.x,
            y: self.view.y,
            width: self.screen_size.x,
            height: self.screen_size.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Body;

    fn camera() -> Camera {
        Camera::new(800.0, 600.0, 10000.0, 10000.0)
    }

    #[test]
    fn test_starts_centred() {
        let camera = camera();
        assert_eq!(camera.center, Vec2::new(5000.0, 5000.0));
        assert_eq!(camera.view_origin(), Vec2::new(4600.0, 4700.0));
    }

    #[test]
    fn test_screen_world_inverse() {
        let camera = camera();
        let world = Vec2::new(4650.0, 4720.0);
        let screen = camera.world_to_screen(world);
        assert_eq!(screen, Vec2::new(50.0, 20.0));
        assert_eq!(camera.screen_to_world(screen), world);
    }

    #[test]
    fn test_follow_eases_towards_target() {
        let mut universe = Universe::new(10000.0, 10000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(6000.0, 5000.0)));
        let mut camera = camera();
        camera.set_target(Some(ship));
        camera.update(&universe);
        assert!((camera.center.x - 5100.0).abs() < 1e-3);
        assert_eq!(camera.view_origin(), camera.center - Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_clamped_at_universe_edge() {
        let mut universe = Universe::new(10000.0, 10000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(0.0, 0.0)));
        let mut camera = camera();
        camera.set_target(Some(ship));
        for _ in 0..500 {
            camera.update(&universe);
        }
        assert_eq!(camera.center, Vec2::new(400.0, 300.0));
        assert_eq!(camera.visible_region().x, 0.0);
        assert_eq!(camera.visible_region().y, 0.0);
    }

    #[test]
    fn test_stale_target_is_ignored() {
        let mut universe = Universe::new(10000.0, 10000.0, 1);
        let ship = universe.add(Body::ship(Vec2::new(9000.0, 9000.0)));
        universe.remove(ship);
        let mut camera = camera();
        camera.set_target(Some(ship));
        camera.update(&universe);
        assert_eq!(camera.center, Vec2::new(5000.0, 5000.0));
    }

    #[test]
    fn test_visibility_padding() {
        let camera = camera();
        let edge = camera.view_origin() - Vec2::splat(50.0);
        assert!(camera.is_visible(edge, 50.0));
        assert!(camera.is_visible_padded(edge));
        assert!(!camera.is_visible(edge - Vec2::new(0.5, 0.0), 50.0));
        assert!(camera.is_visible(Vec2::new(5000.0, 5000.0), 0.0));
    }
}
