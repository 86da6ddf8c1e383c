//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of bodies)
//! - No rendering or platform dependencies

pub mod body;
pub mod camera;
pub mod collision;
pub mod crystal_bin;
pub mod economy;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod universe;

pub use body::{Body, BodyKind, Bounds, Category};
pub use camera::{Camera, Region};
pub use collision::{bounds_overlap, polygon_edges_intersect, segment_intersection};
pub use crystal_bin::{BinBounds, BinParticle, CrystalBin};
pub use economy::Sale;
pub use state::{
    GameEvent, GamePhase, GameState, Material, MaterialCounts, RockSize, SaucerSize, SaucerState,
    ShipState,
};
pub use tick::{TickInput, tick};
pub use universe::{BodyKey, Collision, Universe};
