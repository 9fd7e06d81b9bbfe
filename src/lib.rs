//! thud: arcade-style 2D AABB physics.
//!
//! A quadtree broad-phase feeds a two-pass (X then Y) separator with
//! pushable/immovable/mass-weighted response, plus a tile-grid resolver
//! with per-edge flags, slopes, and corner projection. Detection and
//! resolution run synchronously inside the caller's game loop; the world
//! never owns the game objects, only their bodies.

pub mod body;
pub mod error;
pub mod math;
pub mod quadtree;
pub mod separate;
pub mod tile;
pub mod world;

pub use crate::body::{Body, EdgeFlags, OwnerId};
pub use crate::error::CollideError;
pub use crate::math::{Circle, Rect, Segment};
pub use crate::quadtree::{QuadTree, QuadTreeConfig};
pub use crate::separate::{separate, touch_only, Axis, ImpactParams};
pub use crate::tile::{collide_body_tile, Tile, TileHit, TileShape, OVERLAP_BIAS};
pub use crate::world::{
    BodyHandle, ColliderRef, GroupId, NotifyCallback, ProcessCallback, TileNotifyCallback,
    TileProcessCallback, World, WorldConfig,
};
