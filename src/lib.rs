//! Continuous collision core for the movement step of a 3D action game.
//!
//! Entities (characters, particles, platforms) carry an octagonal bounding
//! volume. Once per simulation tick, for each interacting pair, the movement
//! step builds the two swept poses and asks `sweep_intersect` over what
//! sub-interval of the tick the volumes actually overlap and what region
//! they share; `estimate_push_normal` then turns the penetration depths into
//! a push-out direction. Entities that still end up inside invalid terrain
//! fall back on their `BreadcrumbList`, a short per-entity-class trail of
//! last-known-valid positions keyed by terrain grid cell.
//!
//! The whole crate is single-threaded, synchronous and allocation-light;
//! terrain is only reached through the `TerrainProbe` trait.
//!
//! Note that the up direction is Z+.

pub mod accum;
pub mod breadcrumb;
pub mod config;
pub mod contact;
pub mod sweep;
pub mod terrain;
pub mod volume;

pub use accum::{apply_normal_acceleration, Accumulators};
pub use breadcrumb::{Breadcrumb, BreadcrumbList};
pub use config::PhysicsConfig;
pub use contact::estimate_push_normal;
pub use sweep::{expand_swept, sweep_intersect, Interaction, SweptBody, TimeWindow, Tolerance};
pub use terrain::{BlockingBits, GridCell, TerrainProbe, BLOCK_IMPASSABLE, BLOCK_WALL};
pub use volume::{Axis, Bumper, OctBb, OctVec};
