//! Sphere versus triangle mesh collision.
//!
//! Triangles come from [`TriangleSelector`]s: a [`StaticTriangleSelector`]
//! indexes fixed level geometry in an octree, a [`DynamicTriangleSelector`]
//! moves a small mesh by a live transform. A [`Collider`] pushes a sphere out
//! of the triangles its selectors return, and a [`Platformer`] builds
//! walking, falling and jumping on top of it.

mod aabb;
mod collider;
mod controller;
mod error;
mod mesh;
mod plane;
mod selector;
mod triangle;

pub use aabb::{Aabb, Containment};
pub use collider::{
    Collider, CollisionStats, Contact, ContactFeature, DEFAULT_MAX_ITERATIONS, QUERY_INFLATION,
};
pub use controller::{Basis, Platformer, PlatformerConfig, PlatformerInput};
pub use error::{ConfigError, MeshError};
pub use mesh::{MeshData, triangles_from_indexed, triangles_from_positions};
pub use plane::{Plane, RAY_EPSILON};
pub use selector::{
    DynamicTriangleSelector, OctreeNode, SelectorTag, StaticTriangleSelector, TriangleSelector,
    WorldTransform,
};
pub use triangle::Triangle;
