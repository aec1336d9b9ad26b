//! Triangle selectors: queryable sources of world-space triangles.
//!
//! A selector answers one question: which triangles might touch this box?
//! The collider asks every selector it owns once per call and tests the
//! returned candidates against the moving sphere.
//!
//! # Example
//!
//! ```ignore
//! use sphere_collide::{Aabb, StaticTriangleSelector, TriangleSelector};
//! use nalgebra::{Matrix4, Point3};
//!
//! let positions: Vec<Point3<f32>> = /* level geometry, 3 per triangle */;
//! let level = StaticTriangleSelector::new(&Matrix4::identity(), &positions, 16)?;
//!
//! let mut candidates = Vec::new();
//! level.select(&Aabb::from_center_half_extent(Point3::origin(), 10.0), &mut candidates);
//! ```
//!
//! # Architecture
//!
//! - [`TriangleSelector`]: the query contract the collider relies on
//! - [`StaticTriangleSelector`]: fixed geometry indexed by an octree of [`OctreeNode`]s
//! - [`DynamicTriangleSelector`]: local-space geometry moved by a [`WorldTransform`]

mod dynamic;
mod node;
mod tree;

use crate::{Aabb, Triangle};

// Re-export main types
pub use dynamic::{DynamicTriangleSelector, WorldTransform};
pub use node::OctreeNode;
pub use tree::StaticTriangleSelector;

/// Opaque value an owner attaches to a selector to recognise it in contacts.
pub type SelectorTag = u64;

/// A source of world-space triangles for a region of space.
pub trait TriangleSelector {
    /// Total number of triangles this selector can return.
    fn count(&self) -> usize;

    /// The owner's tag, if one was attached.
    fn tag(&self) -> Option<SelectorTag>;

    /// Appends every triangle that may touch `bounds` to `triangles`.
    ///
    /// Results are conservative: triangles outside `bounds` may be included,
    /// but none that touch it may be left out.
    fn select(&self, bounds: &Aabb, triangles: &mut Vec<Triangle>);
}
