//! Dynamic triangle selector for small meshes that move.

use std::cell::Cell;

use nalgebra::{Matrix4, Point3};

use crate::{Aabb, MeshData, MeshError, Triangle, triangles_from_positions};

use super::{SelectorTag, TriangleSelector};

/// Something that knows where a mesh currently is in the world.
///
/// The dynamic selector polls this once per query.
pub trait WorldTransform {
    /// Returns the current local-to-world matrix.
    fn world_transform(&self) -> Matrix4<f32>;
}

impl WorldTransform for Matrix4<f32> {
    fn world_transform(&self) -> Matrix4<f32> {
        *self
    }
}

/// Lets the owner move the mesh while a selector still borrows the transform.
impl WorldTransform for Cell<Matrix4<f32>> {
    fn world_transform(&self) -> Matrix4<f32> {
        self.get()
    }
}

/// A selector over local-space triangles placed by a live transform.
///
/// Nothing is cached in world space: every query transforms the local bounds
/// by the provider's current matrix and, if they overlap the query box,
/// transforms and returns every triangle. Cost is linear in the triangle
/// count, so this is meant for small moving pieces, not level geometry.
///
/// The selector borrows its transform provider, which must outlive it.
pub struct DynamicTriangleSelector<'w, W: WorldTransform + ?Sized> {
    world: &'w W,
    triangles: Vec<Triangle>,
    bounds: Option<Aabb>,
    tag: Option<SelectorTag>,
}

impl<'w, W: WorldTransform + ?Sized> DynamicTriangleSelector<'w, W> {
    /// Builds a selector from unindexed local-space positions, three per triangle.
    pub fn new(world: &'w W, positions: &[Point3<f32>]) -> Result<Self, MeshError> {
        Ok(Self::from_triangles(world, triangles_from_positions(positions)?))
    }

    /// Builds a selector from local-space mesh data.
    pub fn from_mesh(world: &'w W, mesh: &MeshData) -> Result<Self, MeshError> {
        Ok(Self::from_triangles(world, mesh.triangles()?))
    }

    /// Builds a selector from local-space triangles.
    pub fn from_triangles(world: &'w W, triangles: Vec<Triangle>) -> Self {
        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| t.vertices().iter()));
        Self {
            world,
            triangles,
            bounds,
            tag: None,
        }
    }

    /// Attaches an owner tag.
    pub fn with_tag(mut self, tag: SelectorTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns the local-space triangles.
    #[inline]
    pub fn local_triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the local-space bounds, if there are any triangles.
    #[inline]
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Returns the local bounds moved by the provider's current transform.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let matrix = self.world.world_transform();
        self.bounds.map(|b| b.transformed(&matrix))
    }
}

impl<W: WorldTransform + ?Sized> TriangleSelector for DynamicTriangleSelector<'_, W> {
    fn count(&self) -> usize {
        self.triangles.len()
    }

    fn tag(&self) -> Option<SelectorTag> {
        self.tag
    }

    fn select(&self, bounds: &Aabb, triangles: &mut Vec<Triangle>) {
        let Some(local) = self.bounds else {
            return;
        };

        let matrix = self.world.world_transform();
        if local.transformed(&matrix).is_disjoint(bounds) {
            return;
        }

        triangles.extend(self.triangles.iter().map(|t| t.transformed(&matrix)));
    }
}

impl<W: WorldTransform + ?Sized> std::fmt::Debug for DynamicTriangleSelector<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicTriangleSelector")
            .field("triangles", &self.triangles.len())
            .field("bounds", &self.bounds)
            .field("tag", &self.tag)
            .finish()
    }
}
