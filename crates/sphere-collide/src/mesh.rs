//! Turning raw vertex data into triangles.
//!
//! Asset loaders hand over positions either as an unindexed list, where each
//! consecutive group of three forms a triangle, or alongside an index list.

use nalgebra::{Matrix4, Point3};

use crate::{Aabb, MeshError, Triangle};

/// Vertex positions with an optional index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Point3<f32>>,
    /// Triangle indices into `positions`, three per triangle.
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Creates unindexed mesh data.
    pub fn unindexed(positions: Vec<Point3<f32>>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Creates indexed mesh data.
    pub fn indexed(positions: Vec<Point3<f32>>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Appends another mesh, rebasing its indices.
    ///
    /// Mixing indexed and unindexed data expands both to an index list.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;

        if self.indices.is_none() && other.indices.is_none() {
            self.positions.extend_from_slice(&other.positions);
            return;
        }

        let own = self
            .indices
            .take()
            .unwrap_or_else(|| (0..base).collect());
        let theirs = other
            .indices
            .clone()
            .unwrap_or_else(|| (0..other.positions.len() as u32).collect());

        let mut indices = own;
        indices.extend(theirs.into_iter().map(|i| i + base));
        self.indices = Some(indices);
        self.positions.extend_from_slice(&other.positions);
    }

    /// Returns a copy with every position transformed by `matrix`.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| matrix.transform_point(p))
                .collect(),
            indices: self.indices.clone(),
        }
    }

    /// Returns the tight bounds of all positions, if any.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    /// Builds the triangle list.
    pub fn triangles(&self) -> Result<Vec<Triangle>, MeshError> {
        match &self.indices {
            Some(indices) => triangles_from_indexed(&self.positions, indices),
            None => triangles_from_positions(&self.positions),
        }
    }
}

/// Rejects positions with NaN or infinite coordinates.
fn check_finite(positions: &[Point3<f32>]) -> Result<(), MeshError> {
    match positions.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
        Some(index) => Err(MeshError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Builds triangles from consecutive groups of three positions.
pub fn triangles_from_positions(positions: &[Point3<f32>]) -> Result<Vec<Triangle>, MeshError> {
    if positions.len() % 3 != 0 {
        return Err(MeshError::PositionCount(positions.len()));
    }
    check_finite(positions)?;

    Ok(positions
        .chunks_exact(3)
        .map(|p| Triangle::new(p[0], p[1], p[2]))
        .collect())
}

/// Builds triangles from positions addressed by an index list.
pub fn triangles_from_indexed(
    positions: &[Point3<f32>],
    indices: &[u32],
) -> Result<Vec<Triangle>, MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndexCount(indices.len()));
    }
    check_finite(positions)?;

    let fetch = |index: u32| {
        positions
            .get(index as usize)
            .copied()
            .ok_or(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            })
    };

    indices
        .chunks_exact(3)
        .map(|i| -> Result<Triangle, MeshError> {
            Ok(Triangle::new(fetch(i[0])?, fetch(i[1])?, fetch(i[2])?))
        })
        .collect()
}
