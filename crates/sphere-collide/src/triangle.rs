//! Triangle representation for collision queries.

use std::ops::Index;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::{Aabb, Plane};

/// A triangle in 3D space with its cached supporting plane.
///
/// The plane normal is `normalize((c - b) × (b - a))`, so the front face is
/// the one that sees the vertices in clockwise order. The plane is
/// recomputed whenever the vertices change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
    plane: Plane,
}

impl Triangle {
    /// Creates a new triangle from three points.
    ///
    /// Collinear points give a triangle with a zero normal: it never reports
    /// a face intersection, but its edges still take part in collision.
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
            plane: Plane::from_three_points(a, b, c),
        }
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// Returns the vertex at `index`, wrapping modulo 3.
    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f32> {
        self.vertices[index % 3]
    }

    /// Returns the edge starting at vertex `index` as `(start, end)`.
    #[inline]
    pub fn edge(&self, index: usize) -> (Point3<f32>, Point3<f32>) {
        (self.vertex(index), self.vertex(index + 1))
    }

    /// Returns the supporting plane.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Returns the unit normal (zero for a degenerate triangle).
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.plane.normal()
    }

    /// Returns the plane distance term, `-dot(a, normal)`.
    #[inline]
    pub fn dist(&self) -> f32 {
        self.plane.dist()
    }

    /// Computes the centroid of the triangle.
    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Returns the tight bounding box of the three vertices.
    pub fn bounds(&self) -> Aabb {
        let [a, b, c] = &self.vertices;
        Aabb::new(a.inf(b).inf(c), a.sup(b).sup(c))
    }

    /// Returns a copy with every vertex transformed by `matrix` and the plane recomputed.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let [a, b, c] = self.vertices.map(|v| matrix.transform_point(&v));
        Self::new(a, b, c)
    }

    /// Casts the ray `origin + t * direction` against the triangle.
    ///
    /// Returns `Some((t, point))` when the ray meets the supporting plane at a
    /// point inside the triangle. `t` may be negative. Returns `None` when the
    /// ray is parallel to the plane or the point falls outside one of the
    /// three side planes (each edge extruded along the normal).
    pub fn intersect(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let (t, point) = self.plane.intersect_ray(origin, direction)?;

        for i in 0..3 {
            let (a, b) = self.edge(i);
            let side = Plane::from_three_points(a, b, a + self.normal());
            if side.signed_distance(point) > 0.0 {
                return None;
            }
        }

        Some((t, point))
    }

    /// Returns the point on edge `index` closest to `point`.
    ///
    /// The projection is clamped to the segment; a zero-length edge yields
    /// its start vertex.
    pub fn closest_point_on_edge(&self, index: usize, point: Point3<f32>) -> Point3<f32> {
        let (a, b) = self.edge(index);
        let ab = b - a;
        let s = ab.dot(&(point - a));

        if s <= 0.0 {
            return a;
        }

        let length_sq = ab.norm_squared();
        if length_sq <= f32::EPSILON {
            return a;
        }

        let s = s / length_sq;
        if s < 1.0 { a + ab * s } else { b }
    }
}

impl Index<usize> for Triangle {
    type Output = Point3<f32>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index % 3]
    }
}
