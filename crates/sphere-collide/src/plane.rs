//! Plane representation and ray intersection.

use nalgebra::{Point3, Vector3};

/// Denominators at or below this magnitude are treated as parallel.
pub const RAY_EPSILON: f32 = f32::EPSILON;

/// A plane in 3D space, represented as `normal · point + dist = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f32>,
    dist: f32,
}

impl Plane {
    /// Creates a plane from a normal vector and distance term.
    ///
    /// The normal is used as given; callers that need signed distances in
    /// world units must pass a unit normal.
    pub fn new(normal: Vector3<f32>, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically; a zero normal stays zero.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let unit_normal = normal
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        Self {
            normal: unit_normal,
            dist: -unit_normal.dot(&point.coords),
        }
    }

    /// Creates a plane from three points.
    ///
    /// The normal is `(c - b) × (b - a)`, so a triangle wound clockwise when
    /// seen from above faces up. Collinear points produce a zero normal.
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = (c - b).cross(&(b - a));
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the distance term of the plane equation.
    #[inline]
    pub fn dist(&self) -> f32 {
        self.dist
    }

    /// Returns `true` if the plane has no usable normal (built from collinear points).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vector3::zeros()
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) + self.dist
    }

    /// Projects a point onto the plane (finds the closest point on the plane).
    #[inline]
    pub fn project_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * self.signed_distance(point)
    }

    /// Intersects the ray `origin + t * direction` with the plane.
    ///
    /// Returns `Some((t, point))` for any `t`, including negative ones, or
    /// `None` if the ray is parallel to the plane.
    pub fn intersect_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let denom = self.normal.dot(&direction);

        if denom.abs() <= RAY_EPSILON {
            return None;
        }

        let t = (-self.dist - self.normal.dot(&origin.coords)) / denom;
        Some((t, origin + direction * t))
    }
}
