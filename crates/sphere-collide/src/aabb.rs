//! Axis-aligned bounding boxes.

use nalgebra::{Matrix4, Point3, Vector3};

/// How much of one volume lies inside another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// No overlap at all.
    Disjoint,
    /// Partial overlap, or touching the boundary.
    Intersects,
    /// Entirely inside.
    Contains,
}

/// An axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl Aabb {
    /// Creates a box from two corners. The caller guarantees `min <= max` per axis.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "Aabb min corner must not exceed max corner"
        );
        Self { min, max }
    }

    /// Creates a cube centred on `center` that extends `half_extent` along every axis.
    pub fn from_center_half_extent(center: Point3<f32>, half_extent: f32) -> Self {
        let h = Vector3::repeat(half_extent);
        Self::new(center - h, center + h)
    }

    /// Computes the tight bounds of a point set. Returns `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;

        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.inf(p),
            max: bounds.max.sup(p),
        }))
    }

    /// Returns the minimum corner.
    #[inline]
    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    /// Returns the maximum corner.
    #[inline]
    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// Returns the centre point.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns a copy grown by `amount` on every side.
    pub fn inflated(&self, amount: f32) -> Self {
        let a = Vector3::repeat(amount);
        Self::new(self.min - a, self.max + a)
    }

    /// Classifies a point against this box.
    ///
    /// Points on the boundary are `Intersects`, so `Contains` means strictly inside.
    pub fn contains_point(&self, p: &Point3<f32>) -> Containment {
        let (min, max) = (&self.min, &self.max);

        if p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y || p.z < min.z || p.z > max.z {
            Containment::Disjoint
        } else if p.x == min.x
            || p.x == max.x
            || p.y == min.y
            || p.y == max.y
            || p.z == min.z
            || p.z == max.z
        {
            Containment::Intersects
        } else {
            Containment::Contains
        }
    }

    /// Classifies another box against this one.
    pub fn contains_box(&self, other: &Aabb) -> Containment {
        if self.is_disjoint(other) {
            return Containment::Disjoint;
        }

        let inside = (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i]);
        if inside {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Returns `true` if the boxes share no point. Touching faces still overlap.
    pub fn is_disjoint(&self, other: &Aabb) -> bool {
        (0..3).any(|i| other.max[i] < self.min[i] || other.min[i] > self.max[i])
    }

    /// Splits the box into its eight octants at the centre point.
    ///
    /// Octants are ordered with X varying fastest, then Z, then Y.
    pub fn octants(&self) -> [Aabb; 8] {
        let l = self.min;
        let h = self.max;
        let c = self.center();

        [
            Aabb::new(Point3::new(l.x, l.y, l.z), Point3::new(c.x, c.y, c.z)),
            Aabb::new(Point3::new(c.x, l.y, l.z), Point3::new(h.x, c.y, c.z)),
            Aabb::new(Point3::new(l.x, l.y, c.z), Point3::new(c.x, c.y, h.z)),
            Aabb::new(Point3::new(c.x, l.y, c.z), Point3::new(h.x, c.y, h.z)),
            Aabb::new(Point3::new(l.x, c.y, l.z), Point3::new(c.x, h.y, c.z)),
            Aabb::new(Point3::new(c.x, c.y, l.z), Point3::new(h.x, h.y, c.z)),
            Aabb::new(Point3::new(l.x, c.y, c.z), Point3::new(c.x, h.y, h.z)),
            Aabb::new(Point3::new(c.x, c.y, c.z), Point3::new(h.x, h.y, h.z)),
        ]
    }

    /// Transforms the box by an affine matrix and returns the tight box around the result.
    ///
    /// Each output axis starts at the translation and, for every matrix
    /// coefficient on that row, adds whichever input extreme minimises
    /// (or maximises) the product. This is exact for the eight corners
    /// without enumerating them.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let mut min = Point3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        let mut max = min;

        for row in 0..3 {
            for col in 0..3 {
                let m = matrix[(row, col)];
                let low = m * self.min[col];
                let high = m * self.max[col];

                if m < 0.0 {
                    min[row] += high;
                    max[row] += low;
                } else {
                    min[row] += low;
                    max[row] += high;
                }
            }
        }

        Self { min, max }
    }
}
