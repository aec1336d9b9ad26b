//! Orthonormal right/up/forward frames.

use nalgebra::{Matrix3, Matrix4, Vector3};

/// Horizontal speeds at or below this do not change the facing direction.
const FACING_THRESHOLD: f32 = 0.001;

/// A right-handed frame given by its right, up and forward axes.
///
/// Forward points away from the viewer, so the identity frame has
/// `forward = -Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub forward: Vector3<f32>,
}

impl Default for Basis {
    fn default() -> Self {
        Self::identity()
    }
}

impl Basis {
    /// Returns the world frame: right `+X`, up `+Y`, forward `-Z`.
    pub fn identity() -> Self {
        Self {
            right: Vector3::x(),
            up: Vector3::y(),
            forward: -Vector3::z(),
        }
    }

    /// Builds a frame whose up axis is the direction of `normal`.
    ///
    /// `normal` need not be unit length (a sum of contact normals is fine).
    /// Right stays as close to world `+X` as the tilt allows. Returns `None`
    /// for a zero normal or one parallel to `+X`.
    pub fn from_ground_normal(normal: &Vector3<f32>) -> Option<Self> {
        let up = normal.try_normalize(f32::EPSILON)?;
        let forward = up.cross(&Vector3::x()).try_normalize(f32::EPSILON)?;
        let right = forward.cross(&up).normalize();

        Some(Self { right, up, forward })
    }

    /// Builds an upright frame facing along the horizontal part of `velocity`.
    ///
    /// Returns `None` when the horizontal speed is negligible.
    pub fn facing(velocity: &Vector3<f32>) -> Option<Self> {
        let horizontal = Vector3::new(velocity.x, 0.0, velocity.z);
        if horizontal.norm() <= FACING_THRESHOLD {
            return None;
        }

        let forward = horizontal.normalize();
        let up = Vector3::y();
        let right = forward.cross(&up).normalize();

        Some(Self { right, up, forward })
    }

    /// Expresses a frame-local vector in world space.
    ///
    /// Local `-Z` maps to `forward`, matching [`Basis::to_matrix`].
    pub fn transform_vector(&self, v: &Vector3<f32>) -> Vector3<f32> {
        self.right * v.x + self.up * v.y - self.forward * v.z
    }

    /// Returns the rotation taking local axes onto this frame.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix3::from_columns(&[self.right, self.up, -self.forward]).to_homogeneous()
    }
}
