use core::ops::Mul;
use derive_more::{AsMut, AsRef, From, Into};
use nalgebra::{IsometryMatrix3, Matrix3x4, Matrix4, Point3, Rotation3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A rigid transform (rotation followed by translation) between two reference frames.
///
/// A value named `b_from_a` maps a point expressed in frame `a` into frame `b`:
///
/// ```text
/// p_b = b_from_a * p_a = R * p_a + t
/// ```
///
/// Transforms compose with `*` when the inner frames agree, so
/// `c_from_b * b_from_a` yields `c_from_a`, and [`Rigid3d::inverse`] turns
/// `b_from_a` into `a_from_b`.
///
/// ```
/// use sfm_core::Rigid3d;
/// use sfm_core::nalgebra::{Point3, Rotation3, Vector3};
/// let b_from_a = Rigid3d::from_parts(
///     Vector3::new(1.0, -2.0, 0.5),
///     Rotation3::from_euler_angles(0.1, 0.2, 0.3),
/// );
/// let p = Point3::new(0.3, 0.4, 5.0);
/// let round_trip = b_from_a.inverse().transform_point(&b_from_a.transform_point(&p));
/// assert!((round_trip - p).norm() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, AsMut, AsRef, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Rigid3d(pub IsometryMatrix3<f64>);

impl Rigid3d {
    /// Creates a transform with no change in position or orientation.
    pub fn identity() -> Self {
        Self(IsometryMatrix3::identity())
    }

    /// Create the transform from translation and rotation.
    pub fn from_parts(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Self {
        Self(IsometryMatrix3::from_parts(translation.into(), rotation))
    }

    /// Retrieve the isometry.
    pub fn isometry(self) -> IsometryMatrix3<f64> {
        self.0
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        self.0.rotation
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.translation.vector
    }

    /// Turns `b_from_a` into `a_from_b`.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self(self.0.inverse())
    }

    /// Maps a point from the source frame into the destination frame.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.0.transform_point(point)
    }

    /// Rotates a direction vector; the translation does not apply to vectors.
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.0.transform_vector(vector)
    }

    /// Retrieve the homogeneous matrix.
    pub fn homogeneous(&self) -> Matrix4<f64> {
        self.0.to_homogeneous()
    }

    /// Retrieve the `[R | t]` projection matrix.
    pub fn matrix(&self) -> Matrix3x4<f64> {
        self.homogeneous().fixed_rows::<3>(0).into_owned()
    }

    /// The largest absolute difference between the homogeneous matrices of two transforms.
    ///
    /// This is `0.0` for identical transforms and is what tolerance checks should compare
    /// against, since repeated composition and inversion accumulate rounding error.
    pub fn residual(&self, other: &Self) -> f64 {
        (self.homogeneous() - other.homogeneous()).amax()
    }
}

impl Default for Rigid3d {
    fn default() -> Self {
        Self::identity()
    }
}

/// Composes `c_from_b * b_from_a` into `c_from_a`.
impl Mul for Rigid3d {
    type Output = Rigid3d;

    fn mul(self, rhs: Rigid3d) -> Rigid3d {
        Rigid3d(self.0 * rhs.0)
    }
}

impl Mul<Point3<f64>> for Rigid3d {
    type Output = Point3<f64>;

    fn mul(self, rhs: Point3<f64>) -> Point3<f64> {
        self.transform_point(&rhs)
    }
}
