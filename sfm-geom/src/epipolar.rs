use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use num_traits::Float;
use sfm_core::{
    nalgebra::{Matrix3, Point2, Vector3},
    Rigid3d,
};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// This stores an essential matrix, which is satisfied by the following constraint:
///
/// transpose(x2) * E * x1 = 0
///
/// Where `x1` and `x2` are homogeneous normalized image coordinates of the same 3d point
/// observed in the first and the second view. A homogeneous normalized image coordinate is
/// formed by appending `1.0` to a keypoint that has been undistorted and divided through by
/// the camera intrinsics.
///
/// `E * x1` is the epipolar line in the second image on which `x2` must lie. Since the
/// constraint is a scalar it is equal to its own transpose, `transpose(x1) * transpose(E) * x2 = 0`,
/// which is why the essential matrix for the swapped pair of views is `transpose(E)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct EssentialMatrix(pub Matrix3<f64>);

impl EssentialMatrix {
    /// The essential matrix relating the views in the opposite order.
    #[must_use]
    pub fn swap_views(self) -> Self {
        Self(self.0.transpose())
    }

    /// Algebraic epipolar error `|transpose(b) * E * a|` of a normalized correspondence.
    pub fn residual(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        Float::abs(b.to_homogeneous().dot(&(self.0 * a.to_homogeneous())))
    }
}

impl Default for EssentialMatrix {
    fn default() -> Self {
        Self(Matrix3::zeros())
    }
}

/// Generates an essential matrix corresponding to the relative pose `cam2_from_cam1`.
///
/// ```
/// use sfm_core::Rigid3d;
/// use sfm_core::nalgebra::{Point2, Point3, Rotation3, Vector3};
/// use sfm_geom::EssentialMatrix;
/// let cam2_from_cam1 = Rigid3d::from_parts(
///     Vector3::new(-0.8, 0.4, 0.5),
///     Rotation3::from_euler_angles(0.2, 0.3, 0.4),
/// );
/// let p1 = Point3::new(0.2, -0.1, 4.0);
/// let p2 = cam2_from_cam1.transform_point(&p1);
/// let a = Point2::new(p1.x / p1.z, p1.y / p1.z);
/// let b = Point2::new(p2.x / p2.z, p2.y / p2.z);
/// assert!(EssentialMatrix::from(cam2_from_cam1).residual(&a, &b) < 1e-12);
/// ```
impl From<Rigid3d> for EssentialMatrix {
    fn from(cam2_from_cam1: Rigid3d) -> Self {
        Self(cam2_from_cam1.translation().cross_matrix() * cam2_from_cam1.rotation().matrix())
    }
}

/// This stores a fundamental matrix, the uncalibrated counterpart of [`EssentialMatrix`]:
///
/// transpose(x2) * F * x1 = 0
///
/// Where `x1` and `x2` are homogeneous pixel coordinates. With intrinsic matrices `K1` and `K2`
/// it is related to the essential matrix by `F = transpose(inverse(K2)) * E * inverse(K1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FundamentalMatrix(pub Matrix3<f64>);

impl FundamentalMatrix {
    /// Returns `None` if either intrinsic matrix is singular.
    pub fn from_essential(
        essential: &EssentialMatrix,
        k1: &Matrix3<f64>,
        k2: &Matrix3<f64>,
    ) -> Option<Self> {
        let k1_inv = k1.try_inverse()?;
        let k2_inv = k2.try_inverse()?;
        Some(Self(k2_inv.transpose() * essential.0 * k1_inv))
    }

    /// The fundamental matrix relating the views in the opposite order.
    #[must_use]
    pub fn swap_views(self) -> Self {
        Self(self.0.transpose())
    }

    /// Algebraic epipolar error `|transpose(b) * F * a|` of a pixel correspondence.
    pub fn residual(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        Float::abs(b.to_homogeneous().dot(&(self.0 * a.to_homogeneous())))
    }
}

impl Default for FundamentalMatrix {
    fn default() -> Self {
        Self(Matrix3::zeros())
    }
}

/// A projective mapping `x2 ~ H * x1` of homogeneous pixel coordinates from the first view
/// into the second.
///
/// It exactly relates the views when every observed point lies on one plane, or when the
/// camera only rotated between them. Unlike the epipolar matrices it maps points rather than
/// constraining them, so swapping the views inverts it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Homography(pub Matrix3<f64>);

impl Homography {
    /// The homography induced by the plane `transpose(normal) * X = distance`, where `X` is
    /// expressed in the first camera's frame:
    ///
    /// ```text
    /// H = K2 * (R + t * transpose(n) / d) * inverse(K1)
    /// ```
    ///
    /// Returns `None` if `K1` is singular or the plane passes through the first optical center.
    pub fn from_plane(
        cam2_from_cam1: &Rigid3d,
        normal: &Vector3<f64>,
        distance: f64,
        k1: &Matrix3<f64>,
        k2: &Matrix3<f64>,
    ) -> Option<Self> {
        if distance == 0.0 || !distance.is_finite() {
            return None;
        }
        let k1_inv = k1.try_inverse()?;
        let h = cam2_from_cam1.rotation().matrix()
            + cam2_from_cam1.translation() * normal.transpose() / distance;
        Some(Self(k2 * h * k1_inv))
    }

    /// The homography mapping the second view into the first.
    ///
    /// Returns `None` if the homography is singular.
    pub fn swap_views(self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Maps a point of the first view into the second view.
    ///
    /// Returns `None` if the point maps to infinity.
    pub fn transfer(&self, point: &Point2<f64>) -> Option<Point2<f64>> {
        Point2::from_homogeneous(self.0 * point.to_homogeneous())
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&n| n == 0.0)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self(Matrix3::zeros())
    }
}
