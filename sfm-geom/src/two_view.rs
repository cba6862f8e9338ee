use crate::{EssentialMatrix, FundamentalMatrix, Homography};
use alloc::vec::Vec;
use core::fmt;
use log::*;
use sfm_core::{FeatureMatch, Rigid3d};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Which model geometric verification settled on for an image pair.
///
/// The discriminants follow the numbering used by COLMAP databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum TwoViewGeometryConfig {
    #[default]
    Undefined = 0,
    /// Too few inliers for any model.
    Degenerate = 1,
    /// Essential matrix with known intrinsics.
    Calibrated = 2,
    /// Fundamental matrix only.
    Uncalibrated = 3,
    /// Homography with sufficient baseline.
    Planar = 4,
    /// Homography from a pure rotation.
    Panoramic = 5,
    /// Homography, baseline undecided.
    PlanarOrPanoramic = 6,
    /// Matches only along the image border, typically an overlay.
    Watermark = 7,
    /// Several independent models were found.
    Multiple = 8,
}

impl fmt::Display for TwoViewGeometryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TwoViewGeometryConfig::Undefined => "UNDEFINED",
            TwoViewGeometryConfig::Degenerate => "DEGENERATE",
            TwoViewGeometryConfig::Calibrated => "CALIBRATED",
            TwoViewGeometryConfig::Uncalibrated => "UNCALIBRATED",
            TwoViewGeometryConfig::Planar => "PLANAR",
            TwoViewGeometryConfig::Panoramic => "PANORAMIC",
            TwoViewGeometryConfig::PlanarOrPanoramic => "PLANAR_OR_PANORAMIC",
            TwoViewGeometryConfig::Watermark => "WATERMARK",
            TwoViewGeometryConfig::Multiple => "MULTIPLE",
        })
    }
}

/// The estimated relationship between two overlapping views.
///
/// Every field is stated in the direction "view 1 to view 2". After [`TwoViewGeometry::invert`]
/// the same fields describe "view 2 to view 1"; in particular `cam2_from_cam1` then holds what
/// is conceptually `cam1_from_cam2`. The field is not renamed, so whoever inverts a geometry is
/// responsible for tracking which image is now first.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TwoViewGeometry {
    pub config: TwoViewGeometryConfig,
    /// F, relating pixel coordinates.
    pub fundamental: FundamentalMatrix,
    /// E, relating normalized image coordinates.
    pub essential: EssentialMatrix,
    /// H, mapping pixels of view 1 into view 2.
    pub homography: Homography,
    /// Relative pose with translation known only up to scale. `None` until it was estimated.
    pub cam2_from_cam1: Option<Rigid3d>,
    /// Correspondences consistent with the model, as keypoint indices into view 1 and view 2.
    pub inlier_matches: Vec<FeatureMatch>,
    /// Median triangulation angle of the inliers in radians.
    pub tri_angle: f64,
}

impl TwoViewGeometry {
    /// Swaps the roles of the two views in place.
    ///
    /// F and E are transposed, H is inverted, the relative pose is inverted and every inlier
    /// match has its indices exchanged. `config` and `tri_angle` are symmetric and stay as they are.
    ///
    /// Applying this twice restores the original geometry: F, E and the matches exactly, H and the
    /// pose up to floating point round-off. A singular H has no inverse and is left untouched.
    pub fn invert(&mut self) {
        self.fundamental = self.fundamental.swap_views();
        self.essential = self.essential.swap_views();
        match self.homography.swap_views() {
            Some(homography) => self.homography = homography,
            None if !self.homography.is_zero() => {
                warn!("homography is singular and cannot be inverted; leaving it unchanged");
            }
            None => {}
        }
        self.cam2_from_cam1 = self.cam2_from_cam1.map(Rigid3d::inverse);
        for feature_match in &mut self.inlier_matches {
            feature_match.swap();
        }
        trace!(
            "inverted {} two-view geometry with {} inliers",
            self.config,
            self.inlier_matches.len()
        );
    }

    /// Returns a copy describing the views in the opposite order.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let mut geometry = self.clone();
        geometry.invert();
        geometry
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec;
    use sfm_core::nalgebra::{Matrix3, Rotation3, Vector3};

    fn geometry() -> TwoViewGeometry {
        let cam2_from_cam1 = Rigid3d::from_parts(
            Vector3::new(1.0, 0.1, -0.2),
            Rotation3::from_euler_angles(0.05, -0.1, 0.2),
        );
        TwoViewGeometry {
            config: TwoViewGeometryConfig::Calibrated,
            fundamental: FundamentalMatrix(Matrix3::new(
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0,
            )),
            essential: EssentialMatrix::from(cam2_from_cam1),
            homography: Homography(Matrix3::new(
                2.0, 0.1, 5.0, -0.3, 1.5, 2.0, 0.001, 0.002, 1.0,
            )),
            cam2_from_cam1: Some(cam2_from_cam1),
            inlier_matches: vec![FeatureMatch::new(0, 5), FeatureMatch::new(1, 7)],
            tri_angle: 0.25,
        }
    }

    #[test]
    fn invert_transposes_epipolar_matrices() {
        let original = geometry();
        let inverted = original.inverted();
        assert_eq!(inverted.fundamental.0, original.fundamental.0.transpose());
        assert_eq!(inverted.essential.0, original.essential.0.transpose());
    }

    #[test]
    fn invert_inverts_homography() {
        let original = geometry();
        let inverted = original.inverted();
        let product = inverted.homography.0 * original.homography.0;
        assert!((product - Matrix3::identity()).amax() < 1e-12);
        // Transposing would have been wrong here.
        assert!((inverted.homography.0 - original.homography.0.transpose()).amax() > 1e-3);
    }

    #[test]
    fn invert_inverts_pose() {
        let original = geometry();
        let inverted = original.inverted();
        let expected = original.cam2_from_cam1.unwrap().inverse();
        assert!(inverted.cam2_from_cam1.unwrap().residual(&expected) < 1e-12);
    }

    #[test]
    fn invert_swaps_matches() {
        let inverted = geometry().inverted();
        assert_eq!(
            inverted.inlier_matches,
            vec![FeatureMatch::new(5, 0), FeatureMatch::new(7, 1)]
        );
    }

    #[test]
    fn invert_keeps_symmetric_fields() {
        let original = geometry();
        let inverted = original.inverted();
        assert_eq!(inverted.config, original.config);
        assert_eq!(inverted.tri_angle, original.tri_angle);
    }

    #[test]
    fn double_invert_restores() {
        let original = geometry();
        let mut twice = original.clone();
        twice.invert();
        twice.invert();
        assert_eq!(twice.fundamental, original.fundamental);
        assert_eq!(twice.essential, original.essential);
        assert_eq!(twice.inlier_matches, original.inlier_matches);
        assert!((twice.homography.0 - original.homography.0).amax() < 1e-12);
        assert!(
            twice
                .cam2_from_cam1
                .unwrap()
                .residual(&original.cam2_from_cam1.unwrap())
                < 1e-12
        );
    }

    #[test]
    fn default_geometry_survives_invert() {
        let mut geometry = TwoViewGeometry::default();
        geometry.invert();
        assert_eq!(geometry, TwoViewGeometry::default());
        assert_eq!(geometry.config, TwoViewGeometryConfig::Undefined);
    }

    #[test]
    fn config_display() {
        assert_eq!(
            alloc::format!("{}", TwoViewGeometryConfig::PlanarOrPanoramic),
            "PLANAR_OR_PANORAMIC"
        );
        assert_eq!(TwoViewGeometryConfig::Multiple as i32, 8);
    }
}
