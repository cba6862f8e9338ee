#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Marks a keypoint index that does not refer to any keypoint.
pub const INVALID_POINT2D_IDX: u32 = u32::MAX;

/// A correspondence between keypoint `point2d_idx1` of the first image and
/// keypoint `point2d_idx2` of the second image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FeatureMatch {
    pub point2d_idx1: u32,
    pub point2d_idx2: u32,
}

impl FeatureMatch {
    pub const fn new(point2d_idx1: u32, point2d_idx2: u32) -> Self {
        Self {
            point2d_idx1,
            point2d_idx2,
        }
    }

    /// Exchanges the roles of the two images in place.
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.point2d_idx1, &mut self.point2d_idx2);
    }

    #[must_use]
    pub fn swapped(self) -> Self {
        Self::new(self.point2d_idx2, self.point2d_idx1)
    }
}

impl Default for FeatureMatch {
    fn default() -> Self {
        Self::new(INVALID_POINT2D_IDX, INVALID_POINT2D_IDX)
    }
}
