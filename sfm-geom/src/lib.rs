//! This crate contains the geometry relating two views of the same scene for the sfm crates.
//!
//! Two images that observe overlapping content are related by several models, each valid under
//! different assumptions:
//!
//! - [`FundamentalMatrix`] relates raw pixel coordinates of uncalibrated cameras
//! - [`EssentialMatrix`] relates normalized (calibrated) image coordinates
//! - [`Homography`] maps pixels of one image onto the other when the scene is planar or the
//!   camera only rotated
//!
//! [`TwoViewGeometry`] stores all of them together with the relative pose and the inlier
//! correspondences that support them.
//!
//! ## Swapping the views
//!
//! Reversing which image is "first" does not act the same way on every model. The epipolar
//! constraint `transpose(x2) * F * x1 = 0` is a scalar, so it equals its own transpose and the
//! swapped fundamental (or essential) matrix is the transpose. A homography is a mapping
//! `x2 ~ H * x1`, so the swapped homography is the matrix inverse.
//!
//! ```text
//!   view 1                                 view 2
//!     x1  ------- F, E, H, cam2_from_cam1 ------>  x2
//!     x1  <------ F^T, E^T, H^-1, cam1_from_cam2 -- x2
//! ```

#![no_std]

extern crate alloc;

mod epipolar;
mod two_view;

pub use epipolar::*;
pub use two_view::*;
