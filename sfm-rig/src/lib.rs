//! Multi-sensor rigs and the frames they capture.
//!
//! A [`Rig`] is a rigid body carrying several synchronized sensors, for example a stereo pair
//! or a camera with an IMU. One of them is the reference sensor, whose frame is the rig frame;
//! every other sensor has a fixed `sensor_from_rig` transform. A [`Frame`] is one capture
//! instant of a rig. It stores only `rig_from_world`, so the world pose of every sensor in the
//! frame is derived from a single value and can never disagree with the others:
//!
//! ```text
//! sensor_from_world = sensor_from_rig * rig_from_world
//! ```
//!
//! Frames refer to rigs by [`RigId`] and resolve them through a [`RigRegistry`] at call time.
//!
//! ```
//! use sfm_core::{nalgebra::{Rotation3, Vector3}, Rigid3d, SensorId};
//! use sfm_rig::{Frame, FrameId, Rig, RigId, RigRegistry};
//!
//! let mut rig = Rig::with_rig_id(RigId(0));
//! rig.add_ref_sensor(SensorId::camera(0)).unwrap();
//! let cam1_from_rig = Rigid3d::from_parts(Vector3::new(-0.1, 0.0, 0.0), Rotation3::identity());
//! rig.add_sensor(SensorId::camera(1), Some(cam1_from_rig)).unwrap();
//! let mut rigs = RigRegistry::new();
//! rigs.add_rig(rig).unwrap();
//!
//! let mut frame = Frame::new(FrameId(0));
//! frame.set_rig_id(RigId(0));
//! frame.set_cam_from_world(&rigs, 1, Rigid3d::identity()).unwrap();
//! // The reference camera's pose undoes camera 1's offset.
//! let cam0_from_world = frame.cam_from_world(&rigs, 0).unwrap();
//! assert!((cam0_from_world.translation() - Vector3::new(0.1, 0.0, 0.0)).norm() < 1e-12);
//! ```
//!
//! Misuse, such as registering a second reference sensor or posing a frame whose rig is not
//! registered, is reported as a [`RigError`] and leaves the receiver unchanged.

#[cfg(feature = "serde-serialize")]
mod config;
mod error;
mod frame;
mod registry;
mod rig;

#[cfg(feature = "serde-serialize")]
pub use config::*;
pub use error::*;
pub use frame::*;
pub use registry::*;
pub use rig::*;
