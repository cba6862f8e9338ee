//! # SfM Core
//!
//! This library provides the small set of value types that every crate in the sfm workspace
//! shares: sensor identities, rigid transforms, and feature match records. It works with
//! `#![no_std]` and needs no allocator.
//!
//! ## Transform naming
//!
//! Every rigid transform in this workspace is named `b_from_a`, meaning it maps coordinates
//! expressed in frame `a` into frame `b`. Composition reads right to left and the inner names
//! must agree:
//!
//! ```text
//! c_from_a = c_from_b * b_from_a
//! a_from_b = b_from_a.inverse()
//! ```
//!
//! A multi-sensor rig uses three kinds of frames:
//!
//! - `world` the reconstruction's global frame
//! - `rig` the body frame of the rig, which coincides with its reference sensor
//! - `sensor` (usually `cam`) the frame of one sensor mounted on the rig
//!
//! ```text
//!   world ----rig_from_world----> rig ----sensor_from_rig----> sensor
//!     \                                                          ^
//!      `----------------- sensor_from_world --------------------'
//! ```
//!
//! so that `sensor_from_world = sensor_from_rig * rig_from_world`.

#![no_std]

#[cfg(test)]
extern crate std;

mod endian;
mod matches;
mod math;
mod rigid;
mod sensor;

pub use endian::*;
pub use matches::*;
pub use math::*;
pub use nalgebra;
pub use rigid::*;
pub use sensor::*;
