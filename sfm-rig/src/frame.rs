use crate::{Result, Rig, RigError, RigId, RigRegistry};
use derive_more::{From, Into};
use log::*;
use sfm_core::{DataId, Rigid3d, SensorId, SensorType};
use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Identifies a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FrameId(pub u32);

impl FrameId {
    /// Reserved for a frame that was never assigned an id.
    pub const INVALID: FrameId = FrameId(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("Invalid")
        }
    }
}

/// One synchronized capture instant of a rig.
///
/// The frame refers to its rig by [`RigId`] and resolves it through a [`RigRegistry`] whenever a
/// pose has to be composed, so the frame never owns or borrows the rig. Only the rig's world
/// pose `rig_from_world` is stored. Every sensor's world pose is derived from it through the
/// rig, which keeps the sensors of one frame consistent with each other at all times.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Frame {
    frame_id: FrameId,
    /// `None` if the frame was never associated with a rig.
    rig_id: Option<RigId>,
    /// `None` until the pose is estimated.
    rig_from_world: Option<Rigid3d>,
    data_ids: BTreeSet<DataId>,
}

impl Frame {
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            ..Self::default()
        }
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn set_frame_id(&mut self, frame_id: FrameId) {
        self.frame_id = frame_id;
    }

    pub fn has_rig_id(&self) -> bool {
        self.rig_id.is_some()
    }

    pub fn rig_id(&self) -> Option<RigId> {
        self.rig_id
    }

    pub fn set_rig_id(&mut self, rig_id: RigId) {
        self.rig_id = Some(rig_id);
    }

    /// Associates the frame with `rig` by id.
    pub fn set_rig(&mut self, rig: &Rig) {
        self.set_rig_id(rig.rig_id());
    }

    pub fn has_pose(&self) -> bool {
        self.rig_from_world.is_some()
    }

    pub fn rig_from_world(&self) -> Option<&Rigid3d> {
        self.rig_from_world.as_ref()
    }

    /// Overwrites the rig's world pose directly, as bundle adjustment does with its result.
    pub fn set_rig_from_world(&mut self, rig_from_world: Rigid3d) {
        self.rig_from_world = Some(rig_from_world);
    }

    pub fn reset_pose(&mut self) {
        self.rig_from_world = None;
    }

    /// Records that `data_id` was captured at this instant. Returns `false` if it already was.
    pub fn add_data_id(&mut self, data_id: DataId) -> bool {
        self.data_ids.insert(data_id)
    }

    pub fn has_data_id(&self, data_id: DataId) -> bool {
        self.data_ids.contains(&data_id)
    }

    pub fn data_ids(&self) -> &BTreeSet<DataId> {
        &self.data_ids
    }

    /// The data ids captured by camera sensors, which are image ids.
    pub fn image_ids(&self) -> impl Iterator<Item = DataId> + '_ {
        self.data_ids
            .iter()
            .copied()
            .filter(|data_id| data_id.sensor_id.sensor_type == SensorType::Camera)
    }

    /// Resolves this frame's rig in `rigs`.
    ///
    /// A frame without a rig fails with [`RigError::MissingRig`], one holding
    /// [`RigId::INVALID`] with [`RigError::InvalidRigId`].
    pub fn rig<'a>(&self, rigs: &'a RigRegistry) -> Result<&'a Rig> {
        let rig_id = self.rig_id.ok_or(RigError::MissingRig {
            frame_id: self.frame_id,
        })?;
        rigs.rig(rig_id)
    }

    /// Sets the frame pose from the observed world pose of one of its cameras.
    ///
    /// If the camera is the rig's reference sensor, `rig_from_world = cam_from_world`. Otherwise
    /// the camera's offset is undone: `rig_from_world = inverse(cam_from_rig) * cam_from_world`.
    /// Fails without touching the pose if the rig cannot be resolved or the camera is not a
    /// calibrated sensor of it.
    pub fn set_cam_from_world(
        &mut self,
        rigs: &RigRegistry,
        camera_id: u32,
        cam_from_world: Rigid3d,
    ) -> Result<()> {
        let sensor_id = SensorId::camera(camera_id);
        let rig = self.rig(rigs)?;
        let rig_from_world = if rig.is_ref_sensor(sensor_id) {
            cam_from_world
        } else {
            rig.sensor_from_rig(sensor_id)?.inverse() * cam_from_world
        };
        trace!(
            "frame {}: rig_from_world set through {}",
            self.frame_id,
            sensor_id
        );
        self.rig_from_world = Some(rig_from_world);
        Ok(())
    }

    /// Derives the world pose of any sensor of the rig: `sensor_from_rig * rig_from_world`.
    pub fn sensor_from_world(&self, rigs: &RigRegistry, sensor_id: SensorId) -> Result<Rigid3d> {
        let rig = self.rig(rigs)?;
        let rig_from_world = self.rig_from_world.ok_or(RigError::MissingPose {
            frame_id: self.frame_id,
        })?;
        if rig.is_ref_sensor(sensor_id) {
            Ok(rig_from_world)
        } else {
            Ok(rig.sensor_from_rig(sensor_id)? * rig_from_world)
        }
    }

    pub fn cam_from_world(&self, rigs: &RigRegistry, camera_id: u32) -> Result<Rigid3d> {
        self.sensor_from_world(rigs, SensorId::camera(camera_id))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(frame_id={}, rig_id=", self.frame_id)?;
        match self.rig_id {
            Some(rig_id) => write!(f, "{}", rig_id)?,
            None => f.write_str("Unknown")?,
        }
        write!(
            f,
            ", has_pose={}, data_ids=[",
            u8::from(self.has_pose())
        )?;
        for (ix, data_id) in self.data_ids.iter().enumerate() {
            if ix != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", data_id)?;
        }
        f.write_str("])")
    }
}
