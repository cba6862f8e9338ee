use crate::{FrameId, RigId};
use sfm_core::SensorId;
use thiserror::Error;

/// Precondition violations raised by rigs, frames and the rig registry.
///
/// These indicate a bug in the calling pipeline rather than bad data. Every operation that
/// returns one of them has left its receiver unchanged.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("rig {rig_id} already has reference sensor {existing}")]
    RefSensorAlreadySet { rig_id: RigId, existing: SensorId },
    #[error("rig {rig_id} has no reference sensor yet, cannot add sensor {sensor_id}")]
    NoRefSensor { rig_id: RigId, sensor_id: SensorId },
    #[error("sensor {sensor_id} is already registered in rig {rig_id}")]
    DuplicateSensor { rig_id: RigId, sensor_id: SensorId },
    #[error("the invalid sensor id cannot be registered in a rig")]
    InvalidSensorId,
    #[error("sensor {sensor_id} is not registered in rig {rig_id}")]
    UnknownSensor { rig_id: RigId, sensor_id: SensorId },
    #[error("sensor {sensor_id} is the reference of rig {rig_id} and has no stored sensor_from_rig")]
    RefSensorQuery { rig_id: RigId, sensor_id: SensorId },
    #[error("sensor_from_rig of sensor {sensor_id} in rig {rig_id} is not calibrated")]
    MissingSensorFromRig { rig_id: RigId, sensor_id: SensorId },
    #[error("frame {frame_id} is not associated with any rig")]
    MissingRig { frame_id: FrameId },
    #[error("rig {rig_id} is not in the registry")]
    UnknownRig { rig_id: RigId },
    #[error("the invalid rig id does not refer to a rig")]
    InvalidRigId,
    #[error("rig {rig_id} is already in the registry")]
    DuplicateRig { rig_id: RigId },
    #[error("frame {frame_id} has no pose")]
    MissingPose { frame_id: FrameId },
    #[error("invalid rig config: {0}")]
    InvalidConfig(String),
    #[cfg(feature = "serde-serialize")]
    #[error("failed to parse rig config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RigError>;
