use core::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The modality of a sensor mounted on a rig.
///
/// The set is closed. Supporting a new modality means adding a variant here and
/// handling it wherever sensors are matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SensorType {
    Invalid,
    Camera,
    Imu,
}

impl SensorType {
    pub fn as_str(self) -> &'static str {
        match self {
            SensorType::Invalid => "INVALID",
            SensorType::Camera => "CAMERA",
            SensorType::Imu => "IMU",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one sensor by its modality and a numeric id.
///
/// The numeric id is only unique within a modality, so `(CAMERA, 1)` and `(IMU, 1)` are
/// different sensors. Ordering is by modality first, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SensorId {
    pub sensor_type: SensorType,
    pub id: u32,
}

impl SensorId {
    /// Reserved for "never assigned". No real sensor carries this id.
    pub const INVALID: SensorId = SensorId {
        sensor_type: SensorType::Invalid,
        id: u32::MAX,
    };

    pub const fn new(sensor_type: SensorType, id: u32) -> Self {
        Self { sensor_type, id }
    }

    pub const fn camera(id: u32) -> Self {
        Self::new(SensorType::Camera, id)
    }

    pub const fn imu(id: u32) -> Self {
        Self::new(SensorType::Imu, id)
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for SensorId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sensor_type, self.id)
    }
}

/// One piece of data captured by a sensor, such as an image for a camera
/// or a measurement batch for an IMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DataId {
    pub sensor_id: SensorId,
    pub id: u64,
}

impl DataId {
    pub const fn new(sensor_id: SensorId, id: u64) -> Self {
        Self { sensor_id, id }
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.sensor_id.sensor_type, self.sensor_id.id, self.id
        )
    }
}
