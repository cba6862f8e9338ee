use crate::{Result, RigError};
use derive_more::{From, Into};
use log::*;
use sfm_core::{Rigid3d, SensorId};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Identifies a [`Rig`] within a [`RigRegistry`](crate::RigRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RigId(pub u32);

impl RigId {
    /// Reserved for a rig that was never assigned an id.
    pub const INVALID: RigId = RigId(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for RigId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for RigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("Invalid")
        }
    }
}

/// A rigid assembly of synchronized sensors.
///
/// The rig's body frame is defined to be the frame of its reference sensor, so the reference
/// sensor's `sensor_from_rig` is identity by definition and is not stored. Every other sensor
/// has a fixed `sensor_from_rig`, which may be unknown until calibration provides it.
///
/// The reference sensor must be added first and exactly once:
///
/// ```
/// use sfm_core::{Rigid3d, SensorId};
/// use sfm_rig::Rig;
/// let mut rig = Rig::new();
/// assert!(rig.add_sensor(SensorId::camera(1), None).is_err());
/// rig.add_ref_sensor(SensorId::camera(0)).unwrap();
/// rig.add_sensor(SensorId::camera(1), Some(Rigid3d::identity())).unwrap();
/// assert!(rig.add_ref_sensor(SensorId::camera(2)).is_err());
/// assert_eq!(rig.num_sensors(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rig {
    rig_id: RigId,
    ref_sensor_id: SensorId,
    /// Non-reference sensors. `None` marks a registered sensor whose offset is not yet known.
    sensors_from_rig: BTreeMap<SensorId, Option<Rigid3d>>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rig_id(rig_id: RigId) -> Self {
        Self {
            rig_id,
            ..Self::default()
        }
    }

    pub fn rig_id(&self) -> RigId {
        self.rig_id
    }

    pub fn set_rig_id(&mut self, rig_id: RigId) {
        self.rig_id = rig_id;
    }

    /// [`SensorId::INVALID`] until [`Rig::add_ref_sensor`] succeeds.
    pub fn ref_sensor_id(&self) -> SensorId {
        self.ref_sensor_id
    }

    pub fn has_ref_sensor(&self) -> bool {
        self.ref_sensor_id.is_valid()
    }

    /// Registers the sensor that defines the rig frame.
    pub fn add_ref_sensor(&mut self, sensor_id: SensorId) -> Result<()> {
        if self.has_ref_sensor() {
            return Err(RigError::RefSensorAlreadySet {
                rig_id: self.rig_id,
                existing: self.ref_sensor_id,
            });
        }
        if !sensor_id.is_valid() {
            return Err(RigError::InvalidSensorId);
        }
        debug!("rig {}: reference sensor {}", self.rig_id, sensor_id);
        self.ref_sensor_id = sensor_id;
        Ok(())
    }

    /// Registers a non-reference sensor with its pose relative to the rig.
    ///
    /// Pass `None` if the offset still has to be calibrated. Registering a sensor twice is
    /// rejected rather than overwriting the first registration.
    pub fn add_sensor(
        &mut self,
        sensor_id: SensorId,
        sensor_from_rig: Option<Rigid3d>,
    ) -> Result<()> {
        if !self.has_ref_sensor() {
            return Err(RigError::NoRefSensor {
                rig_id: self.rig_id,
                sensor_id,
            });
        }
        if !sensor_id.is_valid() {
            return Err(RigError::InvalidSensorId);
        }
        if self.has_sensor(sensor_id) {
            return Err(RigError::DuplicateSensor {
                rig_id: self.rig_id,
                sensor_id,
            });
        }
        debug!(
            "rig {}: sensor {} (calibrated: {})",
            self.rig_id,
            sensor_id,
            sensor_from_rig.is_some()
        );
        self.sensors_from_rig.insert(sensor_id, sensor_from_rig);
        Ok(())
    }

    pub fn has_sensor(&self, sensor_id: SensorId) -> bool {
        self.is_ref_sensor(sensor_id) || self.sensors_from_rig.contains_key(&sensor_id)
    }

    pub fn is_ref_sensor(&self, sensor_id: SensorId) -> bool {
        self.has_ref_sensor() && self.ref_sensor_id == sensor_id
    }

    /// Counts every registered sensor, including the reference sensor.
    pub fn num_sensors(&self) -> usize {
        self.sensors_from_rig.len() + usize::from(self.has_ref_sensor())
    }

    /// All registered sensors, reference sensor first and the rest in id order.
    pub fn sensor_ids(&self) -> impl Iterator<Item = SensorId> + '_ {
        self.has_ref_sensor()
            .then_some(self.ref_sensor_id)
            .into_iter()
            .chain(self.sensors_from_rig.keys().copied())
    }

    pub fn non_ref_sensors(&self) -> &BTreeMap<SensorId, Option<Rigid3d>> {
        &self.sensors_from_rig
    }

    /// The pose of a non-reference sensor relative to the rig.
    ///
    /// The reference sensor is rejected with [`RigError::RefSensorQuery`] instead of returning
    /// identity, so callers composing poses have to handle it explicitly. A registered sensor
    /// without a calibrated offset yields [`RigError::MissingSensorFromRig`].
    pub fn sensor_from_rig(&self, sensor_id: SensorId) -> Result<Rigid3d> {
        self.maybe_sensor_from_rig(sensor_id)?
            .ok_or(RigError::MissingSensorFromRig {
                rig_id: self.rig_id,
                sensor_id,
            })
    }

    /// Like [`Rig::sensor_from_rig`], but an uncalibrated sensor yields `Ok(None)`.
    pub fn maybe_sensor_from_rig(&self, sensor_id: SensorId) -> Result<Option<Rigid3d>> {
        self.sensor_entry(sensor_id).map(|entry| *entry)
    }

    /// Stores a (re)calibrated offset for an already registered non-reference sensor.
    pub fn set_sensor_from_rig(
        &mut self,
        sensor_id: SensorId,
        sensor_from_rig: Rigid3d,
    ) -> Result<()> {
        *self.sensor_entry_mut(sensor_id)? = Some(sensor_from_rig);
        Ok(())
    }

    /// Marks the offset of a registered non-reference sensor as unknown again.
    pub fn reset_sensor_from_rig(&mut self, sensor_id: SensorId) -> Result<()> {
        *self.sensor_entry_mut(sensor_id)? = None;
        Ok(())
    }

    fn sensor_entry(&self, sensor_id: SensorId) -> Result<&Option<Rigid3d>> {
        if self.is_ref_sensor(sensor_id) {
            return Err(RigError::RefSensorQuery {
                rig_id: self.rig_id,
                sensor_id,
            });
        }
        self.sensors_from_rig
            .get(&sensor_id)
            .ok_or(RigError::UnknownSensor {
                rig_id: self.rig_id,
                sensor_id,
            })
    }

    fn sensor_entry_mut(&mut self, sensor_id: SensorId) -> Result<&mut Option<Rigid3d>> {
        if self.is_ref_sensor(sensor_id) {
            return Err(RigError::RefSensorQuery {
                rig_id: self.rig_id,
                sensor_id,
            });
        }
        let rig_id = self.rig_id;
        self.sensors_from_rig
            .get_mut(&sensor_id)
            .ok_or(RigError::UnknownSensor { rig_id, sensor_id })
    }
}

impl fmt::Display for Rig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rig(rig_id={}, ref_sensor_id={}, sensors=[",
            self.rig_id, self.ref_sensor_id
        )?;
        for (ix, sensor_id) in self.sensors_from_rig.keys().enumerate() {
            if ix != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", sensor_id)?;
        }
        f.write_str("])")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sfm_core::nalgebra::{Rotation3, Vector3};

    fn offset() -> Rigid3d {
        Rigid3d::from_parts(
            Vector3::new(0.1, 0.0, 0.0),
            Rotation3::from_euler_angles(0.0, 0.1, 0.0),
        )
    }

    fn stereo_rig() -> Rig {
        let mut rig = Rig::with_rig_id(RigId(1));
        rig.add_ref_sensor(SensorId::camera(0)).unwrap();
        rig.add_sensor(SensorId::camera(1), Some(offset())).unwrap();
        rig
    }

    #[test]
    fn empty_rig() {
        let rig = Rig::new();
        assert_eq!(rig.rig_id(), RigId::INVALID);
        assert_eq!(rig.ref_sensor_id(), SensorId::INVALID);
        assert!(!rig.has_ref_sensor());
        assert_eq!(rig.num_sensors(), 0);
        assert!(!rig.has_sensor(SensorId::INVALID));
        assert!(!rig.is_ref_sensor(SensorId::INVALID));
        assert_eq!(rig.sensor_ids().count(), 0);
    }

    #[test]
    fn ref_sensor_only_once() {
        let mut rig = stereo_rig();
        assert!(matches!(
            rig.add_ref_sensor(SensorId::camera(5)),
            Err(RigError::RefSensorAlreadySet { existing, .. }) if existing == SensorId::camera(0)
        ));
        assert_eq!(rig.ref_sensor_id(), SensorId::camera(0));
        assert!(!rig.has_sensor(SensorId::camera(5)));
    }

    #[test]
    fn sensor_needs_ref_sensor() {
        let mut rig = Rig::new();
        assert!(matches!(
            rig.add_sensor(SensorId::imu(0), None),
            Err(RigError::NoRefSensor { .. })
        ));
        assert_eq!(rig.num_sensors(), 0);
    }

    #[test]
    fn invalid_sensor_rejected() {
        let mut rig = Rig::new();
        assert!(matches!(
            rig.add_ref_sensor(SensorId::INVALID),
            Err(RigError::InvalidSensorId)
        ));
        let mut rig = stereo_rig();
        assert!(matches!(
            rig.add_sensor(SensorId::INVALID, None),
            Err(RigError::InvalidSensorId)
        ));
    }

    #[test]
    fn duplicates_rejected_not_overwritten() {
        let mut rig = stereo_rig();
        assert!(matches!(
            rig.add_sensor(SensorId::camera(1), None),
            Err(RigError::DuplicateSensor { .. })
        ));
        assert_eq!(rig.sensor_from_rig(SensorId::camera(1)).unwrap(), offset());
        assert!(matches!(
            rig.add_sensor(SensorId::camera(0), Some(offset())),
            Err(RigError::DuplicateSensor { .. })
        ));
        assert_eq!(rig.num_sensors(), 2);
    }

    #[test]
    fn queries() {
        let mut rig = stereo_rig();
        rig.add_sensor(SensorId::imu(0), None).unwrap();
        assert!(rig.has_sensor(SensorId::camera(0)));
        assert!(rig.has_sensor(SensorId::camera(1)));
        assert!(rig.has_sensor(SensorId::imu(0)));
        assert!(!rig.has_sensor(SensorId::camera(2)));
        assert!(rig.is_ref_sensor(SensorId::camera(0)));
        assert!(!rig.is_ref_sensor(SensorId::camera(1)));
        assert_eq!(rig.num_sensors(), 3);
        assert_eq!(
            rig.sensor_ids().collect::<Vec<_>>(),
            vec![SensorId::camera(0), SensorId::camera(1), SensorId::imu(0)]
        );
        assert_eq!(rig.non_ref_sensors().len(), 2);
    }

    #[test]
    fn sensor_from_rig_of_non_ref_sensor() {
        let rig = stereo_rig();
        assert_eq!(rig.sensor_from_rig(SensorId::camera(1)).unwrap(), offset());
        assert_eq!(
            rig.maybe_sensor_from_rig(SensorId::camera(1)).unwrap(),
            Some(offset())
        );
    }

    #[test]
    fn sensor_from_rig_of_ref_sensor_is_rejected() {
        let rig = stereo_rig();
        assert!(matches!(
            rig.sensor_from_rig(SensorId::camera(0)),
            Err(RigError::RefSensorQuery { .. })
        ));
        assert!(matches!(
            rig.maybe_sensor_from_rig(SensorId::camera(0)),
            Err(RigError::RefSensorQuery { .. })
        ));
    }

    #[test]
    fn sensor_from_rig_of_unknown_sensor() {
        let rig = stereo_rig();
        assert!(matches!(
            rig.sensor_from_rig(SensorId::imu(3)),
            Err(RigError::UnknownSensor { .. })
        ));
    }

    #[test]
    fn uncalibrated_sensor() {
        let mut rig = stereo_rig();
        rig.add_sensor(SensorId::imu(0), None).unwrap();
        assert!(rig.has_sensor(SensorId::imu(0)));
        assert_eq!(rig.maybe_sensor_from_rig(SensorId::imu(0)).unwrap(), None);
        assert!(matches!(
            rig.sensor_from_rig(SensorId::imu(0)),
            Err(RigError::MissingSensorFromRig { .. })
        ));

        rig.set_sensor_from_rig(SensorId::imu(0), offset()).unwrap();
        assert_eq!(rig.sensor_from_rig(SensorId::imu(0)).unwrap(), offset());
        rig.reset_sensor_from_rig(SensorId::imu(0)).unwrap();
        assert_eq!(rig.maybe_sensor_from_rig(SensorId::imu(0)).unwrap(), None);
    }

    #[test]
    fn calibration_write_back_checks_sensor() {
        let mut rig = stereo_rig();
        assert!(matches!(
            rig.set_sensor_from_rig(SensorId::camera(0), offset()),
            Err(RigError::RefSensorQuery { .. })
        ));
        assert!(matches!(
            rig.set_sensor_from_rig(SensorId::camera(9), offset()),
            Err(RigError::UnknownSensor { .. })
        ));
        assert!(!rig.has_sensor(SensorId::camera(9)));
    }

    #[test]
    fn display() {
        let mut rig = stereo_rig();
        rig.add_sensor(SensorId::imu(0), None).unwrap();
        assert_eq!(
            rig.to_string(),
            "Rig(rig_id=1, ref_sensor_id=(CAMERA, 0), sensors=[(CAMERA, 1), (IMU, 0)])"
        );
        assert_eq!(
            Rig::new().to_string(),
            "Rig(rig_id=Invalid, ref_sensor_id=(INVALID, 4294967295), sensors=[])"
        );
    }
}
