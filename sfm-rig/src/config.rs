use crate::{Result, Rig, RigError, RigId, RigRegistry};
use log::*;
use serde::{Deserialize, Serialize};
use sfm_core::{
    nalgebra::{Quaternion, UnitQuaternion, Vector3},
    Rigid3d, SensorId, SensorType,
};
use std::collections::BTreeSet;
use std::io::Read;

/// Rig calibration as read from a JSON file, a list with one entry per rig.
///
/// ```json
/// [
///   {
///     "sensors": [
///       { "sensor_type": "CAMERA", "id": 1, "ref_sensor": true },
///       {
///         "sensor_type": "CAMERA",
///         "id": 2,
///         "sensor_from_rig": { "rotation": [1.0, 0.0, 0.0, 0.0], "translation": [-0.12, 0.0, 0.0] }
///       },
///       { "sensor_type": "IMU", "id": 1 }
///     ]
///   }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RigConfig {
    pub rigs: Vec<RigConfigRig>,
}

/// One rig in a [`RigConfig`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RigConfigRig {
    /// Explicit id of the rig. Rigs without one are numbered by their position in the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig_id: Option<u32>,
    pub sensors: Vec<RigConfigSensor>,
}

/// One sensor in a [`RigConfigRig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfigSensor {
    pub sensor_type: SensorType,
    pub id: u32,
    /// Exactly one sensor per rig must set this.
    #[serde(default = "default_ref_sensor")]
    pub ref_sensor: bool,
    /// Omitted for the reference sensor and for sensors that still need calibration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_from_rig: Option<RigConfigPose>,
}

impl RigConfigSensor {
    pub fn sensor_id(&self) -> SensorId {
        SensorId::new(self.sensor_type, self.id)
    }
}

/// A `sensor_from_rig` transform with the rotation as a `[w, x, y, z]` quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigConfigPose {
    #[serde(default = "default_rotation")]
    pub rotation: [f64; 4],
    #[serde(default = "default_translation")]
    pub translation: [f64; 3],
}

impl RigConfigPose {
    pub fn rigid(&self) -> Result<Rigid3d> {
        if !self
            .rotation
            .iter()
            .chain(&self.translation)
            .all(|n| n.is_finite())
        {
            return Err(RigError::InvalidConfig(format!(
                "non-finite sensor_from_rig {:?}",
                self
            )));
        }
        let [w, x, y, z] = self.rotation;
        let rotation = UnitQuaternion::try_new(Quaternion::new(w, x, y, z), f64::EPSILON)
            .ok_or_else(|| {
                RigError::InvalidConfig(format!("degenerate rotation {:?}", self.rotation))
            })?;
        Ok(Rigid3d::from_parts(
            Vector3::from(self.translation),
            rotation.to_rotation_matrix(),
        ))
    }
}

impl From<Rigid3d> for RigConfigPose {
    fn from(rigid: Rigid3d) -> Self {
        let q = UnitQuaternion::from_rotation_matrix(&rigid.rotation());
        let t = rigid.translation();
        Self {
            rotation: [q.w, q.i, q.j, q.k],
            translation: [t.x, t.y, t.z],
        }
    }
}

impl RigConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describes the sensor layout of an existing rig.
    pub fn from_rigs<'a>(rigs: impl IntoIterator<Item = &'a Rig>) -> Self {
        let rigs = rigs
            .into_iter()
            .map(|rig| RigConfigRig {
                rig_id: rig.rig_id().is_valid().then_some(rig.rig_id().0),
                sensors: rig
                    .sensor_ids()
                    .map(|sensor_id| RigConfigSensor {
                        sensor_type: sensor_id.sensor_type,
                        id: sensor_id.id,
                        ref_sensor: rig.is_ref_sensor(sensor_id),
                        sensor_from_rig: rig
                            .non_ref_sensors()
                            .get(&sensor_id)
                            .copied()
                            .flatten()
                            .map(RigConfigPose::from),
                    })
                    .collect(),
            })
            .collect();
        Self { rigs }
    }

    /// Builds the configured rigs. Rigs without an explicit id are numbered from `first_rig_id`
    /// by their position in the list.
    ///
    /// The reference sensor is registered first no matter where it appears in the list. Fails if
    /// a rig would get [`RigId::INVALID`] or an id outside the `u32` range, or if two rigs share
    /// an id.
    pub fn build(&self, first_rig_id: RigId) -> Result<Vec<Rig>> {
        let mut rig_ids = BTreeSet::new();
        let mut rigs = Vec::with_capacity(self.rigs.len());
        for (ix, config) in self.rigs.iter().enumerate() {
            let rig_id = match config.rig_id {
                Some(id) => RigId(id),
                None => u32::try_from(ix)
                    .ok()
                    .and_then(|ix| first_rig_id.0.checked_add(ix))
                    .map(RigId)
                    .ok_or_else(|| {
                        RigError::InvalidConfig(format!(
                            "rig at position {} numbered from {} overflows the rig id range",
                            ix, first_rig_id
                        ))
                    })?,
            };
            if !rig_ids.insert(rig_id) {
                return Err(RigError::InvalidConfig(format!(
                    "rig id {} is used by more than one rig",
                    rig_id
                )));
            }
            rigs.push(config.build(rig_id)?);
        }
        info!("configured {} rigs", rigs.len());
        Ok(rigs)
    }

    /// Builds the configured rigs into a fresh registry.
    pub fn build_registry(&self, first_rig_id: RigId) -> Result<RigRegistry> {
        let mut registry = RigRegistry::new();
        for rig in self.build(first_rig_id)? {
            registry.add_rig(rig)?;
        }
        Ok(registry)
    }
}

impl RigConfigRig {
    pub fn build(&self, rig_id: RigId) -> Result<Rig> {
        if !rig_id.is_valid() {
            return Err(RigError::InvalidConfig(
                "rig uses the reserved invalid rig id".to_string(),
            ));
        }
        let mut refs = self.sensors.iter().filter(|sensor| sensor.ref_sensor);
        let ref_sensor = match (refs.next(), refs.next()) {
            (Some(ref_sensor), None) => ref_sensor,
            (None, _) => {
                return Err(RigError::InvalidConfig(format!(
                    "rig {} has no reference sensor",
                    rig_id
                )))
            }
            (Some(_), Some(_)) => {
                return Err(RigError::InvalidConfig(format!(
                    "rig {} has more than one reference sensor",
                    rig_id
                )))
            }
        };
        if ref_sensor.sensor_from_rig.is_some() {
            return Err(RigError::InvalidConfig(format!(
                "reference sensor {} of rig {} must not have a sensor_from_rig",
                ref_sensor.sensor_id(),
                rig_id
            )));
        }
        if let Some(sensor) = self
            .sensors
            .iter()
            .find(|sensor| sensor.sensor_type == SensorType::Invalid)
        {
            return Err(RigError::InvalidConfig(format!(
                "sensor {} of rig {} has the invalid sensor type",
                sensor.sensor_id(),
                rig_id
            )));
        }

        let mut rig = Rig::with_rig_id(rig_id);
        rig.add_ref_sensor(ref_sensor.sensor_id())?;
        for sensor in self.sensors.iter().filter(|sensor| !sensor.ref_sensor) {
            let sensor_from_rig = sensor
                .sensor_from_rig
                .as_ref()
                .map(RigConfigPose::rigid)
                .transpose()?;
            rig.add_sensor(sensor.sensor_id(), sensor_from_rig)?;
        }
        Ok(rig)
    }
}

fn default_ref_sensor() -> bool {
    false
}

fn default_rotation() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

fn default_translation() -> [f64; 3] {
    [0.0, 0.0, 0.0]
}
