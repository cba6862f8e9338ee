use crate::{Result, Rig, RigError, RigId};
use log::*;
use sfm_core::{Rigid3d, SensorId};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Owns the rigs that frames refer to by [`RigId`].
#[derive(Debug, Clone, Default)]
pub struct RigRegistry {
    rigs: BTreeMap<RigId, Rig>,
}

impl RigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `rig` under its own id. The id must be valid and not yet taken.
    pub fn add_rig(&mut self, rig: Rig) -> Result<RigId> {
        let rig_id = rig.rig_id();
        if !rig_id.is_valid() {
            return Err(RigError::InvalidRigId);
        }
        if self.rigs.contains_key(&rig_id) {
            return Err(RigError::DuplicateRig { rig_id });
        }
        debug!("registered {}", rig);
        self.rigs.insert(rig_id, rig);
        Ok(rig_id)
    }

    /// Looks up a registered rig. [`RigId::INVALID`] is reported as [`RigError::InvalidRigId`]
    /// and any other missing id as [`RigError::UnknownRig`].
    pub fn rig(&self, rig_id: RigId) -> Result<&Rig> {
        if !rig_id.is_valid() {
            return Err(RigError::InvalidRigId);
        }
        self.rigs.get(&rig_id).ok_or(RigError::UnknownRig { rig_id })
    }

    /// Mutable access to the sensors and calibration of a registered rig.
    pub fn rig_mut(&mut self, rig_id: RigId) -> Result<RigMut<'_>> {
        if !rig_id.is_valid() {
            return Err(RigError::InvalidRigId);
        }
        self.rigs
            .get_mut(&rig_id)
            .map(|rig| RigMut { rig })
            .ok_or(RigError::UnknownRig { rig_id })
    }

    pub fn contains(&self, rig_id: RigId) -> bool {
        self.rigs.contains_key(&rig_id)
    }

    pub fn len(&self) -> usize {
        self.rigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rig> + '_ {
        self.rigs.values()
    }
}

/// A registered rig, borrowed mutably from a [`RigRegistry`].
///
/// Sensors can be added and calibrated, but the rig id stays the key it is registered under:
///
/// ```compile_fail
/// use sfm_rig::{Rig, RigId, RigRegistry};
/// let mut rigs = RigRegistry::new();
/// rigs.add_rig(Rig::with_rig_id(RigId(0))).unwrap();
/// rigs.rig_mut(RigId(0)).unwrap().set_rig_id(RigId(5));
/// ```
#[derive(Debug)]
pub struct RigMut<'a> {
    rig: &'a mut Rig,
}

impl RigMut<'_> {
    pub fn add_ref_sensor(&mut self, sensor_id: SensorId) -> Result<()> {
        self.rig.add_ref_sensor(sensor_id)
    }

    pub fn add_sensor(
        &mut self,
        sensor_id: SensorId,
        sensor_from_rig: Option<Rigid3d>,
    ) -> Result<()> {
        self.rig.add_sensor(sensor_id, sensor_from_rig)
    }

    pub fn set_sensor_from_rig(
        &mut self,
        sensor_id: SensorId,
        sensor_from_rig: Rigid3d,
    ) -> Result<()> {
        self.rig.set_sensor_from_rig(sensor_id, sensor_from_rig)
    }

    pub fn reset_sensor_from_rig(&mut self, sensor_id: SensorId) -> Result<()> {
        self.rig.reset_sensor_from_rig(sensor_id)
    }
}

impl Deref for RigMut<'_> {
    type Target = Rig;

    fn deref(&self) -> &Rig {
        self.rig
    }
}
