//! Catalog snapshots.
//!
//! A [`CatalogSnapshot`] is everything the resolution engine reads, fetched
//! once per call. [`CatalogIndex`] indexes it by identity so each reference
//! resolves through a single lookup per record kind.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::controller::{
    ControllerKind, ControllerRecord, InputController, MathController, OutputController,
    PidController,
};
use crate::measurement::{Conversion, DeviceMeasurement};

/// Point-in-time copy of the metadata catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Controllers in kind order (inputs, maths, outputs, PIDs), each kind in
    /// catalog order.
    pub controllers: Vec<ControllerRecord>,
    /// Device measurements of inputs and maths.
    pub device_measurements: Vec<DeviceMeasurement>,
    /// Unit conversions referenced by device measurements.
    pub conversions: Vec<Conversion>,
}

impl CatalogSnapshot {
    /// Assembles a snapshot from per-kind collections.
    #[must_use]
    pub fn from_parts(
        inputs: Vec<InputController>,
        maths: Vec<MathController>,
        outputs: Vec<OutputController>,
        pids: Vec<PidController>,
        device_measurements: Vec<DeviceMeasurement>,
        conversions: Vec<Conversion>,
    ) -> Self {
        let mut controllers =
            Vec::with_capacity(inputs.len() + maths.len() + outputs.len() + pids.len());
        controllers.extend(inputs.into_iter().map(ControllerRecord::Input));
        controllers.extend(maths.into_iter().map(ControllerRecord::Math));
        controllers.extend(outputs.into_iter().map(ControllerRecord::Output));
        controllers.extend(pids.into_iter().map(ControllerRecord::Pid));
        Self {
            controllers,
            device_measurements,
            conversions,
        }
    }

    /// Returns true if the snapshot holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
            && self.device_measurements.is_empty()
            && self.conversions.is_empty()
    }

    /// Stable content fingerprint (hex `blake3`).
    ///
    /// Equal snapshots always produce equal fingerprints, so callers can key
    /// caches of resolved axes on it.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for controller in &self.controllers {
            hash_field(&mut hasher, controller.kind().name());
            hash_field(&mut hasher, controller.unique_id().as_str());
            hash_field(&mut hasher, controller.measurement().unwrap_or_default());
            hash_field(&mut hasher, controller.output_unit().unwrap_or_default());
        }
        hasher.update(b"\x1e");
        for m in &self.device_measurements {
            hash_field(&mut hasher, &m.unique_id);
            hash_field(&mut hasher, m.device_id.as_str());
            hash_field(&mut hasher, &m.measurement);
            hash_field(&mut hasher, &m.unit);
            hash_field(&mut hasher, m.conversion_id.as_deref().unwrap_or_default());
            hash_field(&mut hasher, m.rescaled_measurement.as_deref().unwrap_or_default());
            hash_field(&mut hasher, m.rescaled_unit.as_deref().unwrap_or_default());
        }
        hasher.update(b"\x1e");
        for c in &self.conversions {
            hash_field(&mut hasher, &c.unique_id);
            hash_field(&mut hasher, &c.convert_unit_to);
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Builds the identity index over this snapshot.
    #[must_use]
    pub fn index(&self) -> CatalogIndex<'_> {
        CatalogIndex::new(self)
    }
}

// Length-prefixed so adjacent fields cannot run together.
fn hash_field(hasher: &mut blake3::Hasher, field: &str) {
    hasher.update(&(field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

/// Identity index over a [`CatalogSnapshot`].
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    controllers: HashMap<&'a str, &'a ControllerRecord>,
    measurements: HashMap<&'a str, &'a DeviceMeasurement>,
    conversions: HashMap<&'a str, &'a Conversion>,
}

impl<'a> CatalogIndex<'a> {
    /// Indexes `snapshot`.
    ///
    /// Ids are unique per collection. When the same id appears twice, the
    /// first record in snapshot order is kept.
    #[must_use]
    pub fn new(snapshot: &'a CatalogSnapshot) -> Self {
        let mut controllers: HashMap<&'a str, &'a ControllerRecord> =
            HashMap::with_capacity(snapshot.controllers.len());
        for record in &snapshot.controllers {
            let id = record.unique_id().as_str();
            if let Some(existing) = controllers.get(id) {
                tracing::warn!(
                    controller_id = id,
                    kept = %existing.kind(),
                    ignored = %record.kind(),
                    "duplicate controller id in catalog"
                );
                continue;
            }
            controllers.insert(id, record);
        }

        let mut measurements: HashMap<&'a str, &'a DeviceMeasurement> =
            HashMap::with_capacity(snapshot.device_measurements.len());
        for m in &snapshot.device_measurements {
            measurements.entry(m.unique_id.as_str()).or_insert(m);
        }

        let mut conversions: HashMap<&'a str, &'a Conversion> =
            HashMap::with_capacity(snapshot.conversions.len());
        for c in &snapshot.conversions {
            conversions.entry(c.unique_id.as_str()).or_insert(c);
        }

        Self {
            controllers,
            measurements,
            conversions,
        }
    }

    /// Finds a controller of any kind.
    #[must_use]
    pub fn controller(&self, id: &str) -> Option<&'a ControllerRecord> {
        self.controllers.get(id).copied()
    }

    /// Finds a controller of a specific kind.
    #[must_use]
    pub fn controller_of_kind(&self, id: &str, kind: ControllerKind) -> Option<&'a ControllerRecord> {
        self.controller(id).filter(|c| c.kind() == kind)
    }

    /// Finds a device measurement by its own id.
    #[must_use]
    pub fn measurement(&self, id: &str) -> Option<&'a DeviceMeasurement> {
        self.measurements.get(id).copied()
    }

    /// Finds a conversion by id.
    #[must_use]
    pub fn conversion(&self, id: &str) -> Option<&'a Conversion> {
        self.conversions.get(id).copied()
    }

    /// Number of indexed controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }
}
