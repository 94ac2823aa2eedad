use std::collections::HashMap;

use crate::catalog::{CatalogIndex, CatalogSnapshot};
use crate::controller::ControllerKind;
use crate::measurement::DeviceMeasurement;
use crate::resolve::UnresolvedReason;

/// The unit a device measurement is displayed in.
///
/// A custom conversion wins over a rescale, which wins over the unit the
/// device declares. A conversion id that names no conversion yields
/// [`UnresolvedReason::MissingConversion`].
pub fn effective_unit<'a>(
    measurement: &'a DeviceMeasurement,
    index: &CatalogIndex<'a>,
) -> Result<&'a str, UnresolvedReason> {
    if let Some(conversion_id) = measurement.conversion_id() {
        return index
            .conversion(conversion_id)
            .map(|c| c.convert_unit_to.as_str())
            .ok_or_else(|| UnresolvedReason::MissingConversion {
                conversion_id: conversion_id.to_string(),
            });
    }
    if let Some(unit) = measurement.rescaled_unit() {
        return Ok(unit);
    }
    Ok(measurement.unit.as_str())
}

/// Per-controller unit overrides derived from device measurements.
///
/// Maps `controller id → measurement key → unit`, where the key is either the
/// device measurement's own id or its logical measurement name. Only input,
/// math and output controllers contribute. Built fresh for every resolution.
#[derive(Debug, Default)]
pub struct UseUnitIndex {
    units: HashMap<String, HashMap<String, String>>,
}

impl UseUnitIndex {
    /// Builds the index from a snapshot.
    ///
    /// When two measurements of one controller share a logical name, the
    /// first in snapshot order owns that name.
    #[must_use]
    pub fn build(snapshot: &CatalogSnapshot, index: &CatalogIndex<'_>) -> Self {
        let mut units: HashMap<String, HashMap<String, String>> = HashMap::new();

        for m in &snapshot.device_measurements {
            let Some(owner) = index.controller(m.device_id.as_str()) else {
                continue;
            };
            if owner.kind() == ControllerKind::Pid {
                continue;
            }

            let unit = match effective_unit(m, index) {
                Ok(unit) if !unit.is_empty() => unit,
                Ok(_) => continue,
                Err(reason) => {
                    tracing::debug!(
                        measurement_id = %m.unique_id,
                        controller_id = %m.device_id,
                        %reason,
                        "skipping unit override"
                    );
                    continue;
                }
            };

            let per_device = units.entry(m.device_id.to_string()).or_default();
            per_device
                .entry(m.unique_id.clone())
                .or_insert_with(|| unit.to_string());
            per_device
                .entry(m.measurement.clone())
                .or_insert_with(|| unit.to_string());
        }

        Self { units }
    }

    /// Override unit for `(controller_id, key)`.
    #[must_use]
    pub fn get(&self, controller_id: &str, key: &str) -> Option<&str> {
        self.units
            .get(controller_id)
            .and_then(|per_device| per_device.get(key))
            .map(String::as_str)
    }

    /// Number of controllers with at least one override.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no controller has an override.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
