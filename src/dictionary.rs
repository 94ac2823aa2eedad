//! The measurement dictionary.
//!
//! Maps logical measurement names to the unit their axis is labelled with and
//! the units a reference may legitimately name for them. The dictionary is
//! loaded once at startup and injected into the engine; nothing here is
//! process-global.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

/// Dictionary entry for one logical measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMeasurementInfo")]
pub struct MeasurementInfo {
    /// Axis label used when nothing more specific applies.
    pub display_unit: String,

    /// Units a measurement of this kind may be recorded in.
    #[serde(default, rename = "units")]
    pub permitted_units: BTreeSet<String>,
}

impl MeasurementInfo {
    /// Creates an entry. The display unit is always permitted.
    #[must_use]
    pub fn new<I, S>(display_unit: impl Into<String>, permitted_units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let display_unit = display_unit.into();
        let mut permitted_units: BTreeSet<String> =
            permitted_units.into_iter().map(Into::into).collect();
        permitted_units.insert(display_unit.clone());
        Self {
            display_unit,
            permitted_units,
        }
    }

    /// Returns true if `unit` is one of the permitted units.
    #[must_use]
    pub fn permits(&self, unit: &str) -> bool {
        self.permitted_units.contains(unit)
    }
}

// Loaded entries go through `MeasurementInfo::new` so the display unit is
// permitted no matter how the entry was built.
#[derive(Deserialize)]
struct RawMeasurementInfo {
    display_unit: String,
    #[serde(default)]
    units: BTreeSet<String>,
}

impl From<RawMeasurementInfo> for MeasurementInfo {
    fn from(raw: RawMeasurementInfo) -> Self {
        Self::new(raw.display_unit, raw.units)
    }
}

/// Read-only table of known measurements.
///
/// # Examples
///
/// ```
/// use dashaxis::MeasurementDictionary;
///
/// let dict = MeasurementDictionary::builtin();
/// assert_eq!(dict.display_unit("temperature"), Some("C"));
/// assert!(dict.permits("temperature", "F"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementDictionary {
    entries: BTreeMap<String, MeasurementInfo>,
}

impl MeasurementDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The dictionary of common controller measurements.
    #[must_use]
    pub fn builtin() -> Self {
        const BUILTIN: &[(&str, &str, &[&str])] = &[
            ("acceleration_x", "g_force", &["g_force", "m_s_s"]),
            ("altitude", "m", &["m", "ft"]),
            ("battery", "percent", &["percent", "V"]),
            ("boolean", "bool", &["bool"]),
            ("co2", "ppm", &["ppm", "ppb"]),
            ("cpu_load_1m", "cpu_load", &["cpu_load"]),
            ("current", "A", &["A", "mA"]),
            ("dewpoint", "C", &["C", "F", "K"]),
            ("disk_space", "MB", &["MB", "GB"]),
            ("distance", "cm", &["cm", "m", "mm", "in", "ft"]),
            ("duration_time", "second", &["second", "minute", "hour"]),
            ("duty_cycle", "percent", &["percent", "decimal"]),
            ("electrical_conductivity", "uS_cm", &["uS_cm", "mS_cm"]),
            ("electrical_potential", "V", &["V", "mV"]),
            ("humidity", "percent", &["percent", "decimal"]),
            ("ion_concentration", "pH", &["pH"]),
            ("light", "lux", &["lux", "full", "ir"]),
            ("moisture", "percent", &["percent"]),
            ("oxidation_reduction_potential", "mV", &["mV", "V"]),
            ("pressure", "Pa", &["Pa", "kPa", "psi", "bar"]),
            ("rpm", "rpm", &["rpm"]),
            ("speed", "m_s", &["m_s", "km_h", "mph"]),
            ("temperature", "C", &["C", "F", "K"]),
            ("vapor_pressure_deficit", "Pa", &["Pa", "kPa"]),
            ("volume", "l", &["l", "ml", "gal"]),
            ("weight", "kg", &["kg", "g", "lb"]),
        ];

        let entries = BUILTIN
            .iter()
            .map(|(key, display, units)| {
                ((*key).to_string(), MeasurementInfo::new(*display, units.iter().copied()))
            })
            .collect();
        Self { entries }
    }

    /// Parses a dictionary from JSON.
    ///
    /// Shape: `{ "<key>": { "display_unit": "...", "units": ["..."] } }`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let dict: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        dict.validate().map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        tracing::debug!(entries = dict.len(), "loaded measurement dictionary");
        Ok(dict)
    }

    /// Reads and parses a JSON dictionary file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Adds or replaces an entry.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        info: MeasurementInfo,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        validate_entry(&key, &info)?;
        let info = MeasurementInfo::new(info.display_unit, info.permitted_units);
        self.entries.insert(key, info);
        Ok(())
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MeasurementInfo> {
        self.entries.get(key)
    }

    /// Returns true if `key` is a known measurement.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Display unit for `key`.
    #[must_use]
    pub fn display_unit(&self, key: &str) -> Option<&str> {
        self.get(key).map(|info| info.display_unit.as_str())
    }

    /// Returns true if `key` is known and permits `unit`.
    #[must_use]
    pub fn permits(&self, key: &str, unit: &str) -> bool {
        self.get(key).is_some_and(|info| info.permits(unit))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasurementInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (key, info) in &self.entries {
            validate_entry(key, info)?;
        }
        Ok(())
    }
}

fn validate_entry(key: &str, info: &MeasurementInfo) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::InvalidDictionaryEntry {
            key: key.to_string(),
            reason: "measurement key cannot be empty".to_string(),
        });
    }
    if info.display_unit.is_empty() {
        return Err(ValidationError::InvalidDictionaryEntry {
            key: key.to_string(),
            reason: "display unit cannot be empty".to_string(),
        });
    }
    Ok(())
}
