//! Measurement references.
//!
//! Widgets store the measurements they plot as comma-delimited strings:
//!
//! ```text
//! <entity_id>[,<measurement_key>[,<unit_override>]]
//! ```
//!
//! A measurement key starting with `channel_` is a synthetic channel
//! identifier of the form `channel_<n>_<measurement>_<x>_<unit>[...]`; its
//! fifth underscore-delimited segment is the unit. References are decoded once
//! into [`MeasurementReference`] when they enter the system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::controller::ControllerId;
use crate::error::ValidationError;

/// Prefix that marks a synthetic channel identifier.
pub const SYNTHETIC_CHANNEL_MARKER: &str = "channel_";

/// Index of the unit segment within a synthetic channel identifier.
const CHANNEL_UNIT_SEGMENT: usize = 4;

const MAX_FIELDS: usize = 3;

/// A decoded measurement reference.
///
/// # Examples
///
/// ```
/// use dashaxis::MeasurementReference;
///
/// let r: MeasurementReference = "input123,temperature".parse().unwrap();
/// assert_eq!(r.entity_id.as_str(), "input123");
/// assert_eq!(r.measurement_key.as_deref(), Some("temperature"));
/// assert_eq!(r.field_count(), 2);
/// assert_eq!(r.to_string(), "input123,temperature");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeasurementReference {
    /// Controller the measurement belongs to.
    pub entity_id: ControllerId,

    /// Logical measurement name, device measurement id, or synthetic channel id.
    pub measurement_key: Option<String>,

    /// Explicit unit for measurements outside the dictionary.
    pub unit_override: Option<String>,

    /// Unit carried inside a synthetic channel identifier.
    pub channel_unit: Option<String>,
}

impl MeasurementReference {
    /// A reference to a whole controller.
    #[must_use]
    pub fn controller(entity_id: impl Into<ControllerId>) -> Self {
        Self {
            entity_id: entity_id.into(),
            measurement_key: None,
            unit_override: None,
            channel_unit: None,
        }
    }

    /// A reference to one measurement of a controller.
    #[must_use]
    pub fn measurement(entity_id: impl Into<ControllerId>, measurement_key: impl Into<String>) -> Self {
        let measurement_key = measurement_key.into();
        let channel_unit = synthetic_channel_unit(&measurement_key).map(str::to_string);
        Self {
            entity_id: entity_id.into(),
            measurement_key: Some(measurement_key),
            unit_override: None,
            channel_unit,
        }
    }

    /// Adds an explicit unit override.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_override = Some(unit.into());
        self
    }

    /// Number of comma-delimited fields in the encoded form.
    #[must_use]
    pub fn field_count(&self) -> usize {
        1 + usize::from(self.measurement_key.is_some()) + usize::from(self.unit_override.is_some())
    }

    /// Returns true if the measurement key is a synthetic channel identifier.
    #[must_use]
    pub fn is_synthetic_channel(&self) -> bool {
        self.measurement_key
            .as_deref()
            .is_some_and(|key| key.starts_with(SYNTHETIC_CHANNEL_MARKER))
    }
}

/// Extracts the unit segment from a synthetic channel identifier.
fn synthetic_channel_unit(key: &str) -> Option<&str> {
    if !key.starts_with(SYNTHETIC_CHANNEL_MARKER) {
        return None;
    }
    key.split('_').nth(CHANNEL_UNIT_SEGMENT)
}

impl FromStr for MeasurementReference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::EmptyReference);
        }

        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() > MAX_FIELDS {
            return Err(ValidationError::TooManyFields {
                reference: s.to_string(),
                count: fields.len(),
            });
        }
        if let Some(position) = fields.iter().position(|f| f.is_empty()) {
            return Err(ValidationError::EmptyField {
                reference: s.to_string(),
                position,
            });
        }

        let mut reference = match fields.get(1) {
            Some(key) => Self::measurement(fields[0], *key),
            None => Self::controller(fields[0]),
        };
        if let Some(unit) = fields.get(2) {
            reference = reference.with_unit(*unit);
        }
        Ok(reference)
    }
}

impl TryFrom<String> for MeasurementReference {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MeasurementReference> for String {
    fn from(r: MeasurementReference) -> Self {
        r.to_string()
    }
}

impl fmt::Display for MeasurementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity_id)?;
        if let Some(key) = &self.measurement_key {
            write!(f, ",{key}")?;
        }
        if let Some(unit) = &self.unit_override {
            write!(f, ",{unit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_counts() {
        let one: MeasurementReference = "abc".parse().unwrap();
        assert_eq!(one.field_count(), 1);
        assert!(one.measurement_key.is_none());

        let three: MeasurementReference = "abc,custom_key,widgets_per_hour".parse().unwrap();
        assert_eq!(three.field_count(), 3);
        assert_eq!(three.unit_override.as_deref(), Some("widgets_per_hour"));
        assert_eq!(three.to_string(), "abc,custom_key,widgets_per_hour");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(
            "".parse::<MeasurementReference>(),
            Err(ValidationError::EmptyReference)
        );
        assert!(matches!(
            "a,b,c,d".parse::<MeasurementReference>(),
            Err(ValidationError::TooManyFields { count: 4, .. })
        ));
        assert!(matches!(
            "a,,c".parse::<MeasurementReference>(),
            Err(ValidationError::EmptyField { position: 1, .. })
        ));
        assert!(matches!(
            ",temperature".parse::<MeasurementReference>(),
            Err(ValidationError::EmptyField { position: 0, .. })
        ));
    }

    #[test]
    fn synthetic_channel_unit_is_fifth_segment() {
        let r: MeasurementReference = "dev1,channel_0_temperature_sensor_C".parse().unwrap();
        assert!(r.is_synthetic_channel());
        assert_eq!(r.channel_unit.as_deref(), Some("C"));

        let r: MeasurementReference = "dev1,channel_2_flow_total_l_extra".parse().unwrap();
        assert_eq!(r.channel_unit.as_deref(), Some("l"));
    }

    #[test]
    fn short_synthetic_channel_has_no_unit() {
        let r: MeasurementReference = "dev1,channel_0_temperature".parse().unwrap();
        assert!(r.is_synthetic_channel());
        assert!(r.channel_unit.is_none());

        // A present but empty unit segment is kept.
        let r: MeasurementReference = "dev1,channel_0_a_b_".parse().unwrap();
        assert_eq!(r.channel_unit.as_deref(), Some(""));
    }

    #[test]
    fn ordinary_key_is_not_synthetic() {
        let r = MeasurementReference::measurement("dev1", "humidity_channel_1_2_3");
        assert!(!r.is_synthetic_channel());
        assert!(r.channel_unit.is_none());
    }

    #[test]
    fn serde_uses_string_form() {
        let r = MeasurementReference::measurement("pid-1", "setpoint");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"pid-1,setpoint\"");

        let back: MeasurementReference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);

        assert!(serde_json::from_str::<MeasurementReference>("\"a,b,c,d\"").is_err());
    }
}
