//! Device measurement and conversion records.

use serde::{Deserialize, Serialize};

use crate::controller::ControllerId;

/// A measurement channel declared by a controller.
///
/// # Examples
///
/// ```
/// use dashaxis::DeviceMeasurement;
///
/// let m = DeviceMeasurement::new("meas-1", "input123", "temperature", "C")
///     .with_rescale("level", "cm");
/// assert_eq!(m.rescaled_unit(), Some("cm"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeasurement {
    /// Unique identifier of this measurement record
    pub unique_id: String,

    /// Owning controller
    pub device_id: ControllerId,

    /// Logical measurement name (e.g. `temperature`)
    pub measurement: String,

    /// Unit the device reports in
    pub unit: String,

    /// Hardware channel on multi-channel devices
    #[serde(default)]
    pub channel: Option<u32>,

    /// Custom conversion applied before display
    #[serde(default)]
    pub conversion_id: Option<String>,

    /// Measurement name after rescaling
    #[serde(default)]
    pub rescaled_measurement: Option<String>,

    /// Unit after rescaling; used only together with `rescaled_measurement`
    #[serde(default)]
    pub rescaled_unit: Option<String>,
}

impl DeviceMeasurement {
    /// Creates a plain measurement with no conversion or rescale.
    #[must_use]
    pub fn new(
        unique_id: impl Into<String>,
        device_id: impl Into<ControllerId>,
        measurement: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            device_id: device_id.into(),
            measurement: measurement.into(),
            unit: unit.into(),
            channel: None,
            conversion_id: None,
            rescaled_measurement: None,
            rescaled_unit: None,
        }
    }

    /// Sets the channel number.
    #[must_use]
    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Attaches a conversion.
    #[must_use]
    pub fn with_conversion(mut self, conversion_id: impl Into<String>) -> Self {
        self.conversion_id = Some(conversion_id.into());
        self
    }

    /// Rescales the measurement to a new name and unit.
    #[must_use]
    pub fn with_rescale(mut self, measurement: impl Into<String>, unit: impl Into<String>) -> Self {
        self.rescaled_measurement = Some(measurement.into());
        self.rescaled_unit = Some(unit.into());
        self
    }

    /// The rescaled unit, only when both rescale fields are set and non-empty.
    #[must_use]
    pub fn rescaled_unit(&self) -> Option<&str> {
        match (self.rescaled_measurement.as_deref(), self.rescaled_unit.as_deref()) {
            (Some(m), Some(u)) if !m.is_empty() && !u.is_empty() => Some(u),
            _ => None,
        }
    }

    /// The conversion id, ignoring empty strings.
    #[must_use]
    pub fn conversion_id(&self) -> Option<&str> {
        self.conversion_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A custom unit conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique identifier
    pub unique_id: String,
    /// Source unit
    pub convert_unit_from: String,
    /// Target unit shown on the axis
    pub convert_unit_to: String,
    /// Conversion expression. Never evaluated here.
    #[serde(default)]
    pub equation: Option<String>,
}

impl Conversion {
    /// Creates a conversion between two units.
    #[must_use]
    pub fn new(
        unique_id: impl Into<String>,
        convert_unit_from: impl Into<String>,
        convert_unit_to: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            convert_unit_from: convert_unit_from.into(),
            convert_unit_to: convert_unit_to.into(),
            equation: None,
        }
    }

    /// Sets the conversion expression.
    #[must_use]
    pub fn with_equation(mut self, equation: impl Into<String>) -> Self {
        self.equation = Some(equation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescaled_unit_requires_both_fields() {
        let mut m = DeviceMeasurement::new("m1", "in1", "distance", "m");
        assert_eq!(m.rescaled_unit(), None);

        m.rescaled_unit = Some("cm".to_string());
        assert_eq!(m.rescaled_unit(), None);

        m.rescaled_measurement = Some("length".to_string());
        assert_eq!(m.rescaled_unit(), Some("cm"));

        m.rescaled_measurement = Some(String::new());
        assert_eq!(m.rescaled_unit(), None);
    }

    #[test]
    fn empty_conversion_id_is_ignored() {
        let m = DeviceMeasurement::new("m1", "in1", "temperature", "C").with_conversion("");
        assert_eq!(m.conversion_id(), None);

        let m = m.with_conversion("conv-1");
        assert_eq!(m.conversion_id(), Some("conv-1"));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let json = r#"{"unique_id":"m1","device_id":"in1","measurement":"temperature","unit":"C"}"#;
        let m: DeviceMeasurement = serde_json::from_str(json).unwrap();
        assert_eq!(m, DeviceMeasurement::new("m1", "in1", "temperature", "C"));
    }
}
