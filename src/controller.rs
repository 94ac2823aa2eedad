//! Controller records and identity.
//!
//! A controller is anything that produces or consumes measurements: an input
//! sensor, a derived math channel, an output actuator, or a PID loop. The
//! resolution engine only ever reads these records.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable controller identifier.
///
/// Controller ids travel inside comma-delimited measurement references, so
/// they are kept as opaque strings rather than parsed UUIDs.
///
/// # Examples
///
/// ```
/// use dashaxis::ControllerId;
///
/// let id = ControllerId::from("input123");
/// assert_eq!(id.as_str(), "input123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerId(String);

impl ControllerId {
    /// Creates a new random controller ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ControllerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ControllerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for ControllerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The collection a controller belongs to.
///
/// Variant order is the order the catalog snapshot lists collections in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Sensor input
    Input,
    /// Derived/math channel
    Math,
    /// Output actuator
    Output,
    /// PID control loop
    Pid,
}

impl ControllerKind {
    /// All kinds, in snapshot order.
    pub const ALL: [Self; 4] = [Self::Input, Self::Math, Self::Output, Self::Pid];

    /// Returns a short stable identifier suitable for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Math => "math",
            Self::Output => "output",
            Self::Pid => "pid",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A measurement another controller is attached to, e.g. the input a PID
/// loop regulates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamMeasurement<'a> {
    /// Id of the upstream controller.
    pub controller_id: &'a str,
    /// Measurement key (logical name or device measurement id).
    pub measurement_key: &'a str,
}

impl<'a> UpstreamMeasurement<'a> {
    /// Parses `"<controller_id>,<measurement_key>"`.
    ///
    /// Returns `None` unless both halves are present and non-empty.
    #[must_use]
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (controller_id, measurement_key) = raw.split_once(',')?;
        // Extra fields after the key are ignored.
        let measurement_key = measurement_key.split(',').next().unwrap_or_default();
        if controller_id.is_empty() || measurement_key.is_empty() {
            return None;
        }
        Some(Self {
            controller_id,
            measurement_key,
        })
    }
}

/// A sensor input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputController {
    /// Unique identifier
    pub unique_id: ControllerId,
    /// Display name
    pub name: String,
    /// Optional `"<id>,<key>"` pointer to a measurement this one derives from.
    #[serde(default)]
    pub measurement: Option<String>,
}

impl InputController {
    /// Creates an input with the given id.
    #[must_use]
    pub fn new(unique_id: impl Into<ControllerId>, name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            measurement: None,
        }
    }
}

/// A derived channel computed from other measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathController {
    /// Unique identifier
    pub unique_id: ControllerId,
    /// Display name
    pub name: String,
    /// Optional `"<id>,<key>"` pointer to a measurement this one derives from.
    #[serde(default)]
    pub measurement: Option<String>,
}

impl MathController {
    /// Creates a math controller with the given id.
    #[must_use]
    pub fn new(unique_id: impl Into<ControllerId>, name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            measurement: None,
        }
    }
}

/// An output actuator. Outputs declare their own unit and have no device
/// measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputController {
    /// Unique identifier
    pub unique_id: ControllerId,
    /// Display name
    pub name: String,
    /// Unit of the value the output reports (e.g. `second`, `percent`)
    pub unit: String,
}

impl OutputController {
    /// Creates an output with the given id and unit.
    #[must_use]
    pub fn new(
        unique_id: impl Into<ControllerId>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// A PID control loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidController {
    /// Unique identifier
    pub unique_id: ControllerId,
    /// Display name
    pub name: String,
    /// The regulated measurement, `"<input_id>,<measurement_key>"`.
    #[serde(default)]
    pub measurement: Option<String>,
}

impl PidController {
    /// Creates a PID loop regulating `measurement`.
    #[must_use]
    pub fn new(
        unique_id: impl Into<ControllerId>,
        name: impl Into<String>,
        measurement: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            measurement: Some(measurement.into()),
        }
    }
}

/// Any controller record in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerRecord {
    /// Sensor input
    Input(InputController),
    /// Math channel
    Math(MathController),
    /// Output actuator
    Output(OutputController),
    /// PID loop
    Pid(PidController),
}

impl ControllerRecord {
    /// Returns the record's unique id.
    #[must_use]
    pub fn unique_id(&self) -> &ControllerId {
        match self {
            Self::Input(c) => &c.unique_id,
            Self::Math(c) => &c.unique_id,
            Self::Output(c) => &c.unique_id,
            Self::Pid(c) => &c.unique_id,
        }
    }

    /// Returns the record's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Input(c) => &c.name,
            Self::Math(c) => &c.name,
            Self::Output(c) => &c.name,
            Self::Pid(c) => &c.name,
        }
    }

    /// Returns the collection this record belongs to.
    #[must_use]
    pub const fn kind(&self) -> ControllerKind {
        match self {
            Self::Input(_) => ControllerKind::Input,
            Self::Math(_) => ControllerKind::Math,
            Self::Output(_) => ControllerKind::Output,
            Self::Pid(_) => ControllerKind::Pid,
        }
    }

    /// Raw `measurement` field. Outputs have none.
    #[must_use]
    pub fn measurement(&self) -> Option<&str> {
        match self {
            Self::Input(c) => c.measurement.as_deref(),
            Self::Math(c) => c.measurement.as_deref(),
            Self::Pid(c) => c.measurement.as_deref(),
            Self::Output(_) => None,
        }
    }

    /// The measurement this controller is attached to, if its `measurement`
    /// field holds an `"<id>,<key>"` pointer.
    #[must_use]
    pub fn upstream(&self) -> Option<UpstreamMeasurement<'_>> {
        self.measurement().and_then(UpstreamMeasurement::parse)
    }

    /// Returns the output unit for output records.
    #[must_use]
    pub fn output_unit(&self) -> Option<&str> {
        match self {
            Self::Output(c) => Some(&c.unit),
            _ => None,
        }
    }
}

impl From<InputController> for ControllerRecord {
    fn from(c: InputController) -> Self {
        Self::Input(c)
    }
}

impl From<MathController> for ControllerRecord {
    fn from(c: MathController) -> Self {
        Self::Math(c)
    }
}

impl From<OutputController> for ControllerRecord {
    fn from(c: OutputController) -> Self {
        Self::Output(c)
    }
}

impl From<PidController> for ControllerRecord {
    fn from(c: PidController) -> Self {
        Self::Pid(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_id_new_is_unique() {
        let a = ControllerId::new();
        let b = ControllerId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_controller_id_serializes_as_plain_string() {
        let id = ControllerId::from("pid-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"pid-1\"");
    }

    #[test]
    fn test_upstream_parse() {
        let up = UpstreamMeasurement::parse("input123,temperature").unwrap();
        assert_eq!(up.controller_id, "input123");
        assert_eq!(up.measurement_key, "temperature");

        assert!(UpstreamMeasurement::parse("input123").is_none());
        assert!(UpstreamMeasurement::parse(",temperature").is_none());
        assert!(UpstreamMeasurement::parse("input123,").is_none());
    }

    #[test]
    fn test_record_accessors() {
        let pid: ControllerRecord = PidController::new("pid-1", "Heater", "input123,temperature").into();
        assert_eq!(pid.kind(), ControllerKind::Pid);
        assert_eq!(pid.unique_id().as_str(), "pid-1");
        assert_eq!(pid.upstream().unwrap().controller_id, "input123");
        assert!(pid.output_unit().is_none());

        let out: ControllerRecord = OutputController::new("out-1", "Pump", "second").into();
        assert_eq!(out.kind(), ControllerKind::Output);
        assert_eq!(out.output_unit(), Some("second"));
        assert!(out.measurement().is_none());
        assert!(out.upstream().is_none());
    }

    #[test]
    fn test_record_serde_tagged() {
        let rec: ControllerRecord = InputController::new("in-1", "DS18B20").into();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["kind"], "input");
        let back: ControllerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ControllerKind::Pid.to_string(), "pid");
        assert_eq!(ControllerKind::ALL.len(), 4);
    }
}
