use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of axis unit labels.
///
/// Labels keep the position of their first occurrence; comparison is exact
/// and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisSet(Vec<String>);

impl AxisSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` unless it is already present. Returns true if added.
    pub fn push(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    /// Returns true if `label` is present.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Consumes the set, returning the labels.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for AxisSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.push(label);
        }
        set
    }
}

impl IntoIterator for AxisSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Why a reference contributed no axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnresolvedReason {
    /// The reference string could not be decoded.
    Malformed {
        /// Decoder message.
        message: String,
    },

    /// The reference names only a controller.
    MissingMeasurementKey,

    /// No controller in any collection has the referenced id.
    UnknownController,

    /// A synthetic channel identifier without a unit segment.
    MalformedChannel,

    /// A device measurement points at a conversion that does not exist.
    MissingConversion {
        /// The dangling conversion id.
        conversion_id: String,
    },

    /// The resolved unit was empty.
    EmptyUnit,

    /// A setpoint reference on a controller with no upstream measurement.
    MissingUpstream,

    /// The upstream measurement belongs to no known input.
    UnknownUpstream {
        /// The upstream controller id.
        controller_id: String,
    },

    /// The measurement is not in the dictionary and carries no unit.
    UnknownMeasurement {
        /// The measurement key.
        key: String,
    },

    /// The unit override is already a permitted unit of a known measurement.
    RedundantUnitOverride {
        /// The override.
        unit: String,
    },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed reference: {message}"),
            Self::MissingMeasurementKey => write!(f, "no measurement key"),
            Self::UnknownController => write!(f, "unknown controller"),
            Self::MalformedChannel => write!(f, "channel identifier has no unit segment"),
            Self::MissingConversion { conversion_id } => {
                write!(f, "conversion {conversion_id} not found")
            }
            Self::EmptyUnit => write!(f, "empty unit"),
            Self::MissingUpstream => write!(f, "no upstream measurement"),
            Self::UnknownUpstream { controller_id } => {
                write!(f, "upstream input {controller_id} not found")
            }
            Self::UnknownMeasurement { key } => write!(f, "unknown measurement {key}"),
            Self::RedundantUnitOverride { unit } => {
                write!(f, "unit override {unit} is already permitted")
            }
        }
    }
}

/// A reference that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    /// The reference in its encoded form.
    pub reference: String,
    /// Why it produced no axis.
    pub reason: UnresolvedReason,
}

/// Axes plus diagnostics for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisResolution {
    /// The resolved axes.
    pub axes: AxisSet,

    /// References that contributed nothing, in input order.
    pub unresolved: Vec<UnresolvedReference>,

    /// Fingerprint of the catalog snapshot used.
    pub catalog_fingerprint: String,
}

impl AxisResolution {
    /// Returns true if every reference contributed an axis label.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_first_occurrence() {
        let mut set = AxisSet::new();
        assert!(set.push("C"));
        assert!(set.push("percent"));
        assert!(!set.push("C"));
        assert!(set.push("c"));
        assert_eq!(set.as_slice(), ["C", "percent", "c"]);
    }

    #[test]
    fn from_iter_dedups() {
        let set: AxisSet = ["a", "b", "a", "c", "b"].into_iter().collect();
        assert_eq!(set.into_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn serializes_as_list() {
        let set: AxisSet = ["C", "F"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["C","F"]"#);
    }

    #[test]
    fn reason_display() {
        let reason = UnresolvedReason::MissingConversion {
            conversion_id: "conv-9".to_string(),
        };
        assert_eq!(reason.to_string(), "conversion conv-9 not found");
    }
}
