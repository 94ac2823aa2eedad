use crate::catalog::{CatalogIndex, CatalogSnapshot};
use crate::controller::{ControllerKind, ControllerRecord};
use crate::dictionary::MeasurementDictionary;
use crate::reference::MeasurementReference;
use crate::resolve::use_unit::{effective_unit, UseUnitIndex};
use crate::resolve::{AxisResolution, AxisSet, UnresolvedReason, UnresolvedReference};

/// Axis label of `duration_time` measurements.
pub const DURATION_TIME_UNIT: &str = "second";

/// Axis label of `duty_cycle` measurements.
pub const DUTY_CYCLE_UNIT: &str = "percent";

/// Measurement keys that take the unit of the measurement a PID regulates.
pub const SETPOINT_KEYS: [&str; 3] = ["setpoint", "setpoint_band_min", "setpoint_band_max"];

/// Resolves measurement references to axis units against one catalog
/// snapshot.
///
/// Building a resolver indexes the snapshot once; every reference then costs
/// a handful of hash lookups. The resolver borrows everything and never
/// mutates, so one snapshot can back many resolvers across threads.
///
/// # Precedence
///
/// For each reference the first matching rule wins:
///
/// 1. A two-field reference to an output yields the output's unit.
/// 2. A synthetic `channel_` key yields the unit embedded in it.
/// 3. A two-field reference whose key is a device measurement id yields that
///    measurement's conversion target, else its rescaled unit, else its unit.
/// 4. Otherwise the key decides: `duration_time` and `duty_cycle` have fixed
///    units; a controller unit override comes next; setpoints follow the
///    regulated input; dictionary measurements use their display unit; and
///    anything else with a unit override becomes `<key>_<unit>`.
#[derive(Debug)]
pub struct AxisResolver<'a> {
    dictionary: &'a MeasurementDictionary,
    snapshot: &'a CatalogSnapshot,
    index: CatalogIndex<'a>,
    use_unit: UseUnitIndex,
    drop_empty_units: bool,
    warn_on_unresolved: bool,
}

impl<'a> AxisResolver<'a> {
    /// Creates a resolver over `snapshot`.
    #[must_use]
    pub fn new(dictionary: &'a MeasurementDictionary, snapshot: &'a CatalogSnapshot) -> Self {
        let index = snapshot.index();
        let use_unit = UseUnitIndex::build(snapshot, &index);
        Self {
            dictionary,
            snapshot,
            index,
            use_unit,
            drop_empty_units: false,
            warn_on_unresolved: false,
        }
    }

    /// Drop empty unit labels instead of emitting them.
    #[must_use]
    pub fn drop_empty_units(mut self, drop: bool) -> Self {
        self.drop_empty_units = drop;
        self
    }

    /// Log dropped references at `warn` instead of `debug`.
    #[must_use]
    pub fn warn_on_unresolved(mut self, warn: bool) -> Self {
        self.warn_on_unresolved = warn;
        self
    }

    /// Resolves a list of references to axis units.
    #[must_use]
    pub fn axes(&self, references: &[MeasurementReference]) -> AxisSet {
        let mut axes = AxisSet::new();
        for reference in references {
            match self.resolve_reference(reference) {
                Ok(label) => {
                    axes.push(label);
                }
                Err(reason) => self.log_unresolved(&reference.to_string(), &reason),
            }
        }
        axes
    }

    /// Resolves a list of references, recording why any were dropped.
    #[must_use]
    pub fn resolve(&self, references: &[MeasurementReference]) -> AxisResolution {
        let mut resolution = self.empty_resolution();
        for reference in references {
            self.apply(reference, &mut resolution);
        }
        resolution
    }

    /// Decodes and resolves raw reference strings.
    ///
    /// Strings that fail to decode are reported as
    /// [`UnresolvedReason::Malformed`].
    #[must_use]
    pub fn resolve_raw<S: AsRef<str>>(&self, raw: &[S]) -> AxisResolution {
        let mut resolution = self.empty_resolution();
        for s in raw {
            let s = s.as_ref();
            match s.parse::<MeasurementReference>() {
                Ok(reference) => self.apply(&reference, &mut resolution),
                Err(e) => self.record(
                    &mut resolution,
                    s.to_string(),
                    UnresolvedReason::Malformed {
                        message: e.to_string(),
                    },
                ),
            }
        }
        resolution
    }

    /// Resolves a single reference to its axis label.
    pub fn resolve_reference(
        &self,
        reference: &MeasurementReference,
    ) -> Result<String, UnresolvedReason> {
        let Some(key) = reference.measurement_key.as_deref() else {
            return Err(UnresolvedReason::MissingMeasurementKey);
        };
        let controller = self.index.controller(reference.entity_id.as_str());
        let two_fields = reference.field_count() == 2;

        if two_fields {
            if let Some(unit) = controller.and_then(ControllerRecord::output_unit) {
                return self.label(unit);
            }
        }

        if reference.is_synthetic_channel() {
            return reference
                .channel_unit
                .as_deref()
                .ok_or(UnresolvedReason::MalformedChannel)
                .and_then(|unit| self.label(unit));
        }

        let Some(controller) = controller else {
            return Err(UnresolvedReason::UnknownController);
        };

        if two_fields {
            if let Some(measurement) = self.index.measurement(key) {
                let unit = effective_unit(measurement, &self.index)?;
                return self.label(unit);
            }
        }

        self.dispatch_key(controller, key, reference.unit_override.as_deref())
    }

    fn dispatch_key(
        &self,
        controller: &ControllerRecord,
        key: &str,
        unit_override: Option<&str>,
    ) -> Result<String, UnresolvedReason> {
        match key {
            "duration_time" => return self.label(DURATION_TIME_UNIT),
            "duty_cycle" => return self.label(DUTY_CYCLE_UNIT),
            _ => {}
        }

        if let Some(unit) = self.use_unit.get(controller.unique_id().as_str(), key) {
            return self.label(unit);
        }

        if SETPOINT_KEYS.contains(&key) {
            return self.setpoint_unit(controller);
        }

        match (self.dictionary.get(key), unit_override) {
            (Some(info), None) => self.label(&info.display_unit),
            (Some(info), Some(unit)) if info.permits(unit) => {
                Err(UnresolvedReason::RedundantUnitOverride {
                    unit: unit.to_string(),
                })
            }
            (_, Some(unit)) => self.label(&format!("{key}_{unit}")),
            (None, None) => Err(UnresolvedReason::UnknownMeasurement {
                key: key.to_string(),
            }),
        }
    }

    // Setpoints and bands are drawn on the axis of the input the loop regulates.
    fn setpoint_unit(&self, controller: &ControllerRecord) -> Result<String, UnresolvedReason> {
        let upstream = controller.upstream().ok_or(UnresolvedReason::MissingUpstream)?;
        let input = self
            .index
            .controller_of_kind(upstream.controller_id, ControllerKind::Input)
            .ok_or_else(|| UnresolvedReason::UnknownUpstream {
                controller_id: upstream.controller_id.to_string(),
            })?;

        if let Some(unit) = self
            .use_unit
            .get(input.unique_id().as_str(), upstream.measurement_key)
        {
            return self.label(unit);
        }

        self.dictionary
            .display_unit(upstream.measurement_key)
            .ok_or_else(|| UnresolvedReason::UnknownMeasurement {
                key: upstream.measurement_key.to_string(),
            })
            .and_then(|unit| self.label(unit))
    }

    fn label(&self, unit: &str) -> Result<String, UnresolvedReason> {
        if unit.is_empty() && self.drop_empty_units {
            return Err(UnresolvedReason::EmptyUnit);
        }
        Ok(unit.to_string())
    }

    fn apply(&self, reference: &MeasurementReference, resolution: &mut AxisResolution) {
        match self.resolve_reference(reference) {
            Ok(label) => {
                resolution.axes.push(label);
            }
            Err(reason) => self.record(resolution, reference.to_string(), reason),
        }
    }

    fn empty_resolution(&self) -> AxisResolution {
        AxisResolution {
            axes: AxisSet::new(),
            unresolved: Vec::new(),
            catalog_fingerprint: self.snapshot.fingerprint(),
        }
    }

    fn record(&self, resolution: &mut AxisResolution, reference: String, reason: UnresolvedReason) {
        self.log_unresolved(&reference, &reason);
        resolution
            .unresolved
            .push(UnresolvedReference { reference, reason });
    }

    fn log_unresolved(&self, reference: &str, reason: &UnresolvedReason) {
        if self.warn_on_unresolved {
            tracing::warn!(reference, %reason, "measurement reference contributes no axis");
        } else {
            tracing::debug!(reference, %reason, "measurement reference contributes no axis");
        }
    }
}

/// Resolves `references` against `snapshot` in one call.
///
/// # Examples
///
/// ```
/// use dashaxis::{resolve_axes, CatalogSnapshot, MeasurementDictionary};
///
/// let dict = MeasurementDictionary::builtin();
/// let axes = resolve_axes(&dict, &CatalogSnapshot::default(), &[]);
/// assert!(axes.is_empty());
/// ```
#[must_use]
pub fn resolve_axes(
    dictionary: &MeasurementDictionary,
    snapshot: &CatalogSnapshot,
    references: &[MeasurementReference],
) -> AxisSet {
    if references.is_empty() {
        return AxisSet::new();
    }
    AxisResolver::new(dictionary, snapshot).axes(references)
}
