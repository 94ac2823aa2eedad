//! Axis engine.
//!
//! Ties the resolver to its collaborators: a metadata catalog that supplies
//! the controller snapshot, a widget store that supplies measurement
//! references, and the measurement dictionary. Each call takes exactly one
//! catalog snapshot, so a resolution never mixes two catalog states.

mod config;

pub use config::AxisEngineConfig;

use std::sync::Arc;

use crate::catalog::CatalogSnapshot;
use crate::dashboard::{DashboardId, WidgetId};
use crate::dictionary::MeasurementDictionary;
use crate::error::AxisResult;
use crate::reference::MeasurementReference;
use crate::resolve::{AxisResolution, AxisResolver, AxisSet};
use crate::storage::{MetadataCatalog, StorageError, WidgetStore};

/// Axis resolution engine.
#[derive(Clone)]
pub struct AxisEngine {
    catalog: Arc<dyn MetadataCatalog>,
    widgets: Arc<dyn WidgetStore>,
    dictionary: Arc<MeasurementDictionary>,
    config: AxisEngineConfig,
}

impl AxisEngine {
    /// Create a new engine with the default configuration.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn MetadataCatalog>,
        widgets: Arc<dyn WidgetStore>,
        dictionary: Arc<MeasurementDictionary>,
    ) -> Self {
        Self::with_config(catalog, widgets, dictionary, AxisEngineConfig::default())
    }

    /// Create a new engine with an explicit configuration.
    #[must_use]
    pub fn with_config(
        catalog: Arc<dyn MetadataCatalog>,
        widgets: Arc<dyn WidgetStore>,
        dictionary: Arc<MeasurementDictionary>,
        config: AxisEngineConfig,
    ) -> Self {
        Self {
            catalog,
            widgets,
            dictionary,
            config,
        }
    }

    /// Get a reference to the metadata catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn MetadataCatalog> {
        &self.catalog
    }

    /// Get a reference to the widget store.
    #[must_use]
    pub fn widget_store(&self) -> &Arc<dyn WidgetStore> {
        &self.widgets
    }

    /// Get a reference to the measurement dictionary.
    #[must_use]
    pub fn dictionary(&self) -> &MeasurementDictionary {
        &self.dictionary
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &AxisEngineConfig {
        &self.config
    }

    /// Resolves measurement references to the ordered list of axis units.
    ///
    /// References that cannot be resolved are omitted; only a failing
    /// catalog read is an error.
    pub fn resolve_axes(&self, references: &[MeasurementReference]) -> AxisResult<AxisSet> {
        if references.is_empty() {
            return Ok(AxisSet::new());
        }
        let snapshot = self.catalog.snapshot()?;
        Ok(self.resolver(&snapshot).axes(references))
    }

    /// Like [`resolve_axes`](Self::resolve_axes), but also reports which
    /// references were dropped and why.
    pub fn resolve_detailed(
        &self,
        references: &[MeasurementReference],
    ) -> AxisResult<AxisResolution> {
        let snapshot = self.catalog.snapshot()?;
        Ok(self.resolver(&snapshot).resolve(references))
    }

    /// Decodes and resolves raw reference strings.
    pub fn resolve_raw<S: AsRef<str>>(&self, raw: &[S]) -> AxisResult<AxisResolution> {
        let snapshot = self.catalog.snapshot()?;
        Ok(self.resolver(&snapshot).resolve_raw(raw))
    }

    /// Resolves the axes of a stored widget.
    pub fn widget_axes(&self, id: WidgetId) -> AxisResult<AxisSet> {
        let references = self.widgets.measurement_references(id)?;
        self.resolve_axes(&references)
    }

    /// Resolves the axes of every widget on a dashboard that plots
    /// measurements, in widget order.
    pub fn dashboard_axes(&self, id: DashboardId) -> AxisResult<Vec<(WidgetId, AxisSet)>> {
        if self.widgets.get_dashboard(id)?.is_none() {
            return Err(StorageError::DashboardNotFound(id).into());
        }
        let widgets: Vec<_> = self
            .widgets
            .widgets_for_dashboard(id)?
            .into_iter()
            .filter(|w| !w.measurements.is_empty())
            .collect();
        if widgets.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.catalog.snapshot()?;
        let resolver = self.resolver(&snapshot);
        let axes = widgets
            .into_iter()
            .map(|w| (w.unique_id, resolver.axes(&w.measurements)))
            .collect();
        Ok(axes)
    }

    fn resolver<'a>(&'a self, snapshot: &'a CatalogSnapshot) -> AxisResolver<'a> {
        AxisResolver::new(&self.dictionary, snapshot)
            .drop_empty_units(self.config.drop_empty_units)
            .warn_on_unresolved(self.config.warn_on_unresolved)
    }
}
