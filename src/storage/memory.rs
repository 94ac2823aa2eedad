//! In-memory storage backend.
//!
//! Thread-safe in-memory implementations of the storage traits. Intended for
//! embedded usage, tests, and as a reference implementation.

use std::sync::RwLock;

use crate::catalog::CatalogSnapshot;
use crate::controller::{
    ControllerId, InputController, MathController, OutputController, PidController,
};
use crate::dashboard::{Dashboard, DashboardId, Widget, WidgetId};
use crate::error::ValidationError;
use crate::measurement::{Conversion, DeviceMeasurement};
use crate::storage::traits::{MetadataCatalog, StorageError, WidgetStore};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

fn push_unique<T>(
    items: &mut Vec<T>,
    item: T,
    id_of: impl Fn(&T) -> &str,
) -> Result<(), StorageError> {
    let id = id_of(&item);
    if items.iter().any(|existing| id_of(existing) == id) {
        return Err(StorageError::DuplicateKey(id.to_string()));
    }
    items.push(item);
    Ok(())
}

#[derive(Debug, Default)]
struct CatalogState {
    inputs: Vec<InputController>,
    maths: Vec<MathController>,
    outputs: Vec<OutputController>,
    pids: Vec<PidController>,
    device_measurements: Vec<DeviceMeasurement>,
    conversions: Vec<Conversion>,
}

/// In-memory metadata catalog.
///
/// Ids are unique within each collection. Nothing stops the same id from
/// being used in two collections; the engine resolves that deterministically.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input controller.
    pub fn insert_input(&self, input: InputController) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.insert_input"))?;
        push_unique(&mut state.inputs, input, |c| c.unique_id.as_str())
    }

    /// Adds a math controller.
    pub fn insert_math(&self, math: MathController) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.insert_math"))?;
        push_unique(&mut state.maths, math, |c| c.unique_id.as_str())
    }

    /// Adds an output controller.
    pub fn insert_output(&self, output: OutputController) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.insert_output"))?;
        push_unique(&mut state.outputs, output, |c| c.unique_id.as_str())
    }

    /// Adds a PID controller.
    pub fn insert_pid(&self, pid: PidController) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.insert_pid"))?;
        push_unique(&mut state.pids, pid, |c| c.unique_id.as_str())
    }

    /// Adds a device measurement.
    pub fn insert_device_measurement(
        &self,
        measurement: DeviceMeasurement,
    ) -> Result<(), StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("catalog.insert_device_measurement"))?;
        push_unique(&mut state.device_measurements, measurement, |m| m.unique_id.as_str())
    }

    /// Adds a conversion.
    pub fn insert_conversion(&self, conversion: Conversion) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.insert_conversion"))?;
        push_unique(&mut state.conversions, conversion, |c| c.unique_id.as_str())
    }

    /// Replaces an existing device measurement, e.g. to attach a conversion.
    pub fn update_device_measurement(
        &self,
        measurement: DeviceMeasurement,
    ) -> Result<(), StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("catalog.update_device_measurement"))?;
        let slot = state
            .device_measurements
            .iter_mut()
            .find(|m| m.unique_id == measurement.unique_id)
            .ok_or_else(|| {
                StorageError::BackendError(format!(
                    "device measurement not found: {}",
                    measurement.unique_id
                ))
            })?;
        *slot = measurement;
        Ok(())
    }

    /// Removes a controller from every collection along with its device
    /// measurements. Returns true if anything was removed.
    pub fn remove_controller(&self, id: &ControllerId) -> Result<bool, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("catalog.remove_controller"))?;
        let before = state.inputs.len()
            + state.maths.len()
            + state.outputs.len()
            + state.pids.len()
            + state.device_measurements.len();
        state.inputs.retain(|c| &c.unique_id != id);
        state.maths.retain(|c| &c.unique_id != id);
        state.outputs.retain(|c| &c.unique_id != id);
        state.pids.retain(|c| &c.unique_id != id);
        state.device_measurements.retain(|m| &m.device_id != id);
        let after = state.inputs.len()
            + state.maths.len()
            + state.outputs.len()
            + state.pids.len()
            + state.device_measurements.len();
        Ok(after < before)
    }
}

impl MetadataCatalog for InMemoryCatalog {
    fn inputs(&self) -> Result<Vec<InputController>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.inputs"))?;
        Ok(state.inputs.clone())
    }

    fn maths(&self) -> Result<Vec<MathController>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.maths"))?;
        Ok(state.maths.clone())
    }

    fn outputs(&self) -> Result<Vec<OutputController>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.outputs"))?;
        Ok(state.outputs.clone())
    }

    fn pids(&self) -> Result<Vec<PidController>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.pids"))?;
        Ok(state.pids.clone())
    }

    fn device_measurements(&self) -> Result<Vec<DeviceMeasurement>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.device_measurements"))?;
        Ok(state.device_measurements.clone())
    }

    fn conversions(&self) -> Result<Vec<Conversion>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.conversions"))?;
        Ok(state.conversions.clone())
    }

    // One read lock so the snapshot is consistent across collections.
    fn snapshot(&self) -> Result<CatalogSnapshot, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("catalog.snapshot"))?;
        Ok(CatalogSnapshot::from_parts(
            state.inputs.clone(),
            state.maths.clone(),
            state.outputs.clone(),
            state.pids.clone(),
            state.device_measurements.clone(),
            state.conversions.clone(),
        ))
    }
}

#[derive(Debug, Default)]
struct WidgetState {
    dashboards: Vec<Dashboard>,
    widgets: Vec<Widget>,
    dashboards_created: u64,
}

impl WidgetState {
    fn dashboard_exists(&self, id: DashboardId) -> bool {
        self.dashboards.iter().any(|d| d.unique_id == id)
    }

    fn name_taken(&self, name: &str, except: Option<DashboardId>) -> bool {
        self.dashboards
            .iter()
            .any(|d| d.name == name && Some(d.unique_id) != except)
    }
}

/// In-memory dashboard and widget store.
#[derive(Debug, Default)]
pub struct InMemoryWidgetStore {
    state: RwLock<WidgetState>,
}

impl InMemoryWidgetStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WidgetStore for InMemoryWidgetStore {
    fn add_dashboard(&self, name: Option<String>) -> Result<Dashboard, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.add_dashboard"))?;
        let ordinal = state.dashboards_created + 1;
        let name = name.unwrap_or_else(|| Dashboard::default_name(ordinal));
        if state.name_taken(&name, None) {
            return Err(ValidationError::DuplicateDashboardName { name }.into());
        }

        let dashboard = Dashboard::new(name)?;
        state.dashboards_created = ordinal;
        state.dashboards.push(dashboard.clone());
        Ok(dashboard)
    }

    fn get_dashboard(&self, id: DashboardId) -> Result<Option<Dashboard>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("widget.get_dashboard"))?;
        Ok(state.dashboards.iter().find(|d| d.unique_id == id).cloned())
    }

    fn list_dashboards(&self) -> Result<Vec<Dashboard>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("widget.list_dashboards"))?;
        Ok(state.dashboards.clone())
    }

    fn rename_dashboard(&self, id: DashboardId, name: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.rename_dashboard"))?;
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            }
            .into());
        }
        if state.name_taken(name, Some(id)) {
            return Err(ValidationError::DuplicateDashboardName {
                name: name.to_string(),
            }
            .into());
        }
        let dashboard = state
            .dashboards
            .iter_mut()
            .find(|d| d.unique_id == id)
            .ok_or(StorageError::DashboardNotFound(id))?;
        dashboard.name = name.to_string();
        Ok(())
    }

    fn delete_dashboard(&self, id: DashboardId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.delete_dashboard"))?;
        if !state.dashboard_exists(id) {
            return Err(StorageError::DashboardNotFound(id));
        }
        if state.dashboards.len() == 1 {
            return Err(ValidationError::LastDashboard.into());
        }
        state.widgets.retain(|w| w.dashboard_id != id);
        state.dashboards.retain(|d| d.unique_id != id);
        Ok(())
    }

    fn insert_widget(&self, widget: Widget) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.insert"))?;
        if state.widgets.iter().any(|w| w.unique_id == widget.unique_id) {
            return Err(StorageError::DuplicateKey(widget.unique_id.to_string()));
        }
        if !state.dashboard_exists(widget.dashboard_id) {
            return Err(StorageError::DashboardNotFound(widget.dashboard_id));
        }
        state.widgets.push(widget);
        Ok(())
    }

    fn get_widget(&self, id: WidgetId) -> Result<Option<Widget>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("widget.get"))?;
        Ok(state.widgets.iter().find(|w| w.unique_id == id).cloned())
    }

    fn update_widget(&self, widget: Widget) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.update"))?;
        if !state.dashboard_exists(widget.dashboard_id) {
            return Err(StorageError::DashboardNotFound(widget.dashboard_id));
        }
        let slot = state
            .widgets
            .iter_mut()
            .find(|w| w.unique_id == widget.unique_id)
            .ok_or(StorageError::WidgetNotFound(widget.unique_id))?;
        *slot = widget;
        Ok(())
    }

    fn delete_widget(&self, id: WidgetId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("widget.delete"))?;
        let before = state.widgets.len();
        state.widgets.retain(|w| w.unique_id != id);
        if state.widgets.len() == before {
            return Err(StorageError::WidgetNotFound(id));
        }
        Ok(())
    }

    fn widgets_for_dashboard(&self, id: DashboardId) -> Result<Vec<Widget>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("widget.widgets_for_dashboard"))?;
        if !state.dashboard_exists(id) {
            return Err(StorageError::DashboardNotFound(id));
        }
        Ok(state
            .widgets
            .iter()
            .filter(|w| w.dashboard_id == id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::reference::MeasurementReference;

    #[test]
    fn catalog_insert_and_read_back() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_input(InputController::new("in-1", "Sensor")).unwrap();
        catalog.insert_math(MathController::new("math-1", "Average")).unwrap();
        catalog
            .insert_output(OutputController::new("out-1", "Pump", "second"))
            .unwrap();
        catalog
            .insert_pid(PidController::new("pid-1", "Heater", "in-1,temperature"))
            .unwrap();
        catalog
            .insert_device_measurement(DeviceMeasurement::new("m-1", "in-1", "temperature", "C"))
            .unwrap();
        catalog.insert_conversion(Conversion::new("conv-1", "C", "F")).unwrap();

        assert_eq!(catalog.inputs().unwrap().len(), 1);
        assert_eq!(catalog.maths().unwrap().len(), 1);
        assert_eq!(catalog.outputs().unwrap()[0].unit, "second");
        assert_eq!(catalog.pids().unwrap().len(), 1);
        assert_eq!(catalog.device_measurements().unwrap().len(), 1);
        assert_eq!(catalog.conversions().unwrap().len(), 1);

        let snap = catalog.snapshot().unwrap();
        assert_eq!(snap.controllers.len(), 4);
        assert_eq!(snap.device_measurements.len(), 1);
    }

    #[test]
    fn catalog_rejects_duplicate_ids_within_collection() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_input(InputController::new("in-1", "A")).unwrap();
        assert!(matches!(
            catalog.insert_input(InputController::new("in-1", "B")),
            Err(StorageError::DuplicateKey(_))
        ));
        // Other collections are independent.
        catalog
            .insert_output(OutputController::new("in-1", "Relay", "second"))
            .unwrap();
    }

    #[test]
    fn catalog_update_and_remove() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_input(InputController::new("in-1", "A")).unwrap();
        catalog
            .insert_device_measurement(DeviceMeasurement::new("m-1", "in-1", "temperature", "C"))
            .unwrap();

        catalog
            .update_device_measurement(
                DeviceMeasurement::new("m-1", "in-1", "temperature", "C").with_conversion("conv-1"),
            )
            .unwrap();
        assert_eq!(
            catalog.device_measurements().unwrap()[0].conversion_id(),
            Some("conv-1")
        );
        assert!(catalog
            .update_device_measurement(DeviceMeasurement::new("m-9", "in-1", "x", "y"))
            .is_err());

        assert!(catalog.remove_controller(&ControllerId::from("in-1")).unwrap());
        assert!(catalog.inputs().unwrap().is_empty());
        assert!(catalog.device_measurements().unwrap().is_empty());
        assert!(!catalog.remove_controller(&ControllerId::from("in-1")).unwrap());
    }

    #[test]
    fn dashboards_get_default_names() {
        let store = InMemoryWidgetStore::new();
        let first = store.add_dashboard(None).unwrap();
        let second = store.add_dashboard(None).unwrap();
        assert_eq!(first.name, "Dashboard 1");
        assert_eq!(second.name, "Dashboard 2");

        store.delete_dashboard(first.unique_id).unwrap();
        // Numbering never reuses an ordinal.
        let third = store.add_dashboard(None).unwrap();
        assert_eq!(third.name, "Dashboard 3");
        assert_eq!(store.list_dashboards().unwrap().len(), 2);
    }

    #[test]
    fn dashboard_names_are_unique() {
        let store = InMemoryWidgetStore::new();
        let a = store.add_dashboard(Some("Greenhouse".to_string())).unwrap();
        let b = store.add_dashboard(Some("Garage".to_string())).unwrap();

        let err = store.add_dashboard(Some("Greenhouse".to_string())).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Rejected(ValidationError::DuplicateDashboardName { .. })
        ));

        let err = store.rename_dashboard(b.unique_id, "Greenhouse").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Rejected(ValidationError::DuplicateDashboardName { .. })
        ));

        // Renaming to its own name is fine.
        store.rename_dashboard(a.unique_id, "Greenhouse").unwrap();
        store.rename_dashboard(b.unique_id, "Shed").unwrap();
        assert_eq!(store.get_dashboard(b.unique_id).unwrap().unwrap().name, "Shed");

        assert!(matches!(
            store.rename_dashboard(DashboardId::new(), "Other"),
            Err(StorageError::DashboardNotFound(_))
        ));
    }

    #[test]
    fn last_dashboard_cannot_be_deleted() {
        let store = InMemoryWidgetStore::new();
        let only = store.add_dashboard(None).unwrap();
        assert!(matches!(
            store.delete_dashboard(only.unique_id),
            Err(StorageError::Rejected(ValidationError::LastDashboard))
        ));
        assert!(matches!(
            store.delete_dashboard(DashboardId::new()),
            Err(StorageError::DashboardNotFound(_))
        ));
    }

    #[test]
    fn deleting_dashboard_deletes_widgets() {
        let store = InMemoryWidgetStore::new();
        let keep = store.add_dashboard(None).unwrap();
        let doomed = store.add_dashboard(None).unwrap();

        let w1 = Widget::new(doomed.unique_id, "graph", "Temps").unwrap();
        let w2 = Widget::new(keep.unique_id, "graph", "Humidity").unwrap();
        let w1_id = w1.unique_id;
        store.insert_widget(w1).unwrap();
        store.insert_widget(w2).unwrap();

        store.delete_dashboard(doomed.unique_id).unwrap();
        assert!(store.get_widget(w1_id).unwrap().is_none());
        assert_eq!(store.widgets_for_dashboard(keep.unique_id).unwrap().len(), 1);
    }

    #[test]
    fn widget_crud_and_references() {
        let store = InMemoryWidgetStore::new();
        let dash = store.add_dashboard(None).unwrap();

        let orphan = Widget::new(DashboardId::new(), "graph", "Orphan").unwrap();
        assert!(matches!(
            store.insert_widget(orphan),
            Err(StorageError::DashboardNotFound(_))
        ));

        let refs = vec![
            MeasurementReference::measurement("in-1", "temperature"),
            MeasurementReference::measurement("out-1", "duty_cycle"),
        ];
        let mut widget = Widget::new(dash.unique_id, "graph", "Temps")
            .unwrap()
            .with_measurements(refs.clone());
        let id = widget.unique_id;
        store.insert_widget(widget.clone()).unwrap();
        assert!(matches!(
            store.insert_widget(widget.clone()),
            Err(StorageError::DuplicateKey(_))
        ));
        assert_eq!(store.measurement_references(id).unwrap(), refs);

        widget.name = "Temperatures".to_string();
        widget.measurements.truncate(1);
        store.update_widget(widget).unwrap();
        let got = store.get_widget(id).unwrap().unwrap();
        assert_eq!(got.name, "Temperatures");
        assert_eq!(got.measurements.len(), 1);

        store.delete_widget(id).unwrap();
        assert!(matches!(store.delete_widget(id), Err(StorageError::WidgetNotFound(_))));
        assert!(matches!(
            store.measurement_references(id),
            Err(StorageError::WidgetNotFound(_))
        ));
    }
}
