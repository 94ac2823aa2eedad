//! Abstract storage traits for dashaxis.
//!
//! The axis engine never owns data. It reads controller metadata through
//! [`MetadataCatalog`] and widget configuration through [`WidgetStore`], so a
//! database-backed deployment and the in-memory backend are interchangeable.

use thiserror::Error;

use crate::catalog::CatalogSnapshot;
use crate::controller::{InputController, MathController, OutputController, PidController};
use crate::dashboard::{Dashboard, DashboardId, Widget, WidgetId};
use crate::error::ValidationError;
use crate::measurement::{Conversion, DeviceMeasurement};
use crate::reference::MeasurementReference;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Dashboard not found.
    #[error("Dashboard not found: {0}")]
    DashboardNotFound(DashboardId),

    /// Widget not found.
    #[error("Widget not found: {0}")]
    WidgetNotFound(WidgetId),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The write breaks a store rule.
    #[error("Rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Read contract of the controller metadata catalog.
///
/// Every method returns the full collection; there is no filtering or
/// pagination.
pub trait MetadataCatalog: Send + Sync {
    /// All input controllers.
    fn inputs(&self) -> Result<Vec<InputController>, StorageError>;

    /// All math controllers.
    fn maths(&self) -> Result<Vec<MathController>, StorageError>;

    /// All output controllers.
    fn outputs(&self) -> Result<Vec<OutputController>, StorageError>;

    /// All PID controllers.
    fn pids(&self) -> Result<Vec<PidController>, StorageError>;

    /// All device measurements.
    fn device_measurements(&self) -> Result<Vec<DeviceMeasurement>, StorageError>;

    /// All conversions.
    fn conversions(&self) -> Result<Vec<Conversion>, StorageError>;

    /// Fetches every collection into one snapshot.
    ///
    /// Backends that can read all collections atomically should override
    /// this.
    fn snapshot(&self) -> Result<CatalogSnapshot, StorageError> {
        Ok(CatalogSnapshot::from_parts(
            self.inputs()?,
            self.maths()?,
            self.outputs()?,
            self.pids()?,
            self.device_measurements()?,
            self.conversions()?,
        ))
    }
}

/// Storage for dashboards and their widgets.
///
/// # Rules
/// - Dashboard names are unique.
/// - The last remaining dashboard cannot be deleted.
/// - Deleting a dashboard deletes its widgets.
/// - Widgets can only be added to existing dashboards.
pub trait WidgetStore: Send + Sync {
    /// Creates a dashboard. Without a name it is called `Dashboard <n>`.
    fn add_dashboard(&self, name: Option<String>) -> Result<Dashboard, StorageError>;

    /// Get a dashboard by ID.
    fn get_dashboard(&self, id: DashboardId) -> Result<Option<Dashboard>, StorageError>;

    /// All dashboards in creation order.
    fn list_dashboards(&self) -> Result<Vec<Dashboard>, StorageError>;

    /// Renames a dashboard.
    fn rename_dashboard(&self, id: DashboardId, name: &str) -> Result<(), StorageError>;

    /// Deletes a dashboard and its widgets.
    fn delete_dashboard(&self, id: DashboardId) -> Result<(), StorageError>;

    /// Insert a new widget. Returns error if ID already exists.
    fn insert_widget(&self, widget: Widget) -> Result<(), StorageError>;

    /// Get a widget by ID.
    fn get_widget(&self, id: WidgetId) -> Result<Option<Widget>, StorageError>;

    /// Replace an existing widget. Returns error if not found.
    fn update_widget(&self, widget: Widget) -> Result<(), StorageError>;

    /// Delete a widget by ID. Returns error if not found.
    fn delete_widget(&self, id: WidgetId) -> Result<(), StorageError>;

    /// Widgets on a dashboard, in insertion order.
    fn widgets_for_dashboard(&self, id: DashboardId) -> Result<Vec<Widget>, StorageError>;

    /// The ordered measurement references of a widget.
    fn measurement_references(
        &self,
        id: WidgetId,
    ) -> Result<Vec<MeasurementReference>, StorageError> {
        self.get_widget(id)?
            .map(|w| w.measurements)
            .ok_or(StorageError::WidgetNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test: ensure traits are object-safe
    fn _assert_metadata_catalog_object_safe(_: &dyn MetadataCatalog) {}
    fn _assert_widget_store_object_safe(_: &dyn WidgetStore) {}

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::WidgetNotFound(WidgetId::new());
        assert!(err.to_string().contains("Widget not found"));

        let err = StorageError::BackendError("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err: StorageError = ValidationError::LastDashboard.into();
        assert!(err.to_string().contains("only remaining dashboard"));
    }
}
