//! Dashboards and the widgets placed on them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::reference::MeasurementReference;

/// Unique dashboard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardId(Uuid);

impl DashboardId {
    /// Creates a new random dashboard ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DashboardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique widget identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(Uuid);

impl WidgetId {
    /// Creates a new random widget ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named page of widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Unique identifier
    pub unique_id: DashboardId,
    /// Display name, unique across dashboards
    pub name: String,
    /// When the dashboard was created
    pub created_at: DateTime<Utc>,
}

impl Dashboard {
    /// Creates a dashboard with the given name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            });
        }
        Ok(Self {
            unique_id: DashboardId::new(),
            name,
            created_at: Utc::now(),
        })
    }

    /// Name given to the `ordinal`-th dashboard when none is supplied.
    #[must_use]
    pub fn default_name(ordinal: u64) -> String {
        format!("Dashboard {ordinal}")
    }
}

/// A widget on a dashboard.
///
/// Graph widgets list the measurements they plot in `measurements`; the axis
/// engine turns those into Y-axis units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Unique identifier
    pub unique_id: WidgetId,

    /// Dashboard the widget lives on
    pub dashboard_id: DashboardId,

    /// Widget type (e.g. `graph`, `gauge`)
    pub widget_type: String,

    /// Title shown on the widget
    pub name: String,

    /// Seconds between refreshes
    pub refresh_duration: u32,

    /// Whether the widget can be dragged around the grid
    pub enable_drag_handle: bool,

    /// Font size of the title, in em
    pub font_em_name: f32,

    /// Ordered measurements plotted by the widget
    #[serde(default)]
    pub measurements: Vec<MeasurementReference>,

    /// Widget-type specific options
    #[serde(default)]
    pub custom_options: serde_json::Value,

    /// When the widget was added
    pub created_at: DateTime<Utc>,
}

impl Widget {
    /// Creates a widget of `widget_type` on `dashboard_id`.
    pub fn new(
        dashboard_id: DashboardId,
        widget_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let widget_type = widget_type.into();
        if widget_type.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "widget_type".to_string(),
            });
        }
        Ok(Self {
            unique_id: WidgetId::new(),
            dashboard_id,
            widget_type,
            name: name.into(),
            refresh_duration: 120,
            enable_drag_handle: true,
            font_em_name: 1.0,
            measurements: Vec::new(),
            custom_options: serde_json::Value::Null,
            created_at: Utc::now(),
        })
    }

    /// Sets the plotted measurements.
    #[must_use]
    pub fn with_measurements(mut self, measurements: Vec<MeasurementReference>) -> Self {
        self.measurements = measurements;
        self
    }

    /// Sets the widget-specific options.
    #[must_use]
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.custom_options = options;
        self
    }
}
