//! # dashaxis - Y-axis unit resolution for measurement dashboards
//!
//! A dashboard graph widget plots measurements from many controllers at once.
//! Before it can draw, it needs one Y axis per distinct unit. dashaxis turns
//! the widget's measurement references into that ordered, duplicate-free list
//! of unit labels, reading controller metadata from a catalog snapshot.
//!
//! ## Core Concepts
//!
//! - **MeasurementReference**: `<controller_id>[,<measurement_key>[,<unit>]]`
//! - **CatalogSnapshot**: inputs, maths, outputs, PIDs, device measurements
//!   and conversions, read once per resolution
//! - **MeasurementDictionary**: known measurements with their display unit
//! - **AxisSet**: the resolved unit labels in first-seen order
//!
//! ## Usage
//!
//! ```rust
//! use dashaxis::{
//!     resolve_axes, CatalogSnapshot, ControllerId, DeviceMeasurement, InputController,
//!     MeasurementDictionary, MeasurementReference,
//! };
//!
//! let snapshot = CatalogSnapshot::from_parts(
//!     vec![InputController::new("input123", "DS18B20")],
//!     vec![],
//!     vec![],
//!     vec![],
//!     vec![DeviceMeasurement::new("m1", ControllerId::from("input123"), "temperature", "C")],
//!     vec![],
//! );
//! let references = vec![
//!     MeasurementReference::measurement("input123", "temperature"),
//!     MeasurementReference::measurement("input123", "custom_key").with_unit("widgets_per_hour"),
//! ];
//!
//! let axes = resolve_axes(&MeasurementDictionary::builtin(), &snapshot, &references);
//! assert_eq!(axes.as_slice(), ["C", "custom_key_widgets_per_hour"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Catalog records
pub mod catalog;
pub mod controller;
pub mod dictionary;
pub mod error;
pub mod measurement;
pub mod reference;

// Dashboards, storage and resolution
pub mod dashboard;
pub mod engine;
pub mod resolve;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use catalog::{CatalogIndex, CatalogSnapshot};
pub use controller::{
    ControllerId, ControllerKind, ControllerRecord, InputController, MathController,
    OutputController, PidController, UpstreamMeasurement,
};
pub use dashboard::{Dashboard, DashboardId, Widget, WidgetId};
pub use dictionary::{MeasurementDictionary, MeasurementInfo};
pub use error::{AxisError, AxisResult, ConfigError, ValidationError};
pub use measurement::{Conversion, DeviceMeasurement};
pub use reference::MeasurementReference;

pub use engine::{AxisEngine, AxisEngineConfig};
pub use resolve::{
    resolve_axes, AxisResolution, AxisResolver, AxisSet, UnresolvedReason, UnresolvedReference,
};
pub use storage::{
    InMemoryCatalog, InMemoryWidgetStore, MetadataCatalog, StorageError, WidgetStore,
};
