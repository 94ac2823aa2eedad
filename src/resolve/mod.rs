//! Axis unit resolution.
//!
//! Maps the measurement references of a widget to the ordered, duplicate-free
//! list of units its chart needs a Y axis for. Resolution is a pure function
//! of the references, the measurement dictionary and one catalog snapshot.

mod axes;
mod resolver;
mod use_unit;

pub use axes::{AxisResolution, AxisSet, UnresolvedReason, UnresolvedReference};
pub use resolver::{
    resolve_axes, AxisResolver, DURATION_TIME_UNIT, DUTY_CYCLE_UNIT, SETPOINT_KEYS,
};
pub use use_unit::{effective_unit, UseUnitIndex};
