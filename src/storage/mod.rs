//! Storage contracts and the in-memory backend.
//!
//! The traits describe the read contract the axis engine consumes; the
//! in-memory implementations back tests and embedded use.

mod memory;
mod traits;

pub use memory::{InMemoryCatalog, InMemoryWidgetStore};
pub use traits::{MetadataCatalog, StorageError, WidgetStore};
