//! Entries: records conforming to a content type's schema.

pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod store;

pub use model::{Entry, EntryInput, EntryStatus};
pub use pipeline::{prepare_entry_write, PreparedEntry};
pub use store::EntryStore;
