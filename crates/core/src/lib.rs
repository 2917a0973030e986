//! FieldFrame core: schema registry, entry normalization and storage,
//! relation resolution, editor views, and the repeater engine.

pub mod entry;
pub mod error;
pub mod relation;
pub mod repeater;
pub mod schema;
pub mod view;

pub use error::{CoreError, CoreResult};
