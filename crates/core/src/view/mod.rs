//! Editor views: role-scoped presentation layouts over a content type's
//! fields.

pub mod compile;
pub mod model;
pub mod select;
pub mod store;

pub use compile::{compile_layout, CompiledField, CompiledSection};
pub use model::{CoreSectionConfig, EditorView, TitleMode};
pub use select::select_effective;
pub use store::ViewStore;
