//! The repeater engine: ordered row sets over a nested subfield schema,
//! with conditional visibility and depth-gated nesting.

pub mod rows;
pub mod visibility;

pub use rows::{append_row, duplicate_row, move_down, move_up, new_row, remove_row, row_label};
pub use visibility::{evaluate_row, inert_subfield_keys, strip_inert};
