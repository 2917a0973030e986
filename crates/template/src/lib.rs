//! The small interpreter behind FieldFrame's display logic: `{dot.path}`
//! title templates, repeater row labels, slug generation, and the
//! operator semantics of conditional-visibility rules.

pub mod render;
pub mod rules;
pub mod slug;
pub mod token;

pub use render::{collapse_whitespace, derive_title, pretty_inline, render_row_label, resolve_path};
pub use rules::RuleOperator;
pub use slug::slugify;
pub use token::{parse_template, Segment};
