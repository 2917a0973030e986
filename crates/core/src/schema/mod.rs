//! Content-type schema: field definitions, config normalization, and the
//! registry store.

pub mod normalize;
pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{
    ContentType, ContentTypeKind, FieldDefinition, FieldInput, FieldType, RepeaterConfig,
    RepeaterLayout, RuleAction, SubfieldConfig, SubfieldSchema, VisibilityRule,
};
