//! The write pipeline: normalization, then title derivation, then slug
//! derivation, strictly in that order, before anything is persisted.

use fieldframe_template::{derive_title, slugify};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::schema::FieldDefinition;
use crate::view::{CoreSectionConfig, TitleMode};

use super::model::{Entry, EntryInput, EntryStatus};
use super::normalize::normalize_entry;

/// A payload ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEntry {
    pub title: String,
    pub slug: String,
    pub status: EntryStatus,
    pub data: Value,
}

/// Prepare a create or update for persistence.
///
/// In template title mode a non-empty derived title overrides whatever
/// the client sent. The title is required after derivation. An empty
/// slug is derived from the title when the view's auto-slug flag is on
/// (the default); slug uniqueness itself is enforced by the store.
pub fn prepare_entry_write(
    fields: &[FieldDefinition],
    core: &CoreSectionConfig,
    input: &EntryInput,
    existing: Option<&Entry>,
) -> CoreResult<PreparedEntry> {
    let raw_data = input
        .data
        .clone()
        .or_else(|| existing.map(|e| e.data.clone()))
        .unwrap_or_else(|| Value::Object(Default::default()));
    let data = normalize_entry(fields, &raw_data);

    let client_title = input
        .title
        .clone()
        .or_else(|| existing.map(|e| e.title.clone()))
        .unwrap_or_default();
    let title = match core.title_mode {
        TitleMode::Template if !core.title_template.trim().is_empty() => {
            let derived = derive_title(&core.title_template, &data);
            if derived.is_empty() {
                client_title
            } else {
                derived
            }
        }
        _ => client_title,
    };
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(CoreError::Validation("entry title is required".into()));
    }

    let slug = input
        .slug
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            existing
                .map(|e| e.slug.clone())
                .filter(|s| !s.is_empty())
        })
        .map(|s| s.trim().to_string());
    let slug = match slug {
        Some(slug) => slug,
        None if core.auto_slug_from_title => slugify(&title),
        None => return Err(CoreError::Validation("entry slug is required".into())),
    };
    if slug.is_empty() {
        return Err(CoreError::Validation("entry slug is required".into()));
    }

    let status = input
        .status
        .or_else(|| existing.map(|e| e.status))
        .unwrap_or(EntryStatus::Draft);

    Ok(PreparedEntry {
        title,
        slug,
        status,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use serde_json::json;
    use uuid::Uuid;

    fn field(key: &str, field_type: FieldType) -> FieldDefinition {
        FieldDefinition {
            id: Uuid::nil(),
            key: key.to_string(),
            label: key.to_string(),
            field_type,
            required: false,
            help_text: String::new(),
            order_index: 0,
            config: json!({}),
        }
    }

    fn template_core(template: &str) -> CoreSectionConfig {
        CoreSectionConfig {
            title_mode: TitleMode::Template,
            title_template: template.to_string(),
            ..CoreSectionConfig::default()
        }
    }

    #[test]
    fn manual_mode_uses_client_title() {
        let prepared = prepare_entry_write(
            &[],
            &CoreSectionConfig::default(),
            &EntryInput {
                title: Some("Hello World".into()),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(prepared.title, "Hello World");
        assert_eq!(prepared.slug, "hello-world");
        assert_eq!(prepared.status, EntryStatus::Draft);
    }

    #[test]
    fn template_title_overrides_client_title() {
        let fields = vec![field("name", FieldType::Name)];
        let prepared = prepare_entry_write(
            &fields,
            &template_core("{name.first} {name.last}"),
            &EntryInput {
                title: Some("ignored".into()),
                data: Some(json!({"name": {"first": "Ada", "last": "Lovelace"}})),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(prepared.title, "Ada Lovelace");
        assert_eq!(prepared.slug, "ada-lovelace");
    }

    #[test]
    fn empty_derivation_falls_back_to_client_title() {
        let prepared = prepare_entry_write(
            &[],
            &template_core("{missing}"),
            &EntryInput {
                title: Some("Fallback".into()),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(prepared.title, "Fallback");
    }

    #[test]
    fn missing_title_is_a_validation_error() {
        let err = prepare_entry_write(
            &[],
            &CoreSectionConfig::default(),
            &EntryInput::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn explicit_slug_is_kept() {
        let prepared = prepare_entry_write(
            &[],
            &CoreSectionConfig::default(),
            &EntryInput {
                title: Some("A Title".into()),
                slug: Some("custom-slug".into()),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(prepared.slug, "custom-slug");
    }

    #[test]
    fn auto_slug_can_be_disabled() {
        let core = CoreSectionConfig {
            auto_slug_from_title: false,
            ..CoreSectionConfig::default()
        };
        let err = prepare_entry_write(
            &[],
            &core,
            &EntryInput {
                title: Some("No Slug".into()),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn update_inherits_from_existing_entry() {
        let existing = Entry {
            id: Uuid::now_v7(),
            content_type_id: Uuid::nil(),
            title: "Old Title".into(),
            slug: "old-slug".into(),
            status: EntryStatus::Published,
            data: json!({"a": 1}),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            relations: Default::default(),
        };
        let prepared = prepare_entry_write(
            &[],
            &CoreSectionConfig::default(),
            &EntryInput::default(),
            Some(&existing),
        )
        .unwrap();
        assert_eq!(prepared.title, "Old Title");
        assert_eq!(prepared.slug, "old-slug");
        assert_eq!(prepared.status, EntryStatus::Published);
        assert_eq!(prepared.data, json!({"a": 1}));
    }

    #[test]
    fn data_is_normalized_before_derivation() {
        let fields = vec![field("full_name", FieldType::Name)];
        let prepared = prepare_entry_write(
            &fields,
            &template_core("{full_name.first}"),
            &EntryInput {
                data: Some(json!({"fullName": {"first": "Grace"}})),
                ..EntryInput::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(prepared.title, "Grace");
        assert!(prepared.data.get("full_name").is_some());
        assert!(prepared.data.get("fullName").is_none());
    }
}
