use super::model::EditorView;

/// Pick the effective view for a role, first match wins:
/// 1. highest-priority view whose default-role set contains the role;
/// 2. the view flagged default;
/// 3. most recently updated; 4. most recently created; 5. lowest id.
pub fn select_effective<'a>(views: &'a [EditorView], role: &str) -> Option<&'a EditorView> {
    if views.is_empty() {
        return None;
    }

    let for_role = views
        .iter()
        .filter(|view| {
            view.default_roles
                .iter()
                .any(|r| r.eq_ignore_ascii_case(role))
        })
        .max_by_key(|view| view.priority);
    if let Some(view) = for_role {
        return Some(view);
    }

    if let Some(view) = views.iter().find(|view| view.is_default) {
        return Some(view);
    }

    // One composite key: update recency, then creation recency, then
    // lowest id as the stable final tie-break.
    views
        .iter()
        .max_by_key(|view| (view.updated_at, view.created_at, std::cmp::Reverse(view.id)))
}
