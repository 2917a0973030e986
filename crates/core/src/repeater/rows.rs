//! Row lifecycle: append, remove, duplicate, reorder, label.
//!
//! Every operation reports whether it changed anything; boundary
//! conditions (min/max rows, ends of the sequence) are no-ops.

use serde_json::{Map, Value};

use fieldframe_template::render_row_label;

use crate::schema::RepeaterConfig;

pub type Row = Map<String, Value>;

/// A fresh row with every declared subfield present and null.
pub fn new_row(config: &RepeaterConfig) -> Row {
    config
        .subfields
        .iter()
        .map(|field| (field.key.clone(), Value::Null))
        .collect()
}

/// Append a fresh row. No-op when the set is at `max_rows`.
pub fn append_row(rows: &mut Vec<Row>, config: &RepeaterConfig) -> bool {
    if at_capacity(rows, config) {
        return false;
    }
    rows.push(new_row(config));
    true
}

/// Remove the row at `index`. No-op at the `min_rows` floor or when the
/// index is out of range.
pub fn remove_row(rows: &mut Vec<Row>, config: &RepeaterConfig, index: usize) -> bool {
    if index >= rows.len() || rows.len() <= config.min_rows {
        return false;
    }
    rows.remove(index);
    true
}

/// Deep-clone the row at `index` and insert the copy immediately after
/// it. Honors the `max_rows` ceiling.
pub fn duplicate_row(rows: &mut Vec<Row>, config: &RepeaterConfig, index: usize) -> bool {
    if index >= rows.len() || at_capacity(rows, config) {
        return false;
    }
    let clone = rows[index].clone();
    rows.insert(index + 1, clone);
    true
}

/// Swap the row at `index` with its predecessor. No-op at the top.
pub fn move_up(rows: &mut [Row], index: usize) -> bool {
    if index == 0 || index >= rows.len() {
        return false;
    }
    rows.swap(index - 1, index);
    true
}

/// Swap the row at `index` with its successor. No-op at the bottom.
pub fn move_down(rows: &mut [Row], index: usize) -> bool {
    if index + 1 >= rows.len() {
        return false;
    }
    rows.swap(index, index + 1);
    true
}

/// Display label for one row. A blank template defaults to `Row {#}`.
pub fn row_label(config: &RepeaterConfig, row: &Row, index: usize) -> String {
    let template = config.row_label_template.trim();
    if template.is_empty() {
        return format!("Row {}", index + 1);
    }
    render_row_label(template, &Value::Object(row.clone()), index)
}

fn at_capacity(rows: &[Row], config: &RepeaterConfig) -> bool {
    config.max_rows.is_some_and(|max| rows.len() >= max)
}
