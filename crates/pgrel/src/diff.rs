//! Changed-column computation for partial updates.
//!
//! [`diff`] compares a persisted row with a model's attributes and keeps only
//! the columns whose values moved. `metadata` and `settings` are merged into
//! the stored JSON object rather than replaced.

use crate::error::{OrmError, OrmResult};
use crate::model::TableSchema;
use crate::record::Record;
use crate::value::Value;
use heck::ToLowerCamelCase;

/// JSON object columns merged into their persisted value.
pub const MERGED_JSON_COLUMNS: &[&str] = &["metadata", "settings"];

/// Columns set once at creation and never updated.
pub const CREATION_COLUMNS: &[&str] = &["created", "created_at"];

/// Emptiness policy for [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Emit NULL and blank strings as changes.
    pub accept_null: bool,
    /// Emit `0` and `false` as changes.
    pub accept_zero: bool,
    /// Columns never diffed.
    pub excepts: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            accept_null: false,
            accept_zero: true,
            excepts: Vec::new(),
        }
    }
}

impl DiffOptions {
    pub fn except(mut self, column: impl Into<String>) -> Self {
        self.excepts.push(column.into());
        self
    }
}

/// Look a column up in `data` by its own name, then by its camelCase form.
fn lookup<'a>(data: &'a Record, column: &str) -> Option<&'a Value> {
    data.get(column)
        .or_else(|| data.get(&column.to_lower_camel_case()))
}

fn as_object(column: &str, value: &Value) -> OrmResult<Option<serde_json::Map<String, serde_json::Value>>> {
    let json = match value {
        Value::Null => return Ok(None),
        Value::Json(v) => v.clone(),
        Value::Text(s) if s.trim().is_empty() => return Ok(None),
        Value::Text(s) => serde_json::from_str(s).map_err(|e| {
            OrmError::Serialization(format!("column '{column}' is not valid JSON: {e}"))
        })?,
        other => {
            return Err(OrmError::Serialization(format!(
                "column '{column}' expects a JSON object, got {}",
                other.kind()
            )));
        }
    };
    match json {
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::Null => Ok(None),
        other => Err(OrmError::Serialization(format!(
            "column '{column}' expects a JSON object, got {other}"
        ))),
    }
}

/// Overlay `source` onto `target`. Nested objects merge recursively, nulls
/// in `source` are ignored, arrays and scalars replace.
pub fn merge_json(
    target: &mut serde_json::Map<String, serde_json::Value>,
    source: &serde_json::Map<String, serde_json::Value>,
) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (_, serde_json::Value::Null) => {}
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(nested)) => {
                merge_json(existing, nested);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merged_change(column: &str, old: &Value, new: &Value) -> OrmResult<Option<Value>> {
    let Some(incoming) = as_object(column, new)? else {
        return Ok(None);
    };
    let persisted = as_object(column, old)?.unwrap_or_default();
    let mut merged = persisted.clone();
    merge_json(&mut merged, &incoming);
    if merged == persisted && !old.is_null() {
        return Ok(None);
    }
    let text = serde_json::to_string(&serde_json::Value::Object(merged))?;
    Ok(Some(Value::Text(text)))
}

/// Changed columns between the persisted `row` and the model attributes `data`.
///
/// Only columns present in `row` are considered. Creation timestamps are
/// never part of the result.
pub fn diff(row: &Record, data: &Record, opts: &DiffOptions) -> OrmResult<Record> {
    let mut changes = Record::new();
    for (column, old) in row.iter() {
        if CREATION_COLUMNS.contains(&column) || opts.excepts.iter().any(|e| e == column) {
            continue;
        }
        let Some(new) = lookup(data, column) else {
            continue;
        };

        if MERGED_JSON_COLUMNS.contains(&column) {
            if let Some(value) = merged_change(column, old, new)? {
                changes.insert(column, value);
            }
            continue;
        }

        if !opts.accept_null && new.is_blank() {
            continue;
        }
        if !opts.accept_zero && new.is_zero() {
            continue;
        }
        if new.same_as(old) {
            continue;
        }
        changes.insert(column, new.clone());
    }
    Ok(changes)
}

/// [`diff`] for a table: the primary key and the columns ignored on update
/// are stripped as well.
pub fn diff_for(
    schema: &TableSchema,
    row: &Record,
    data: &Record,
    opts: &DiffOptions,
) -> OrmResult<Record> {
    let mut changes = diff(row, data, opts)?;
    changes.remove(schema.primary_key);
    let skipped: Vec<String> = changes
        .keys()
        .filter(|c| schema.skipped_on_update(c))
        .map(str::to_string)
        .collect();
    for column in &skipped {
        changes.remove(column);
    }
    Ok(changes)
}
