//! Column → value mappings.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio_postgres::Row;

/// A row, a model's attributes, or a diff: column name to [`Value`].
///
/// Keys are kept sorted so rendering and comparison are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Value of `column`, `Value::Null` when the column is absent.
    pub fn value(&self, column: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.values.get(column).unwrap_or(&NULL)
    }

    /// Decode a column into a typed value. A missing column decodes like NULL.
    pub fn get_as<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        T::from_value(self.value(column)).map_err(|msg| OrmError::decode(column, msg))
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(column.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode every column of a `tokio_postgres` row.
    pub fn from_row(row: &Row) -> OrmResult<Self> {
        let mut values = BTreeMap::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let value: Value = row
                .try_get(idx)
                .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
            values.insert(column.name().to_string(), value);
        }
        Ok(Self { values })
    }

    /// Build a record from a JSON object.
    pub fn from_json(value: serde_json::Value) -> OrmResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect()),
            other => Err(OrmError::Serialization(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Columns of one joined table, read back from `alias_column` keys.
    ///
    /// Joined reads project every column as `alias_column`; this strips the
    /// prefix so the result can be fed to [`Model::from_record`](crate::Model::from_record).
    pub fn aliased(&self, alias: &str) -> Record {
        let prefix = format!("{alias}_");
        self.values
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|c| (c.to_string(), v.clone())))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_access() {
        let rec = Record::new().with("name", "Ha Noi").with("status", 1);
        assert_eq!(rec.get_as::<String>("name").unwrap(), "Ha Noi");
        assert_eq!(rec.get_as::<i32>("status").unwrap(), 1);
        assert_eq!(rec.get_as::<Option<String>>("missing").unwrap(), None);

        let err = rec.get_as::<String>("missing").unwrap_err();
        assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "missing"));
    }

    #[test]
    fn json_round_shape() {
        let rec = Record::from_json(json!({"uid": 3, "tags": ["a"], "metadata": {"k": 1}})).unwrap();
        assert_eq!(rec.value("uid"), &Value::Int(3));
        assert_eq!(rec.value("tags"), &Value::TextArray(vec!["a".into()]));
        assert_eq!(rec.to_json()["metadata"], json!({"k": 1}));
        assert!(Record::from_json(json!([1])).is_err());
    }

    #[test]
    fn aliased_splits_joined_rows() {
        let row = Record::new()
            .with("p_uid", 1)
            .with("p_name", "An")
            .with("a_uid", 9)
            .with("a_city", "Hue");
        let profile = row.aliased("p");
        assert_eq!(profile.keys().collect::<Vec<_>>(), vec!["name", "uid"]);
        assert_eq!(row.aliased("a").value("city"), &Value::from("Hue"));
        assert!(row.aliased("d").is_empty());
    }

    #[test]
    fn keys_are_sorted() {
        let rec: Record = [("b", 1), ("a", 2)].into_iter().collect();
        assert_eq!(rec.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
