//! Dynamically typed SQL values.
//!
//! [`Value`] is what flows through the statement layer: model attributes are
//! converted into it, statements bind it, and rows decode back into it. The
//! `ToSql` implementation picks the wire encoding from the target column type
//! so one value can be bound wherever Postgres accepts it.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use std::error::Error;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// A single SQL value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    TextArray(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or the empty string. Such attributes are left out of INSERTs.
    pub fn is_empty_for_insert(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Null or a whitespace-only string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric zero or `false`.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Bool(b) => !*b,
            _ => false,
        }
    }

    /// Equality used when diffing: strict on type, except that integers and
    /// floats compare numerically.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (a, b) => a == b,
        }
    }

    /// Short type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Json(_) => "json",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::TextArray(_) => "text[]",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value. Arrays of strings become `TextArray`, other
    /// arrays and objects stay JSON.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) if items.iter().all(|v| v.is_string()) && !items.is_empty() => {
                Value::TextArray(
                    items
                        .into_iter()
                        .filter_map(|v| match v {
                            serde_json::Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect(),
                )
            }
            other => Value::Json(other),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Json(v) => v.clone(),
            Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            Value::Uuid(u) => serde_json::Value::String(u.to_string()),
            Value::TextArray(v) => serde_json::Value::from(v.clone()),
        }
    }

    /// Compact rendering used in logs and error messages.
    pub fn display(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Text(s) => format!("'{s}'"),
            other => other.to_json().to_string(),
        }
    }

    fn mismatch(&self, ty: &Type) -> BoxError {
        format!("cannot encode {} value as {}", self.kind(), ty).into()
    }

    fn bind_i64(&self, ty: &Type) -> Result<i64, BoxError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Text(s) => Ok(s.trim().parse()?),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_f64(&self, ty: &Type) -> Result<f64, BoxError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Text(s) => Ok(s.trim().parse()?),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_bool(&self, ty: &Type) -> Result<bool, BoxError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(self.mismatch(ty)),
            },
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_json(&self) -> Result<serde_json::Value, BoxError> {
        match self {
            Value::Text(s) => Ok(serde_json::from_str(s)?),
            other => Ok(other.to_json()),
        }
    }

    fn bind_uuid(&self, ty: &Type) -> Result<Uuid, BoxError> {
        match self {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Ok(Uuid::parse_str(s.trim())?),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_timestamp(&self, ty: &Type) -> Result<DateTime<Utc>, BoxError> {
        match self {
            Value::Timestamp(t) => Ok(*t),
            Value::Text(s) => Ok(DateTime::parse_from_rfc3339(s.trim())?.with_timezone(&Utc)),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_date(&self, ty: &Type) -> Result<NaiveDate, BoxError> {
        match self {
            Value::Timestamp(t) => Ok(t.date_naive()),
            Value::Text(s) => Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn bind_text(&self, ty: &Type) -> Result<String, BoxError> {
        match self {
            Value::Text(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Json(v) => Ok(v.to_string()),
            Value::Timestamp(t) => Ok(t.to_rfc3339()),
            Value::Uuid(u) => Ok(u.to_string()),
            Value::Null | Value::TextArray(_) => Err(self.mismatch(ty)),
        }
    }

    fn bind_text_array(&self, ty: &Type) -> Result<Vec<String>, BoxError> {
        match self {
            Value::TextArray(items) => Ok(items.clone()),
            Value::Json(serde_json::Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => Ok(s.clone()),
                    other => Ok(other.to_string()),
                })
                .collect(),
            _ => Err(self.mismatch(ty)),
        }
    }
}

fn is_text_type(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }
        match *ty {
            Type::BOOL => self.bind_bool(ty)?.to_sql(ty, out),
            Type::INT2 => i16::try_from(self.bind_i64(ty)?)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(self.bind_i64(ty)?)?.to_sql(ty, out),
            Type::INT8 => self.bind_i64(ty)?.to_sql(ty, out),
            Type::FLOAT4 => (self.bind_f64(ty)? as f32).to_sql(ty, out),
            Type::FLOAT8 => self.bind_f64(ty)?.to_sql(ty, out),
            Type::JSON | Type::JSONB => self.bind_json()?.to_sql(ty, out),
            Type::UUID => self.bind_uuid(ty)?.to_sql(ty, out),
            Type::TIMESTAMPTZ => self.bind_timestamp(ty)?.to_sql(ty, out),
            Type::TIMESTAMP => self.bind_timestamp(ty)?.naive_utc().to_sql(ty, out),
            Type::DATE => self.bind_date(ty)?.to_sql(ty, out),
            Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => self.bind_text_array(ty)?.to_sql(ty, out),
            _ if is_text_type(ty) => self.bind_text(ty)?.to_sql(ty, out),
            _ => Err(self.mismatch(ty)),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i64::from(i16::from_sql(ty, raw)?)),
            Type::INT4 => Value::Int(i64::from(i32::from_sql(ty, raw)?)),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?.and_utc()),
            Type::DATE => Value::Text(NaiveDate::from_sql(ty, raw)?.to_string()),
            Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => {
                Value::TextArray(Vec::<String>::from_sql(ty, raw)?)
            }
            _ if is_text_type(ty) => Value::Text(String::from_sql(ty, raw)?),
            _ => return Err(format!("unsupported column type {ty}").into()),
        })
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Json(v) => v.serialize(serializer),
            Value::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
            Value::Uuid(u) => serializer.serialize_str(&u.to_string()),
            Value::TextArray(v) => v.serialize(serializer),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            other => Value::Json(other),
        }
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextArray(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion out of a [`Value`], used when mapping rows onto models.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn unexpected<T>(expected: &str, got: &Value) -> Result<T, String> {
    Err(format!("expected {expected}, got {}", got.kind()))
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Uuid(u) => Ok(u.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Timestamp(t) => Ok(t.to_rfc3339()),
            other => unexpected("text", other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Text(s) => s.trim().parse().map_err(|e| format!("{e}")),
            other => unexpected("integer", other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| format!("{e}"))
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i16::try_from(wide).map_err(|e| format!("{e}"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Text(s) => s.trim().parse().map_err(|e| format!("{e}")),
            other => unexpected("number", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => unexpected("bool", other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            Value::Text(s) => serde_json::from_str(s).map_err(|e| format!("{e}")),
            other => Ok(other.to_json()),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(t) => Ok(*t),
            Value::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| format!("{e}")),
            other => unexpected("timestamp", other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s).map_err(|e| format!("{e}")),
            other => unexpected("uuid", other),
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::TextArray(v) => Ok(v.clone()),
            other => unexpected("text[]", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
