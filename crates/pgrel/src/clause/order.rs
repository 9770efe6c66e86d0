use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use heck::ToSnakeCase;
use serde::{Deserialize, Deserializer};

/// Requested sort order.
///
/// - `Text("name,-created_at")`: comma separated, `-` prefix means DESC
/// - `List(["name", "-createdAt"])`: same tokens as a list
/// - `Map([("name", true)])`: field to ascending flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Text(String),
    List(Vec<String>),
    Map(Vec<(String, bool)>),
}

impl Order {
    pub fn text(s: impl Into<String>) -> Self {
        Order::Text(s.into())
    }

    /// Accepts a JSON string, array of strings or object of flags.
    ///
    /// Object keys keep their order. A flag is a boolean or a number, where
    /// any non-zero number means ascending.
    pub fn from_json(value: &serde_json::Value) -> OrmResult<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Order::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        OrmError::InvalidOrder(format!("order list entry {v} is not a string"))
                    })
                })
                .collect::<OrmResult<Vec<_>>>()
                .map(Order::List),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| match v {
                    serde_json::Value::Bool(asc) => Ok((k.clone(), *asc)),
                    serde_json::Value::Number(n) => {
                        Ok((k.clone(), n.as_f64().is_some_and(|f| f != 0.0)))
                    }
                    other => Err(OrmError::InvalidOrder(format!(
                        "order flag for '{k}' must be a boolean, got {other}"
                    ))),
                })
                .collect::<OrmResult<Vec<_>>>()
                .map(Order::Map),
            other => Err(OrmError::InvalidOrder(format!(
                "unsupported order type: {other}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Order {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Order::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// Snake-case each segment and validate the result.
fn column_of(field: &str) -> OrmResult<Ident> {
    let converted = field
        .split('.')
        .map(|seg| seg.trim().to_snake_case())
        .collect::<Vec<_>>()
        .join(".");
    Ident::parse(&converted)
        .map_err(|e| OrmError::InvalidOrder(format!("invalid order field '{field}': {e}")))
}

fn render(field: &str, ascending: bool, alias: Option<&str>) -> OrmResult<String> {
    let column = column_of(field)?;
    let dir = if ascending { "ASC" } else { "DESC" };
    Ok(match alias {
        Some(alias) if !column.is_qualified() => format!("{alias}.{column} {dir}"),
        _ => format!("{column} {dir}"),
    })
}

/// One token: `-field`, `field`, `field desc`, `field asc`.
fn render_token(token: &str, alias: Option<&str>) -> OrmResult<Option<String>> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    if let Some(field) = token.strip_prefix('-') {
        return render(field, false, alias).map(Some);
    }
    let mut words = token.split_whitespace();
    let field = words.next().unwrap_or_default();
    let ascending = match words.next().map(str::to_ascii_uppercase).as_deref() {
        None | Some("ASC") => true,
        Some("DESC") => false,
        Some(other) => {
            return Err(OrmError::InvalidOrder(format!(
                "invalid direction '{other}' in '{token}'"
            )));
        }
    };
    if let Some(extra) = words.next() {
        return Err(OrmError::InvalidOrder(format!(
            "unexpected '{extra}' in order '{token}'"
        )));
    }
    render(field, ascending, alias).map(Some)
}

/// Render ` ORDER BY ...`.
///
/// Falls back to `default_order` when `order` is `None`; renders nothing when
/// neither is set. Unqualified fields get `alias.` when an alias is given
/// (joined reads).
pub fn order_sql(
    order: Option<&Order>,
    default_order: Option<&str>,
    alias: Option<&str>,
) -> OrmResult<String> {
    let fallback;
    let order = match (order, default_order) {
        (Some(order), _) => order,
        (None, Some(default)) => {
            fallback = Order::Text(default.to_string());
            &fallback
        }
        (None, None) => return Ok(String::new()),
    };

    let parts = match order {
        Order::Text(s) => s
            .split(',')
            .map(|t| render_token(t, alias))
            .collect::<OrmResult<Vec<_>>>()?,
        Order::List(items) => items
            .iter()
            .map(|t| render_token(t, alias))
            .collect::<OrmResult<Vec<_>>>()?,
        Order::Map(fields) => fields
            .iter()
            .map(|(f, asc)| render(f, *asc, alias).map(Some))
            .collect::<OrmResult<Vec<_>>>()?,
    };
    let parts: Vec<String> = parts.into_iter().flatten().collect();
    if parts.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}
