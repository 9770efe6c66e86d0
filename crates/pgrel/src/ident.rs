//! SQL identifier checks.
//!
//! Every schema, table, alias and column name that ends up in generated SQL
//! passes through this module. Names are restricted to `[A-Za-z_][A-Za-z0-9_]*`
//! and may be joined with dots (`schema.table`, `alias.column`). Values never
//! go through here; they are always bound as parameters.

use crate::error::{OrmError, OrmResult};

/// Whether `c` may appear inside an unquoted identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Validate one identifier segment and hand it back.
pub fn check(name: &str) -> OrmResult<&str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(OrmError::validation("Identifier cannot be empty")),
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        Some(c) => {
            return Err(OrmError::validation(format!(
                "Invalid identifier start character '{c}' in '{name}'"
            )));
        }
    }
    if let Some(bad) = chars.find(|c| !is_ident_char(*c)) {
        return Err(OrmError::validation(format!(
            "Invalid character '{bad}' in identifier '{name}'"
        )));
    }
    Ok(name)
}

/// Double-quote a single identifier segment.
pub fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// A dotted identifier such as `geo.province` or `p.created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse and validate a dotted identifier (at most three segments).
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::validation("Identifier cannot be empty"));
        }
        let parts = s
            .split('.')
            .map(|p| check(p).map(str::to_string))
            .collect::<OrmResult<Vec<_>>>()?;
        if parts.len() > 3 {
            return Err(OrmError::validation(format!(
                "Too many segments in identifier '{s}'"
            )));
        }
        Ok(Self { parts })
    }

    /// Build `schema.name`, validating both halves.
    pub fn qualified(schema: &str, name: &str) -> OrmResult<Self> {
        Ok(Self {
            parts: vec![check(schema)?.to_string(), check(name)?.to_string()],
        })
    }

    /// Whether the identifier carries a qualifier (`a.b`).
    pub fn is_qualified(&self) -> bool {
        self.parts.len() > 1
    }

    /// Last segment (the bare column or table name).
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render unquoted, dot-joined.
    pub fn to_sql(&self) -> String {
        self.parts.join(".")
    }

    /// Render with every segment double-quoted.
    pub fn to_quoted_sql(&self) -> String {
        self.parts
            .iter()
            .map(|p| quote(p))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_accepts_plain_names() {
        assert_eq!(check("created_at").unwrap(), "created_at");
        assert_eq!(check("_tmp1").unwrap(), "_tmp1");
    }

    #[test]
    fn check_rejects_injection() {
        assert!(check("").is_err());
        assert!(check("1abc").is_err());
        assert!(check("name; DROP TABLE x").is_err());
        assert!(check("na-me").is_err());
        assert!(check("a$b").is_err());
    }

    #[test]
    fn dotted_names() {
        let ident = Ident::parse("geo.province").unwrap();
        assert!(ident.is_qualified());
        assert_eq!(ident.name(), "province");
        assert_eq!(ident.to_sql(), "geo.province");
        assert_eq!(ident.to_quoted_sql(), r#""geo"."province""#);
    }

    #[test]
    fn dotted_names_reject_bad_segments() {
        assert!(Ident::parse("schema..table").is_err());
        assert!(Ident::parse("schema.").is_err());
        assert!(Ident::parse("a.b.c.d").is_err());
    }

    #[test]
    fn quote_escapes_embedded_quotes() {
        assert_eq!(quote("plain"), r#""plain""#);
        assert_eq!(quote(r#"has"q"#), r#""has""q""#);
    }
}
