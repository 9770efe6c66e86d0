use std::collections::HashSet;

use syn::{Error, LitStr, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single identifier such as a table or column name.
pub(crate) fn parse_sql_ident(lit: &LitStr, what: &str) -> Result<String> {
    let s = lit.value().trim().to_string();
    if s.is_empty() {
        return Err(Error::new(lit.span(), format!("{what} must not be empty")));
    }
    if !is_valid_sql_ident(&s) {
        return Err(Error::new(
            lit.span(),
            format!("{what} must be a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(s)
}

/// A comma-separated column list, e.g. `"search_vector, gis_geometry"`.
pub(crate) fn parse_sql_ident_list(lit: &LitStr, what: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut cols = Vec::new();
    for col in lit.value().split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !is_valid_sql_ident(col) {
            return Err(Error::new(
                lit.span(),
                format!("{what} contains invalid SQL identifier '{col}'"),
            ));
        }
        if !seen.insert(col.to_string()) {
            return Err(Error::new(
                lit.span(),
                format!("{what} contains duplicate column '{col}'"),
            ));
        }
        cols.push(col.to_string());
    }
    Ok(cols)
}

/// An order string such as `"name,-created_at"`; each field may be dotted.
pub(crate) fn parse_order(lit: &LitStr) -> Result<String> {
    let raw = lit.value();
    for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let field = token
            .strip_prefix('-')
            .unwrap_or(token)
            .split_whitespace()
            .next()
            .unwrap_or_default();
        if field.is_empty() || !field.split('.').all(is_valid_sql_ident) {
            return Err(Error::new(
                lit.span(),
                format!("default_order contains invalid field '{token}'"),
            ));
        }
    }
    Ok(raw)
}
