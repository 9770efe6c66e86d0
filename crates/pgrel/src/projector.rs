//! Column lists for SELECT/INSERT/RETURNING.

use crate::ident::quote;
use crate::model::{Projection, TableSchema};

/// Declared columns of `schema` minus `excepts`, in declaration order.
pub fn project_plain<'a>(schema: &'a TableSchema, excepts: &[&str]) -> Vec<&'a str> {
    schema
        .columns
        .iter()
        .copied()
        .filter(|c| !excepts.contains(c))
        .collect()
}

/// Quoted, comma-joined plain column list: `"uid", "name"`.
pub fn column_string(schema: &TableSchema, excepts: &[&str]) -> String {
    project_plain(schema, excepts)
        .into_iter()
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Plain column list qualified with an alias: `p.uid, p.name`.
pub fn qualified_column_string(alias: &str, schema: &TableSchema, excepts: &[&str]) -> String {
    project_plain(schema, excepts)
        .into_iter()
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aliased projection for joined reads.
///
/// Each column is rendered as `"alias"."column" AS alias_column`, models in
/// the order given, columns in declaration order. `excepts` entries are
/// written `alias.column`.
pub fn project_aliased(projections: &[Projection], excepts: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for p in projections {
        for column in p.schema.columns {
            let key = format!("{}.{}", p.alias, column);
            if excepts.contains(&key.as_str()) {
                continue;
            }
            out.push(format!(
                "{}.{} AS {}_{}",
                quote(&p.alias),
                quote(column),
                p.alias,
                column
            ));
        }
    }
    out
}

pub fn aliased_column_string(projections: &[Projection], excepts: &[&str]) -> String {
    project_aliased(projections, excepts).join(", ")
}
