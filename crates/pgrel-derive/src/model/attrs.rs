//! `#[orm(...)]` attribute parsing for the Model derive.

use proc_macro2::Span;
use syn::{DeriveInput, Result};

use crate::sql_ident::{parse_order, parse_sql_ident, parse_sql_ident_list};

/// Struct-level attributes.
#[derive(Default)]
pub(super) struct StructAttrs {
    pub(super) table: Option<String>,
    pub(super) schema: Option<String>,
    pub(super) alias: Option<String>,
    pub(super) primary_key: Option<String>,
    pub(super) default_order: Option<String>,
    pub(super) ignore_on_save: Vec<String>,
    pub(super) ignore_on_insert: Vec<String>,
    pub(super) ignore_on_update: Vec<String>,
    /// Inherent method `fn(&mut self, is_new: bool)` run before writes.
    pub(super) before_save: Option<syn::Ident>,
}

impl syn::parse::Parse for StructAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = StructAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: syn::LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "table" => attrs.table = Some(parse_sql_ident(&value, "table")?),
                "schema" => attrs.schema = Some(parse_sql_ident(&value, "schema")?),
                "alias" => attrs.alias = Some(parse_sql_ident(&value, "alias")?),
                "primary_key" => {
                    attrs.primary_key = Some(parse_sql_ident(&value, "primary_key")?)
                }
                "default_order" => attrs.default_order = Some(parse_order(&value)?),
                "ignore_on_save" => {
                    attrs.ignore_on_save = parse_sql_ident_list(&value, "ignore_on_save")?
                }
                "ignore_on_insert" => {
                    attrs.ignore_on_insert = parse_sql_ident_list(&value, "ignore_on_insert")?
                }
                "ignore_on_update" => {
                    attrs.ignore_on_update = parse_sql_ident_list(&value, "ignore_on_update")?
                }
                "before_save" => {
                    attrs.before_save = Some(syn::parse_str(&value.value()).map_err(|e| {
                        syn::Error::new(value.span(), format!("invalid before_save method: {e}"))
                    })?)
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown orm attribute '{other}'"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

impl StructAttrs {
    /// Merge every `#[orm(...)]` on the struct.
    pub(super) fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut merged = StructAttrs::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            let parsed: StructAttrs = attr.parse_args()?;
            merged.table = parsed.table.or(merged.table);
            merged.schema = parsed.schema.or(merged.schema);
            merged.alias = parsed.alias.or(merged.alias);
            merged.primary_key = parsed.primary_key.or(merged.primary_key);
            merged.default_order = parsed.default_order.or(merged.default_order);
            merged.before_save = parsed.before_save.or(merged.before_save);
            merged.ignore_on_save.extend(parsed.ignore_on_save);
            merged.ignore_on_insert.extend(parsed.ignore_on_insert);
            merged.ignore_on_update.extend(parsed.ignore_on_update);
        }
        if merged.table.is_none() {
            return Err(syn::Error::new(
                Span::call_site(),
                "Model requires #[orm(table = \"table_name\")] attribute",
            ));
        }
        Ok(merged)
    }
}

/// Field-level attributes.
#[derive(Default)]
pub(super) struct FieldAttrs {
    pub(super) is_id: bool,
    /// Not a column; filled with `Default::default()` when read.
    pub(super) skip: bool,
    pub(super) column: Option<String>,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "id" => attrs.is_id = true,
                "skip" => attrs.skip = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attrs.column = Some(parse_sql_ident(&value, "column")?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown orm field attribute '{other}'"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

impl FieldAttrs {
    pub(super) fn from_field(field: &syn::Field) -> Result<Self> {
        let mut merged = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            let parsed: FieldAttrs = attr.parse_args()?;
            merged.is_id |= parsed.is_id;
            merged.skip |= parsed.skip;
            merged.column = parsed.column.or(merged.column);
        }
        Ok(merged)
    }
}
