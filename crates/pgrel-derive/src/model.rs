//! Model derive macro implementation.
//!
//! Generates `impl pgrel::Model`: the static `TableSchema`, `to_record`,
//! `from_record` and, when `before_save` names a method, the save hook.

mod attrs;

use attrs::{FieldAttrs, StructAttrs};

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

struct Column {
    ident: syn::Ident,
    name: String,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let attrs = StructAttrs::from_input(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Model can only be derived for structs",
            ));
        }
    };

    let mut columns = Vec::new();
    let mut skipped = Vec::new();
    let mut id_column: Option<String> = None;
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let field_attrs = FieldAttrs::from_field(field)?;
        if field_attrs.skip {
            skipped.push(ident);
            continue;
        }
        let column = field_attrs
            .column
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        if field_attrs.is_id {
            if id_column.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[orm(id)]",
                ));
            }
            id_column = Some(column.clone());
        }
        if columns.iter().any(|c: &Column| c.name == column) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate column '{column}'"),
            ));
        }
        columns.push(Column {
            ident,
            name: column,
        });
    }

    let table = attrs.table.unwrap_or_default();
    let alias = attrs.alias.unwrap_or_else(|| table.clone());
    let primary_key = match (id_column, attrs.primary_key) {
        (Some(id), Some(pk)) if id != pk => {
            return Err(syn::Error::new_spanned(
                &input,
                format!("#[orm(id)] marks '{id}' but primary_key is '{pk}'"),
            ));
        }
        (Some(id), _) => id,
        (None, Some(pk)) => pk,
        (None, None) => "uid".to_string(),
    };
    if !columns.iter().any(|c| c.name == primary_key) {
        return Err(syn::Error::new_spanned(
            &input,
            format!("primary key '{primary_key}' is not a field of the model"),
        ));
    }
    for listed in attrs
        .ignore_on_save
        .iter()
        .chain(&attrs.ignore_on_insert)
        .chain(&attrs.ignore_on_update)
    {
        if !columns.iter().any(|c| &c.name == listed) {
            return Err(syn::Error::new_spanned(
                &input,
                format!("ignored column '{listed}' is not a field of the model"),
            ));
        }
    }

    let schema = match &attrs.schema {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    };
    let default_order = match &attrs.default_order {
        Some(o) => quote! { ::core::option::Option::Some(#o) },
        None => quote! { ::core::option::Option::None },
    };
    let column_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let ignore_on_save = &attrs.ignore_on_save;
    let ignore_on_insert = &attrs.ignore_on_insert;
    let ignore_on_update = &attrs.ignore_on_update;

    let to_record = columns.iter().map(|c| {
        let ident = &c.ident;
        let column = &c.name;
        quote! {
            record.insert(#column, ::pgrel::Value::from(::core::clone::Clone::clone(&self.#ident)));
        }
    });
    let from_record = columns.iter().map(|c| {
        let ident = &c.ident;
        let column = &c.name;
        quote! { #ident: record.get_as(#column)? }
    });
    let defaults = skipped.iter().map(|ident| {
        quote! { #ident: ::core::default::Default::default() }
    });
    let before_save = attrs.before_save.as_ref().map(|method| {
        quote! {
            fn before_save(&mut self, is_new: bool) {
                self.#method(is_new)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::pgrel::Model for #name #ty_generics #where_clause {
            const SCHEMA: ::pgrel::TableSchema = ::pgrel::TableSchema {
                schema: #schema,
                table: #table,
                alias: #alias,
                primary_key: #primary_key,
                columns: &[#(#column_names),*],
                default_order: #default_order,
                ignore_on_save: &[#(#ignore_on_save),*],
                ignore_on_insert: &[#(#ignore_on_insert),*],
                ignore_on_update: &[#(#ignore_on_update),*],
            };

            fn to_record(&self) -> ::pgrel::Record {
                let mut record = ::pgrel::Record::new();
                #(#to_record)*
                record
            }

            fn from_record(record: &::pgrel::Record) -> ::pgrel::OrmResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#from_record,)*
                    #(#defaults,)*
                })
            }

            #before_save
        }
    })
}
