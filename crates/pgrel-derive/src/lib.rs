//! Derive macros for pgrel
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;
mod sql_ident;

/// Derive `pgrel::Model` for a struct.
///
/// # Example
///
/// ```ignore
/// use pgrel::Model;
///
/// #[derive(Debug, Clone, Model)]
/// #[orm(table = "profile", alias = "p", default_order = "-created_at")]
/// #[orm(ignore_on_save = "search_vector", ignore_on_update = "email")]
/// struct Profile {
///     #[orm(id)]
///     uid: Option<String>,
///     email: Option<String>,
///     #[orm(column = "user_name")]
///     username: Option<String>,
///     search_vector: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `const SCHEMA: TableSchema` with the columns in field order
/// - `fn to_record(&self) -> Record`
/// - `fn from_record(&Record) -> OrmResult<Self>`, decoding each field with `FromValue`
///
/// # Attributes
///
/// Struct: `table` (required), `schema`, `alias` (defaults to the table name),
/// `primary_key` (defaults to the `#[orm(id)]` field, else `uid`),
/// `default_order`, `ignore_on_save`, `ignore_on_insert`, `ignore_on_update`
/// (comma-separated column lists) and `before_save = "method"`, an inherent
/// `fn(&mut self, is_new: bool)` run before every write.
///
/// Field: `id`, `column = "name"`, `skip`.
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
