//! Static table descriptors and the model contract.

use crate::error::{OrmError, OrmResult};
use crate::ident::{self, Ident};
use crate::record::Record;
use crate::value::Value;

/// Compile-time description of a table, usually produced by `#[derive(Model)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Schema name; `None` falls back to the adapter's configured schema.
    pub schema: Option<&'static str>,
    pub table: &'static str,
    /// Alias used when the table takes part in a join.
    pub alias: &'static str,
    pub primary_key: &'static str,
    /// Ordered column list.
    pub columns: &'static [&'static str],
    /// Order applied when a read does not name one, e.g. `"-created_at"`.
    pub default_order: Option<&'static str>,
    /// Never written, neither on insert nor on update.
    pub ignore_on_save: &'static [&'static str],
    pub ignore_on_insert: &'static [&'static str],
    pub ignore_on_update: &'static [&'static str],
}

impl TableSchema {
    /// A descriptor with `uid` as primary key and no ignore lists.
    pub const fn new(
        table: &'static str,
        alias: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            schema: None,
            table,
            alias,
            primary_key: "uid",
            columns,
            default_order: None,
            ignore_on_save: &[],
            ignore_on_insert: &[],
            ignore_on_update: &[],
        }
    }

    /// `schema.table`, with the model's own schema taking precedence.
    pub fn full_table_name(&self, default_schema: &str) -> String {
        format!("{}.{}", self.schema.unwrap_or(default_schema), self.table)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    pub(crate) fn skipped_on_insert(&self, column: &str) -> bool {
        self.ignore_on_save.contains(&column) || self.ignore_on_insert.contains(&column)
    }

    pub(crate) fn skipped_on_update(&self, column: &str) -> bool {
        self.ignore_on_save.contains(&column) || self.ignore_on_update.contains(&column)
    }

    /// Check every name that will be spliced into SQL.
    pub fn validate(&self) -> OrmResult<()> {
        if let Some(schema) = self.schema {
            ident::check(schema)?;
        }
        ident::check(self.table)?;
        ident::check(self.alias)?;
        ident::check(self.primary_key)?;
        if self.columns.is_empty() {
            return Err(OrmError::validation(format!(
                "Table '{}' declares no columns",
                self.table
            )));
        }
        for column in self.columns {
            ident::check(column)?;
        }
        if !self.has_column(self.primary_key) {
            return Err(OrmError::validation(format!(
                "Primary key '{}' is not a column of '{}'",
                self.primary_key, self.table
            )));
        }
        Ok(())
    }

    /// Validated `schema.table` identifier.
    pub fn ident(&self, default_schema: &str) -> OrmResult<Ident> {
        Ident::qualified(self.schema.unwrap_or(default_schema), self.table)
    }
}

/// A typed row of one table.
///
/// `to_record` exposes every declared column; `from_record` maps a row back.
pub trait Model: Sized + Send + Sync + 'static {
    const SCHEMA: TableSchema;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> OrmResult<Self>;

    /// Called before the model is written. `is_new` is true for inserts.
    fn before_save(&mut self, is_new: bool) {
        let _ = is_new;
    }

    /// Primary key value, `Value::Null` when unset.
    fn primary_key(&self) -> Value {
        self.to_record()
            .get(Self::SCHEMA.primary_key)
            .cloned()
            .unwrap_or_default()
    }
}

/// A table taking part in a joined read, with the alias it is read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub alias: String,
    pub schema: TableSchema,
}

impl Projection {
    pub fn new(alias: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            alias: alias.into(),
            schema,
        }
    }

    /// Project a model under its own alias.
    pub fn of<M: Model>() -> Self {
        Self::new(M::SCHEMA.alias, M::SCHEMA)
    }
}
