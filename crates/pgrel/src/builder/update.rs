use super::{ExtraColumn, Returning, SqlBuilder};
use crate::clause::{Condition, where_sql};
use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::model::TableSchema;
use crate::param::{ParamBinder, Statement};
use crate::record::Record;
use crate::value::Value;

/// UPDATE builder.
///
/// SET values are bound first, then the condition's placeholders are
/// shifted past them.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    schema: TableSchema,
    /// Column assignments, usually a diff result
    changes: Record,
    extra_columns: Vec<ExtraColumn>,
    condition: Condition,
    returning: Returning,
}

impl UpdateBuilder {
    pub fn new(table: &str, schema: TableSchema) -> Self {
        Self {
            table: table.to_string(),
            schema,
            changes: Record::new(),
            extra_columns: Vec::new(),
            condition: Condition::new(),
            returning: Returning::None,
        }
    }

    /// Assign every column of `changes`.
    pub fn set_all(&mut self, changes: Record) -> &mut Self {
        for (column, value) in changes {
            self.changes.insert(column, value);
        }
        self
    }

    /// Assign one column.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.changes.insert(column, value);
        self
    }

    pub fn extra_column(&mut self, column: ExtraColumn) -> &mut Self {
        self.extra_columns.push(column);
        self
    }

    pub fn extra_columns(&mut self, columns: impl IntoIterator<Item = ExtraColumn>) -> &mut Self {
        self.extra_columns.extend(columns);
        self
    }

    /// Rows to update. Required.
    pub fn condition(&mut self, condition: Condition) -> &mut Self {
        self.condition = condition;
        self
    }

    pub fn returning(&mut self, returning: Returning) -> &mut Self {
        self.returning = returning;
        self
    }
}

impl SqlBuilder for UpdateBuilder {
    fn build(&self) -> OrmResult<Statement> {
        let mut binder = ParamBinder::new();
        let mut assignments = Vec::with_capacity(self.changes.len() + self.extra_columns.len());

        for (column, value) in self.changes.iter() {
            if self.schema.skipped_on_update(column) {
                continue;
            }
            let column = ident::check(column)?;
            assignments.push(format!("{column} = {}", binder.bind(value.clone())));
        }
        for extra in &self.extra_columns {
            let column = extra.column()?;
            assignments.push(format!("{column} = {}", extra.render_value(&mut binder)));
        }

        if assignments.is_empty() {
            return Err(OrmError::validation(format!(
                "Update {}: nothing to set",
                self.table
            )));
        }

        let where_ = where_sql(&self.condition, &mut binder, true, "update")?;
        let sql = format!(
            "UPDATE {} SET {}{}{};",
            self.table,
            assignments.join(", "),
            where_,
            self.returning.render(&self.schema)
        );
        Ok(binder.finish(sql))
    }
}
