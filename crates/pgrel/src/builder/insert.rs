use super::{ExtraColumn, Returning, SqlBuilder};
use crate::error::{OrmError, OrmResult};
use crate::model::TableSchema;
use crate::param::{ParamBinder, Statement};
use crate::record::Record;

/// INSERT builder for one row or a batch.
///
/// Columns come from the table descriptor in declaration order. Null and
/// empty-string attributes are left out; `0` and `false` are written. A batch
/// writes every column that is non-empty in at least one row, and a row
/// without a value for such a column gets `DEFAULT`.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    /// Schema-qualified table name
    table: String,
    schema: TableSchema,
    rows: Vec<Record>,
    /// Columns never written
    excepts: Vec<String>,
    extra_columns: Vec<ExtraColumn>,
    returning: Returning,
}

impl InsertBuilder {
    pub fn new(table: &str, schema: TableSchema) -> Self {
        Self {
            table: table.to_string(),
            schema,
            rows: Vec::new(),
            excepts: Vec::new(),
            extra_columns: Vec::new(),
            returning: Returning::None,
        }
    }

    /// Add a row.
    pub fn row(&mut self, record: Record) -> &mut Self {
        self.rows.push(record);
        self
    }

    /// Add several rows.
    pub fn rows(&mut self, records: impl IntoIterator<Item = Record>) -> &mut Self {
        self.rows.extend(records);
        self
    }

    pub fn except(&mut self, column: impl Into<String>) -> &mut Self {
        self.excepts.push(column.into());
        self
    }

    pub fn excepts<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excepts.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Write an extra column with every row.
    pub fn extra_column(&mut self, column: ExtraColumn) -> &mut Self {
        self.extra_columns.push(column);
        self
    }

    pub fn extra_columns(&mut self, columns: impl IntoIterator<Item = ExtraColumn>) -> &mut Self {
        self.extra_columns.extend(columns);
        self
    }

    pub fn returning(&mut self, returning: Returning) -> &mut Self {
        self.returning = returning;
        self
    }

    fn writable(&self, column: &str) -> bool {
        !self.schema.skipped_on_insert(column) && !self.excepts.iter().any(|e| e == column)
    }

    /// Writable columns with a non-empty value in any row.
    fn columns(&self) -> Vec<&'static str> {
        self.schema
            .columns
            .iter()
            .copied()
            .filter(|c| self.writable(c))
            .filter(|c| self.rows.iter().any(|row| !row.value(c).is_empty_for_insert()))
            .collect()
    }
}

impl SqlBuilder for InsertBuilder {
    fn build(&self) -> OrmResult<Statement> {
        if self.rows.is_empty() {
            return Err(OrmError::validation(format!(
                "Insert into {}: no rows given",
                self.table
            )));
        }

        let columns = self.columns();

        let mut names: Vec<&str> = columns.clone();
        for extra in &self.extra_columns {
            names.push(extra.column()?);
        }

        let mut binder = ParamBinder::new();
        let mut sql = format!("INSERT INTO {}", self.table);

        if names.is_empty() {
            if self.rows.len() > 1 {
                return Err(OrmError::validation(format!(
                    "Insert into {}: batch rows have no values",
                    self.table
                )));
            }
            sql.push_str(" DEFAULT VALUES");
        } else {
            let mut groups = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                let mut values: Vec<String> = columns
                    .iter()
                    .map(|c| match row.value(c) {
                        v if v.is_empty_for_insert() => "DEFAULT".to_string(),
                        v => binder.bind(v.clone()),
                    })
                    .collect();
                for extra in &self.extra_columns {
                    values.push(extra.render_value(&mut binder));
                }
                groups.push(format!("({})", values.join(", ")));
            }
            sql.push_str(&format!(
                "({}) VALUES {}",
                names.join(", "),
                groups.join(", ")
            ));
        }

        sql.push_str(&self.returning.render(&self.schema));
        sql.push(';');
        Ok(binder.finish(sql))
    }
}
