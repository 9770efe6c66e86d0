use super::{Returning, SqlBuilder};
use crate::clause::{Condition, where_sql};
use crate::error::OrmResult;
use crate::model::TableSchema;
use crate::param::{ParamBinder, Statement};

/// DELETE builder. A condition is mandatory; pass `Condition::All` to empty
/// the table.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    schema: TableSchema,
    condition: Condition,
    returning: Returning,
}

impl DeleteBuilder {
    pub fn new(table: &str, schema: TableSchema) -> Self {
        Self {
            table: table.to_string(),
            schema,
            condition: Condition::new(),
            returning: Returning::None,
        }
    }

    pub fn condition(&mut self, condition: Condition) -> &mut Self {
        self.condition = condition;
        self
    }

    pub fn returning(&mut self, returning: Returning) -> &mut Self {
        self.returning = returning;
        self
    }
}

impl SqlBuilder for DeleteBuilder {
    fn build(&self) -> OrmResult<Statement> {
        let mut binder = ParamBinder::new();
        let where_ = where_sql(&self.condition, &mut binder, true, "delete")?;
        let sql = format!(
            "DELETE FROM {}{}{};",
            self.table,
            where_,
            self.returning.render(&self.schema)
        );
        Ok(binder.finish(sql))
    }
}
