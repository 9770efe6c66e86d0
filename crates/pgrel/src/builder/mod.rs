//! Statement construction.
//!
//! Builders render a [`Statement`] from a table descriptor, records and a
//! [`Condition`](crate::clause::Condition). Placeholders are allocated while
//! rendering, so every statement carries exactly the arguments its SQL
//! refers to.
//!
//! - INSERT skips empty attributes and supports batches sharing one column set.
//! - UPDATE binds SET values first and shifts the condition after them.
//! - DELETE refuses to run without a condition unless given `Condition::All`.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

use crate::error::OrmResult;
use crate::ident::{self, quote};
use crate::model::TableSchema;
use crate::param::{ParamBinder, Statement};
use crate::value::Value;

/// Common interface of the statement builders.
pub trait SqlBuilder {
    /// Render SQL and arguments.
    fn build(&self) -> OrmResult<Statement>;

    /// Debug helper: the SQL text alone.
    fn to_sql(&self) -> OrmResult<String> {
        self.build().map(|s| s.sql)
    }
}

/// What a write statement hands back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Returning {
    #[default]
    None,
    /// Every declared column of the table.
    All,
    /// A literal clause, e.g. `"uid"`.
    Clause(String),
}

impl Returning {
    fn render(&self, schema: &TableSchema) -> String {
        match self {
            Returning::None => String::new(),
            Returning::All => format!(
                " RETURNING {}",
                schema
                    .columns
                    .iter()
                    .map(|c| quote(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Returning::Clause(clause) if clause.trim().is_empty() => String::new(),
            Returning::Clause(clause) => format!(" RETURNING {}", clause.trim()),
        }
    }
}

/// Value of an extra column.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    /// SQL expression inserted verbatim, e.g. `ST_MakePoint(105.8, 21.0)`.
    Expr(String),
    /// Bound parameter.
    Bind(Value),
}

/// A column written alongside the model's own attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraColumn {
    pub key: String,
    pub value: ExtraValue,
}

impl ExtraColumn {
    pub fn expr(key: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: ExtraValue::Expr(sql.into()),
        }
    }

    pub fn bind(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: ExtraValue::Bind(value.into()),
        }
    }

    /// Validated column name.
    pub(crate) fn column(&self) -> OrmResult<&str> {
        ident::check(&self.key)
    }

    /// SQL for the value, binding it when needed.
    pub(crate) fn render_value(&self, binder: &mut ParamBinder) -> String {
        match &self.value {
            ExtraValue::Expr(sql) => sql.clone(),
            ExtraValue::Bind(v) => binder.bind(v.clone()),
        }
    }
}
