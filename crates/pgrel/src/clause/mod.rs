//! WHERE / ORDER BY / LIMIT rendering.
//!
//! Conditions are written by callers as fragments numbered from `$1` against
//! their own argument list; rendering shifts them past whatever the statement
//! has already bound.

mod order;
mod pagination;

pub use order::{Order, order_sql};
pub use pagination::{PageWindow, Paging, paginate, sql_limit, total_pages};

use crate::error::{OrmError, OrmResult};
use crate::param::ParamBinder;
use crate::value::Value;

/// Row selection for reads, updates and deletes.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every row, stated explicitly.
    All,
    /// A complete predicate with no bound values.
    Raw(String),
    /// Fragments joined with `AND`, numbered against `args`.
    Structured {
        clauses: Vec<String>,
        args: Vec<Value>,
        order: Option<Order>,
        limit: Option<i64>,
    },
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Structured {
            clauses: Vec::new(),
            args: Vec::new(),
            order: None,
            limit: None,
        }
    }
}

impl Condition {
    /// Empty structured condition.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    /// Fragments plus the values their placeholders refer to.
    pub fn matching<I, S>(clauses: I, args: Vec<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Structured {
            clauses: clauses.into_iter().map(Into::into).collect(),
            args,
            order: None,
            limit: None,
        }
    }

    /// Add a fragment that binds nothing.
    pub fn and(mut self, clause: impl Into<String>) -> Self {
        if matches!(self, Condition::All) {
            self = Condition::new();
        }
        match &mut self {
            Condition::Structured { clauses, .. } => clauses.push(clause.into()),
            Condition::Raw(sql) => {
                let clause = clause.into();
                *sql = if sql.trim().is_empty() {
                    clause
                } else {
                    format!("{sql} AND {clause}")
                };
            }
            Condition::All => {}
        }
        self
    }

    /// Add `column <op> $n`, binding `value` as the next argument.
    pub fn and_cmp(mut self, column: &str, op: &str, value: impl Into<Value>) -> Self {
        if matches!(self, Condition::All | Condition::Raw(_)) {
            let previous = std::mem::take(&mut self);
            self = match previous {
                Condition::Raw(sql) if !sql.trim().is_empty() => Condition::matching([sql], Vec::new()),
                _ => Condition::new(),
            };
        }
        if let Condition::Structured { clauses, args, .. } = &mut self {
            args.push(value.into());
            clauses.push(format!("{column} {op} ${}", args.len()));
        }
        self
    }

    /// Add `column = $n`.
    pub fn and_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.and_cmp(column, "=", value)
    }

    /// Add `column IN ($n, ...)`. An empty list matches nothing.
    pub fn and_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if matches!(self, Condition::All | Condition::Raw(_)) {
            let previous = std::mem::take(&mut self);
            self = match previous {
                Condition::Raw(sql) if !sql.trim().is_empty() => Condition::matching([sql], Vec::new()),
                _ => Condition::new(),
            };
        }
        if let Condition::Structured { clauses, args, .. } = &mut self {
            let mut placeholders = Vec::new();
            for value in values {
                args.push(value.into());
                placeholders.push(format!("${}", args.len()));
            }
            if placeholders.is_empty() {
                clauses.push("FALSE".to_string());
            } else {
                clauses.push(format!("{column} IN ({})", placeholders.join(", ")));
            }
        }
        self
    }

    pub fn order(mut self, new_order: Order) -> Self {
        if let Condition::Structured { order, .. } = &mut self {
            *order = Some(new_order);
        }
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        if let Condition::Structured { limit, .. } = &mut self {
            *limit = Some(n);
        }
        self
    }

    /// Whether the condition selects nothing specific (and is not `All`).
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::All => false,
            Condition::Raw(sql) => sql.trim().is_empty(),
            Condition::Structured { clauses, .. } => clauses.iter().all(|c| c.trim().is_empty()),
        }
    }

    pub fn get_order(&self) -> Option<&Order> {
        match self {
            Condition::Structured { order, .. } => order.as_ref(),
            _ => None,
        }
    }

    pub fn get_limit(&self) -> Option<i64> {
        match self {
            Condition::Structured { limit, .. } => *limit,
            _ => None,
        }
    }

    pub fn args(&self) -> &[Value] {
        match self {
            Condition::Structured { args, .. } => args,
            _ => &[],
        }
    }
}

/// Render ` WHERE ...` into `binder`.
///
/// With `required`, an empty condition is a validation error; `Condition::All`
/// always renders nothing.
pub fn where_sql(
    condition: &Condition,
    binder: &mut ParamBinder,
    required: bool,
    operation: &str,
) -> OrmResult<String> {
    if condition.is_empty() {
        if required {
            return Err(OrmError::validation(format!(
                "{operation}: condition is required"
            )));
        }
        return Ok(String::new());
    }
    match condition {
        Condition::All => Ok(String::new()),
        Condition::Raw(sql) => Ok(format!(" WHERE {}", binder.merge(sql.trim(), &[]))),
        Condition::Structured { clauses, args, .. } => {
            let clauses: Vec<String> = clauses
                .iter()
                .filter(|c| !c.trim().is_empty())
                .cloned()
                .collect();
            let merged = binder.merge_all(&clauses, args);
            Ok(format!(" WHERE {}", merged.join(" AND ")))
        }
    }
}
