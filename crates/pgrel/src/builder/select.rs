use super::SqlBuilder;
use crate::clause::{Condition, Order, order_sql, sql_limit, where_sql};
use crate::error::OrmResult;
use crate::ident;
use crate::model::TableSchema;
use crate::param::{ParamBinder, Statement};
use crate::projector;

/// SELECT builder, also producing the matching COUNT and EXISTS forms.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    schema: TableSchema,
    /// `FROM table alias`
    alias: Option<String>,
    /// Explicit projection; defaults to the declared columns
    columns: Option<String>,
    excepts: Vec<String>,
    joins: Vec<String>,
    condition: Condition,
    /// Whether an empty condition is an error
    require_condition: bool,
    operation: &'static str,
    order: Option<Order>,
    use_default_order: bool,
    /// LIMIT/OFFSET tail from pagination
    page_sql: Option<String>,
    limit: Option<i64>,
}

impl SelectBuilder {
    pub fn new(table: &str, schema: TableSchema) -> Self {
        Self {
            table: table.to_string(),
            schema,
            alias: None,
            columns: None,
            excepts: Vec::new(),
            joins: Vec::new(),
            condition: Condition::All,
            require_condition: false,
            operation: "select",
            order: None,
            use_default_order: true,
            page_sql: None,
            limit: None,
        }
    }

    /// Read the table under an alias.
    pub fn alias(&mut self, alias: &str) -> &mut Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Use a pre-rendered projection instead of the declared columns.
    pub fn columns(&mut self, columns: impl Into<String>) -> &mut Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn except(&mut self, column: impl Into<String>) -> &mut Self {
        self.excepts.push(column.into());
        self
    }

    /// Append a join fragment, e.g. `LEFT JOIN geo.district d ON d.uid = w.district_id`.
    pub fn join(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.joins.push(fragment.into());
        self
    }

    pub fn joins(&mut self, fragments: impl IntoIterator<Item = String>) -> &mut Self {
        self.joins.extend(fragments);
        self
    }

    /// Filter rows. With `required`, an empty condition fails the build.
    pub fn condition(&mut self, condition: Condition, required: bool) -> &mut Self {
        self.condition = condition;
        self.require_condition = required;
        self
    }

    /// Name used in validation errors.
    pub fn operation(&mut self, name: &'static str) -> &mut Self {
        self.operation = name;
        self
    }

    /// Explicit order; overrides the condition's own order.
    pub fn order(&mut self, order: Option<Order>) -> &mut Self {
        if order.is_some() {
            self.order = order;
        }
        self
    }

    /// Skip the table's default order when no order is given.
    pub fn without_default_order(&mut self) -> &mut Self {
        self.use_default_order = false;
        self
    }

    /// LIMIT/OFFSET tail produced by [`paginate`](crate::clause::paginate).
    pub fn page(&mut self, sql: Option<String>) -> &mut Self {
        self.page_sql = sql;
        self
    }

    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    fn from_sql(&self) -> OrmResult<String> {
        let mut from = format!(" FROM {}", self.table);
        if let Some(alias) = &self.alias {
            from.push(' ');
            from.push_str(ident::check(alias)?);
        }
        for join in &self.joins {
            from.push(' ');
            from.push_str(join.trim());
        }
        Ok(from)
    }

    fn projection(&self) -> String {
        match &self.columns {
            Some(columns) => columns.clone(),
            None => {
                let excepts: Vec<&str> = self.excepts.iter().map(String::as_str).collect();
                projector::column_string(&self.schema, &excepts)
            }
        }
    }

    fn where_into(&self, binder: &mut ParamBinder) -> OrmResult<String> {
        where_sql(&self.condition, binder, self.require_condition, self.operation)
    }

    /// `SELECT COUNT(*) AS total ...` sharing this builder's FROM and WHERE.
    pub fn count(&self) -> OrmResult<Statement> {
        let mut binder = ParamBinder::new();
        let from = self.from_sql()?;
        let where_ = self.where_into(&mut binder)?;
        Ok(binder.finish(format!("SELECT COUNT(*) AS total{from}{where_};")))
    }

    /// `SELECT EXISTS (SELECT 1 ...) AS exists` sharing FROM and WHERE.
    pub fn exists(&self) -> OrmResult<Statement> {
        let mut binder = ParamBinder::new();
        let from = self.from_sql()?;
        let where_ = self.where_into(&mut binder)?;
        Ok(binder.finish(format!(
            "SELECT EXISTS (SELECT 1{from}{where_}) AS exists;"
        )))
    }
}

impl SqlBuilder for SelectBuilder {
    fn build(&self) -> OrmResult<Statement> {
        let mut binder = ParamBinder::new();
        let from = self.from_sql()?;
        let where_ = self.where_into(&mut binder)?;

        let order = self.order.as_ref().or(self.condition.get_order());
        let default_order = if self.use_default_order {
            self.schema.default_order
        } else {
            None
        };
        let order_alias = if self.joins.is_empty() {
            None
        } else {
            self.alias.as_deref()
        };
        let order_by = order_sql(order, default_order, order_alias)?;

        let tail = match &self.page_sql {
            Some(page) => page.clone(),
            None => sql_limit(self.limit.or(self.condition.get_limit())),
        };

        let sql = format!(
            "SELECT {}{from}{where_}{order_by}{tail};",
            self.projection()
        );
        Ok(binder.finish(sql))
    }
}
