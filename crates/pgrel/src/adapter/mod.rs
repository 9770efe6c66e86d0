//! Generic CRUD, pagination and relation reads for one [`Model`].
//!
//! ```ignore
//! let profiles = RelationalAdapter::<Profile>::builder(executor)
//!     .schema("public")
//!     .hook(ProfileUniqueness)
//!     .build()?;
//!
//! let saved = profiles.insert_one(profile, WriteOptions::default()).await?;
//! let page = profiles
//!     .get_pagination(Condition::new().and_eq("status", status::ACTIVE), &Paging::new(1, 20))
//!     .await?;
//! ```
//!
//! Inserts run `before_save(true)`, stamp the audit columns, then the
//! registered [`WriteHook`]s in order. Updates are diff-based: only columns
//! whose values moved are written, and an empty diff issues no statement.

mod hooks;
mod page;
mod relation;

#[cfg(test)]
mod tests;

pub use hooks::WriteHook;
pub use page::{Page, PageMeta};
pub use relation::{JoinSpec, Relation, RelationOptions, RelationProvider, StaticRelations};

use crate::builder::{
    DeleteBuilder, ExtraColumn, InsertBuilder, Returning, SelectBuilder, SqlBuilder, UpdateBuilder,
};
use crate::clause::{Condition, Order, Paging, paginate, total_pages};
use crate::client::QueryOutput;
use crate::config::DEFAULT_SCHEMA;
use crate::diff::{DiffOptions, diff_for};
use crate::error::{OrmError, OrmResult};
use crate::executor::QueryExecutor;
use crate::model::{Model, TableSchema};
use crate::param::Statement;
use crate::projector;
use crate::record::Record;
use crate::status;
use crate::value::Value;
use chrono::Utc;
use std::sync::Arc;

const CREATED_COLUMNS: &[&str] = &["created_at", "created"];
const UPDATED_COLUMNS: &[&str] = &["updated_at", "updated"];

/// Builds the filter of a `filter`/`filter_pagination` read.
pub trait FilterParams: Send + Sync {
    /// Condition over the table, with columns qualified by `alias` when given.
    fn filter(&self, alias: Option<&str>) -> Condition;
}

/// Options of an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Defaults to [`Returning::All`].
    pub returning: Returning,
    /// Columns never written.
    pub excepts: Vec<String>,
    pub extra_columns: Vec<ExtraColumn>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            returning: Returning::All,
            excepts: Vec::new(),
            extra_columns: Vec::new(),
        }
    }
}

impl WriteOptions {
    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = returning;
        self
    }

    pub fn except(mut self, column: impl Into<String>) -> Self {
        self.excepts.push(column.into());
        self
    }

    pub fn extra_column(mut self, column: ExtraColumn) -> Self {
        self.extra_columns.push(column);
        self
    }
}

/// Options of [`RelationalAdapter::update_one`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    pub write: WriteOptions,
    /// Persisted row to diff against; loaded by primary key when absent.
    pub prior: Option<Record>,
    pub diff: DiffOptions,
}

impl UpdateOptions {
    pub fn prior(mut self, row: Record) -> Self {
        self.prior = Some(row);
        self
    }

    pub fn write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    pub fn diff(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }
}

struct Inner<M: Model> {
    executor: QueryExecutor,
    table: String,
    hooks: Vec<Arc<dyn WriteHook<M>>>,
    relations: Option<Arc<dyn RelationProvider>>,
}

/// Builder for [`RelationalAdapter`].
pub struct AdapterBuilder<M: Model> {
    executor: QueryExecutor,
    schema: String,
    hooks: Vec<Arc<dyn WriteHook<M>>>,
    relations: Option<Arc<dyn RelationProvider>>,
}

impl<M: Model> AdapterBuilder<M> {
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            executor,
            schema: DEFAULT_SCHEMA.to_string(),
            hooks: Vec::new(),
            relations: None,
        }
    }

    /// Schema for a model that does not name its own.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Append a write hook. Hooks run in the order they are added.
    pub fn hook<H: WriteHook<M> + 'static>(self, hook: H) -> Self {
        self.hook_arc(Arc::new(hook))
    }

    pub fn hook_arc(mut self, hook: Arc<dyn WriteHook<M>>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Enable the `*_relation` reads.
    pub fn relations<R: RelationProvider + 'static>(mut self, provider: R) -> Self {
        self.relations = Some(Arc::new(provider));
        self
    }

    pub fn build(self) -> OrmResult<RelationalAdapter<M>> {
        M::SCHEMA.validate()?;
        let table = M::SCHEMA.ident(&self.schema)?.to_sql();
        Ok(RelationalAdapter {
            inner: Arc::new(Inner {
                executor: self.executor,
                table,
                hooks: self.hooks,
                relations: self.relations,
            }),
        })
    }
}

/// CRUD façade over the table of `M`. Cheap to clone.
pub struct RelationalAdapter<M: Model> {
    inner: Arc<Inner<M>>,
}

impl<M: Model> Clone for RelationalAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Model> std::fmt::Debug for RelationalAdapter<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalAdapter")
            .field("table", &self.inner.table)
            .field("hooks", &self.inner.hooks.len())
            .field("relations", &self.inner.relations.is_some())
            .finish()
    }
}

fn models_from<M: Model>(rows: &[Record]) -> OrmResult<Vec<M>> {
    rows.iter().map(M::from_record).collect()
}

fn first_column<'a>(schema: &TableSchema, candidates: &[&'a str]) -> Option<&'a str> {
    candidates.iter().copied().find(|c| schema.has_column(c))
}

/// Fill the creation and update timestamps of a new model, and `updated_by`
/// from `created_by`. Values already set are kept.
fn stamp_insert<M: Model>(model: M) -> OrmResult<M> {
    let schema = M::SCHEMA;
    let mut record = model.to_record();
    let mut changed = false;
    let now = Value::Timestamp(Utc::now());

    let created = first_column(&schema, CREATED_COLUMNS).map(|column| {
        let value = record.value(column).clone();
        if value.is_blank() {
            record.insert(column, now.clone());
            changed = true;
            now.clone()
        } else {
            value
        }
    });

    if let Some(column) = first_column(&schema, UPDATED_COLUMNS) {
        let value = created.unwrap_or_else(|| now.clone());
        if !record.value(column).same_as(&value) {
            record.insert(column, value);
            changed = true;
        }
    }

    if schema.has_column("updated_by") && record.value("updated_by").is_blank() {
        let creator = record.value("created_by").clone();
        if !creator.is_blank() {
            record.insert("updated_by", creator);
            changed = true;
        }
    }

    if changed {
        M::from_record(&record)
    } else {
        Ok(model)
    }
}

impl<M: Model> RelationalAdapter<M> {
    pub fn builder(executor: QueryExecutor) -> AdapterBuilder<M> {
        AdapterBuilder::new(executor)
    }

    /// Builder bound to a registered profile's pool and schema.
    #[cfg(feature = "pool")]
    pub fn from_registry(
        registry: &crate::pool::PoolRegistry,
        profile: &str,
    ) -> OrmResult<AdapterBuilder<M>> {
        Ok(AdapterBuilder::new(registry.executor(profile)?).schema(registry.schema(profile)?))
    }

    /// Resolved `schema.table`.
    pub fn table_name(&self) -> &str {
        &self.inner.table
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.inner.executor
    }

    async fn run(&self, stmt: &Statement) -> OrmResult<QueryOutput> {
        self.inner.executor.execute(stmt).await
    }

    fn select(&self) -> SelectBuilder {
        SelectBuilder::new(&self.inner.table, M::SCHEMA)
    }

    fn pk_condition(&self, pk: Value, operation: &str) -> OrmResult<Condition> {
        if pk.is_blank() {
            return Err(OrmError::validation(format!(
                "{operation}: empty primary key for table {}",
                self.inner.table
            )));
        }
        Ok(Condition::new().and_eq(M::SCHEMA.primary_key, pk))
    }

    async fn after_write(&self, model: &M) -> OrmResult<()> {
        for hook in &self.inner.hooks {
            hook.after_write(model).await?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------------

    /// Insert one model and return it as stored.
    ///
    /// With [`Returning::All`] the returned model is read back from the
    /// `RETURNING` row; otherwise it is the stamped input.
    pub async fn insert_one(&self, mut model: M, opts: WriteOptions) -> OrmResult<M> {
        model.before_save(true);
        let mut model = stamp_insert(model)?;

        let mut extras = opts.extra_columns;
        for hook in &self.inner.hooks {
            extras.extend(hook.before_insert(&mut model).await?);
        }

        let mut ib = InsertBuilder::new(&self.inner.table, M::SCHEMA);
        ib.row(model.to_record())
            .excepts(opts.excepts)
            .extra_columns(extras)
            .returning(opts.returning.clone());
        let out = self.run(&ib.build()?).await?;

        let written = match (&opts.returning, out.into_first()) {
            (Returning::All, Some(row)) => M::from_record(&row)?,
            _ => model,
        };
        tracing::info!(table = %self.inner.table, "inserted 1 row");
        self.after_write(&written).await?;
        Ok(written)
    }

    /// Insert several models in one statement.
    ///
    /// Rows missing a value another row has get `DEFAULT`. Extra columns
    /// contributed by hooks must be identical for all rows.
    pub async fn insert_many(&self, models: Vec<M>, opts: WriteOptions) -> OrmResult<Vec<M>> {
        if models.is_empty() {
            return Err(OrmError::validation(format!(
                "Empty input models. Cannot insert into table {}",
                self.inner.table
            )));
        }

        let mut prepared = Vec::with_capacity(models.len());
        let mut hook_extras: Option<Vec<ExtraColumn>> = None;
        for mut model in models {
            model.before_save(true);
            let mut model = stamp_insert(model)?;
            let mut extras = Vec::new();
            for hook in &self.inner.hooks {
                extras.extend(hook.before_insert(&mut model).await?);
            }
            match &hook_extras {
                None => hook_extras = Some(extras),
                Some(first) if *first == extras => {}
                Some(_) => {
                    return Err(OrmError::validation(
                        "Write hooks produced different extra columns within one batch",
                    ));
                }
            }
            prepared.push(model);
        }

        let mut ib = InsertBuilder::new(&self.inner.table, M::SCHEMA);
        ib.rows(prepared.iter().map(M::to_record))
            .excepts(opts.excepts)
            .extra_columns(opts.extra_columns)
            .extra_columns(hook_extras.unwrap_or_default())
            .returning(opts.returning.clone());
        let out = self.run(&ib.build()?).await?;

        let written = match opts.returning {
            Returning::All if !out.rows.is_empty() => models_from::<M>(&out.rows)?,
            _ => prepared,
        };
        tracing::info!(table = %self.inner.table, count = written.len(), "inserted rows");
        for model in &written {
            self.after_write(model).await?;
        }
        Ok(written)
    }

    /// Write the columns of `model` that differ from the persisted row.
    ///
    /// Fails with [`OrmError::NotFound`] when no row has the model's primary
    /// key. When nothing changed the persisted row is returned and no UPDATE
    /// is issued.
    pub async fn update_one(&self, mut model: M, opts: UpdateOptions) -> OrmResult<M> {
        let pk = model.primary_key();
        let condition = self.pk_condition(pk.clone(), "update_one")?;

        let prior = match opts.prior {
            Some(row) => row,
            None => self.load_by_pk(pk.clone()).await?.ok_or_else(|| {
                OrmError::not_found(format!(
                    "No row in {} with {} = {}",
                    self.inner.table,
                    M::SCHEMA.primary_key,
                    pk.display()
                ))
            })?,
        };

        model.before_save(false);
        let mut extras = opts.write.extra_columns;
        for hook in &self.inner.hooks {
            extras.extend(hook.before_update(&mut model, &prior).await?);
        }

        let updated_column = first_column(&M::SCHEMA, UPDATED_COLUMNS);
        let mut diff_opts = opts.diff;
        diff_opts.excepts.extend(opts.write.excepts);
        if let Some(column) = updated_column {
            diff_opts.excepts.push(column.to_string());
        }
        let mut changes = diff_for(&M::SCHEMA, &prior, &model.to_record(), &diff_opts)?;

        if changes.is_empty() && extras.is_empty() {
            tracing::info!(table = %self.inner.table, "nothing new to update");
            return M::from_record(&prior);
        }
        if let Some(column) = updated_column {
            changes.insert(column, Value::Timestamp(Utc::now()));
        }
        tracing::debug!(
            table = %self.inner.table,
            columns = ?changes.keys().collect::<Vec<_>>(),
            "updating changed columns"
        );

        let mut ub = UpdateBuilder::new(&self.inner.table, M::SCHEMA);
        ub.set_all(changes)
            .extra_columns(extras)
            .condition(condition)
            .returning(opts.write.returning.clone());
        let out = self.run(&ub.build()?).await?;

        let written = match opts.write.returning {
            Returning::All => {
                let row = out.into_first().ok_or_else(|| {
                    OrmError::not_found(format!(
                        "Row in {} disappeared during update",
                        self.inner.table
                    ))
                })?;
                M::from_record(&row)?
            }
            _ => model,
        };
        tracing::info!(table = %self.inner.table, "updated 1 row");
        self.after_write(&written).await?;
        Ok(written)
    }

    /// Set `changes` on every row matching `condition`; returns the affected count.
    pub async fn update_where(&self, changes: Record, condition: Condition) -> OrmResult<u64> {
        let mut ub = UpdateBuilder::new(&self.inner.table, M::SCHEMA);
        ub.set_all(changes).condition(condition);
        let out = self.run(&ub.build()?).await?;
        tracing::info!(table = %self.inner.table, count = out.row_count, "updated rows");
        Ok(out.row_count)
    }

    /// Update when the model carries a primary key, insert otherwise.
    pub async fn upsert_one(&self, model: M, opts: UpdateOptions) -> OrmResult<M> {
        if model.primary_key().is_blank() {
            self.insert_one(model, opts.write).await
        } else {
            self.update_one(model, opts).await
        }
    }

    /// Return the row with the model's primary key, inserting the model when
    /// there is none or the model has no key.
    pub async fn get_or_create(&self, model: M) -> OrmResult<M> {
        let pk = model.primary_key();
        if !pk.is_blank() {
            if let Some(found) = self.get_one_by_pk(pk).await? {
                return Ok(found);
            }
        }
        self.insert_one(model, WriteOptions::default()).await
    }

    /// Delete every row matching `condition`. `Condition::All` empties the table.
    pub async fn delete_many(&self, condition: Condition) -> OrmResult<u64> {
        let mut db = DeleteBuilder::new(&self.inner.table, M::SCHEMA);
        db.condition(condition);
        let out = self.run(&db.build()?).await?;
        tracing::info!(table = %self.inner.table, count = out.row_count, "deleted rows");
        Ok(out.row_count)
    }

    pub async fn delete_by_pk(&self, pk: impl Into<Value>) -> OrmResult<u64> {
        let condition = self.pk_condition(pk.into(), "delete_by_pk")?;
        self.delete_many(condition).await
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    async fn load_by_pk(&self, pk: Value) -> OrmResult<Option<Record>> {
        let condition = self.pk_condition(pk, "get_one_by_pk")?;
        let mut sb = self.select();
        sb.condition(condition, true)
            .operation("get_one_by_pk")
            .without_default_order()
            .limit(1);
        Ok(self.run(&sb.build()?).await?.into_first())
    }

    /// First row matching a required condition.
    pub async fn get_one(&self, condition: Condition) -> OrmResult<Option<M>> {
        let mut sb = self.select();
        sb.condition(condition, true).operation("get_one").limit(1);
        self.run(&sb.build()?)
            .await?
            .first()
            .map(M::from_record)
            .transpose()
    }

    pub async fn get_one_by_pk(&self, pk: impl Into<Value>) -> OrmResult<Option<M>> {
        self.load_by_pk(pk.into())
            .await?
            .as_ref()
            .map(M::from_record)
            .transpose()
    }

    /// Rows whose primary key is in `pks`.
    pub async fn get_many<I, V>(&self, pks: I) -> OrmResult<Vec<M>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let condition = self.pk_list_condition(pks, None, "get_many")?;
        self.get_all_condition(condition).await
    }

    fn pk_list_condition<I, V>(
        &self,
        pks: I,
        alias: Option<&str>,
        operation: &str,
    ) -> OrmResult<Condition>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let pks: Vec<Value> = pks.into_iter().map(Into::into).collect();
        if pks.is_empty() {
            return Err(OrmError::validation(format!(
                "{operation}: empty primary key list for table {}",
                self.inner.table
            )));
        }
        let column = match alias {
            Some(alias) => format!("{alias}.{}", M::SCHEMA.primary_key),
            None => M::SCHEMA.primary_key.to_string(),
        };
        Ok(Condition::new().and_in(&column, pks))
    }

    /// Every row matching a required condition.
    pub async fn get_all_condition(&self, condition: Condition) -> OrmResult<Vec<M>> {
        let mut sb = self.select();
        sb.condition(condition, true).operation("get_all_condition");
        models_from(&self.run(&sb.build()?).await?.rows)
    }

    /// Every row, in `order` or the table's default order.
    pub async fn get_all(&self, order: Option<Order>) -> OrmResult<Vec<M>> {
        let mut sb = self.select();
        sb.order(order);
        models_from(&self.run(&sb.build()?).await?.rows)
    }

    pub async fn get_all_order(&self, order: Order) -> OrmResult<Vec<M>> {
        self.get_all(Some(order)).await
    }

    /// Every row with the given status code.
    pub async fn get_all_status(&self, status: i64, order: Option<Order>) -> OrmResult<Vec<M>> {
        if !M::SCHEMA.has_column(status::STATUS_COLUMN) {
            return Err(OrmError::validation(format!(
                "Table {} has no status column",
                self.inner.table
            )));
        }
        let mut sb = self.select();
        sb.condition(Condition::new().and_eq(status::STATUS_COLUMN, status), true)
            .operation("get_all_status")
            .order(order);
        models_from(&self.run(&sb.build()?).await?.rows)
    }

    pub async fn get_all_active(&self, order: Option<Order>) -> OrmResult<Vec<M>> {
        self.get_all_status(status::ACTIVE, order).await
    }

    pub async fn get_all_inactive(&self, order: Option<Order>) -> OrmResult<Vec<M>> {
        self.get_all_status(status::INACTIVE, order).await
    }

    pub async fn get_all_disabled(&self, order: Option<Order>) -> OrmResult<Vec<M>> {
        self.get_all_status(status::DISABLED, order).await
    }

    pub async fn get_all_deleted(&self, order: Option<Order>) -> OrmResult<Vec<M>> {
        self.get_all_status(status::DELETED, order).await
    }

    /// Whether any row matches a required condition.
    pub async fn exists(&self, condition: Condition) -> OrmResult<bool> {
        let mut sb = self.select();
        sb.condition(condition, true).operation("exists");
        let out = self.run(&sb.exists()?).await?;
        match out.first() {
            Some(row) => row.get_as::<Option<bool>>("exists").map(|b| b.unwrap_or(false)),
            None => Ok(false),
        }
    }

    /// Number of rows matching `condition`; an empty condition counts every row.
    pub async fn count(&self, condition: Condition) -> OrmResult<i64> {
        let mut sb = self.select();
        sb.condition(condition, false).operation("count");
        self.count_of(&sb).await
    }

    async fn count_of(&self, sb: &SelectBuilder) -> OrmResult<i64> {
        let out = self.run(&sb.count()?).await?;
        match out.first() {
            Some(row) => row.get_as::<Option<i64>>("total").map(|n| n.unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Count, then fetch the requested page with the same WHERE and args.
    ///
    /// A page starting past the last row skips the fetch.
    async fn page_of(&self, mut sb: SelectBuilder, paging: &Paging) -> OrmResult<Page<Record>> {
        let window = paginate(paging);
        let total = self.count_of(&sb).await?;
        let page_size = paging.size();
        let mut meta = PageMeta {
            page_size: page_size.unwrap_or(total),
            page_number: window.page_number,
            total_pages: total_pages(total, page_size),
            total,
            count: 0,
        };
        if window.row_offset > total {
            tracing::debug!(
                table = %self.inner.table,
                row_offset = window.row_offset,
                total,
                "page starts past the last row"
            );
            return Ok(Page {
                data: Vec::new(),
                meta,
            });
        }

        sb.order(paging.order.clone()).page(window.sql);
        let rows = self.run(&sb.build()?).await?.rows;
        meta.count = rows.len() as i64;
        Ok(Page { data: rows, meta })
    }

    /// One page of the rows matching `condition` (an empty condition means all rows).
    pub async fn get_pagination(&self, condition: Condition, paging: &Paging) -> OrmResult<Page<M>> {
        let mut sb = self.select();
        sb.condition(condition, false).operation("get_pagination");
        self.page_of(sb, paging).await?.try_map(|row| M::from_record(&row))
    }

    /// Rows matching a caller-defined filter.
    pub async fn filter<F: FilterParams>(&self, params: &F, order: Option<Order>) -> OrmResult<Vec<M>> {
        let mut sb = self.select();
        sb.condition(params.filter(None), false)
            .operation("filter")
            .order(order);
        models_from(&self.run(&sb.build()?).await?.rows)
    }

    pub async fn filter_pagination<F: FilterParams>(
        &self,
        params: &F,
        paging: &Paging,
    ) -> OrmResult<Page<M>> {
        self.get_pagination(params.filter(None), paging).await
    }

    // ---------------------------------------------------------------------
    // Relation reads. Rows carry `alias_column` keys; see `Record::aliased`.
    // ---------------------------------------------------------------------

    fn relation_select(
        &self,
        condition: Condition,
        options: &RelationOptions,
        required: bool,
        operation: &'static str,
    ) -> OrmResult<SelectBuilder> {
        let provider = self.inner.relations.as_ref().ok_or_else(|| {
            OrmError::validation(format!(
                "{operation}: no relation provider configured for table {}",
                self.inner.table
            ))
        })?;
        if required && condition.is_empty() {
            return Err(OrmError::validation(format!(
                "{operation}: condition is required"
            )));
        }

        let order = condition.get_order().cloned();
        let limit = condition.get_limit();
        let (clauses, args) = match condition {
            Condition::All => (Vec::new(), Vec::new()),
            Condition::Raw(sql) => (vec![sql], Vec::new()),
            Condition::Structured { clauses, args, .. } => (clauses, args),
        };
        let relation = provider.relation(&M::SCHEMA, options, &clauses, &args)?;

        let excepts: Vec<&str> = options.excepts.iter().map(String::as_str).collect();
        let mut filter = Condition::matching(relation.where_, relation.args);
        if let Some(order) = order {
            filter = filter.order(order);
        }
        if let Some(limit) = limit {
            filter = filter.limit(limit);
        }

        let mut sb = self.select();
        sb.alias(M::SCHEMA.alias)
            .columns(projector::aliased_column_string(&relation.includes, &excepts))
            .joins(relation.joins)
            .condition(filter, false)
            .operation(operation);
        Ok(sb)
    }

    pub async fn get_one_relation(
        &self,
        condition: Condition,
        options: &RelationOptions,
    ) -> OrmResult<Option<Record>> {
        let mut sb = self.relation_select(condition, options, true, "get_one_relation")?;
        sb.limit(1);
        Ok(self.run(&sb.build()?).await?.into_first())
    }

    pub async fn get_one_relation_by_pk(
        &self,
        pk: impl Into<Value>,
        options: &RelationOptions,
    ) -> OrmResult<Option<Record>> {
        let pk = pk.into();
        if pk.is_blank() {
            return Err(OrmError::validation(format!(
                "get_one_relation_by_pk: empty primary key for table {}",
                self.inner.table
            )));
        }
        let column = format!("{}.{}", M::SCHEMA.alias, M::SCHEMA.primary_key);
        self.get_one_relation(Condition::new().and_eq(&column, pk), options)
            .await
    }

    pub async fn get_all_condition_relation(
        &self,
        condition: Condition,
        options: &RelationOptions,
    ) -> OrmResult<Vec<Record>> {
        let sb = self.relation_select(condition, options, true, "get_all_condition_relation")?;
        Ok(self.run(&sb.build()?).await?.rows)
    }

    pub async fn get_many_relation<I, V>(
        &self,
        pks: I,
        options: &RelationOptions,
    ) -> OrmResult<Vec<Record>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let condition = self.pk_list_condition(pks, Some(M::SCHEMA.alias), "get_many_relation")?;
        let sb = self.relation_select(condition, options, true, "get_many_relation")?;
        Ok(self.run(&sb.build()?).await?.rows)
    }

    /// One page of a joined read; COUNT and fetch share joins and WHERE.
    pub async fn get_pagination_relation(
        &self,
        condition: Condition,
        paging: &Paging,
        options: &RelationOptions,
    ) -> OrmResult<Page<Record>> {
        let sb = self.relation_select(condition, options, false, "get_pagination_relation")?;
        self.page_of(sb, paging).await
    }

    /// Run caller-written SQL through this adapter's executor.
    pub async fn query_raw(&self, sql: &str, args: Vec<Value>) -> OrmResult<QueryOutput> {
        self.inner.executor.query_raw(sql, args).await
    }
}
