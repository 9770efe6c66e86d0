//! Joined reads.
//!
//! A [`RelationProvider`] turns the caller's requested includes into join
//! fragments and an aliased projection. [`StaticRelations`] covers the common
//! case of a fixed set of optional joins.

use crate::error::{OrmError, OrmResult};
use crate::model::{Model, Projection, TableSchema};
use crate::value::Value;

/// What a joined read asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationOptions {
    /// Names of the related tables to join.
    pub includes: Vec<String>,
    /// `alias.column` entries left out of the projection.
    pub excepts: Vec<String>,
}

impl RelationOptions {
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.includes.push(name.into());
        self
    }

    pub fn except(mut self, column: impl Into<String>) -> Self {
        self.excepts.push(column.into());
        self
    }
}

/// The pieces of a joined SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Tables projected, primary table first.
    pub includes: Vec<Projection>,
    pub joins: Vec<String>,
    /// WHERE fragments numbered against `args`.
    pub where_: Vec<String>,
    pub args: Vec<Value>,
}

pub trait RelationProvider: Send + Sync {
    /// Build the relation for a read of `schema` filtered by `where_`/`args`.
    fn relation(
        &self,
        schema: &TableSchema,
        options: &RelationOptions,
        where_: &[String],
        args: &[Value],
    ) -> OrmResult<Relation>;
}

/// One optional join of [`StaticRelations`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub name: String,
    pub projection: Projection,
    /// e.g. `LEFT JOIN public.address a ON a.subject_id = p.uid`
    pub join: String,
}

/// A fixed set of joins, selected per read by name.
#[derive(Debug, Clone, Default)]
pub struct StaticRelations {
    joins: Vec<JoinSpec>,
}

impl StaticRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a join for model `R`, read under its own alias.
    pub fn join<R: Model>(mut self, name: impl Into<String>, join: impl Into<String>) -> Self {
        self.joins.push(JoinSpec {
            name: name.into(),
            projection: Projection::of::<R>(),
            join: join.into(),
        });
        self
    }

    pub fn join_spec(mut self, spec: JoinSpec) -> Self {
        self.joins.push(spec);
        self
    }
}

impl RelationProvider for StaticRelations {
    fn relation(
        &self,
        schema: &TableSchema,
        options: &RelationOptions,
        where_: &[String],
        args: &[Value],
    ) -> OrmResult<Relation> {
        let mut includes = vec![Projection::new(schema.alias, *schema)];
        let mut joins = Vec::new();
        for name in &options.includes {
            let spec = self
                .joins
                .iter()
                .find(|j| &j.name == name)
                .ok_or_else(|| {
                    OrmError::validation(format!(
                        "Unknown relation '{name}' for table '{}'",
                        schema.table
                    ))
                })?;
            includes.push(spec.projection.clone());
            joins.push(spec.join.clone());
        }
        Ok(Relation {
            includes,
            joins,
            where_: where_.to_vec(),
            args: args.to_vec(),
        })
    }
}
