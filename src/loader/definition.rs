//! Loader definitions: the model, its registered sorts and hooks.
//!
//! A definition is built once at startup and shared. Requests pick sorts by
//! name through [`SortOption`]s and the definition turns them into
//! [`SortTerm`]s for the plan builder.

use super::context::Model;
use super::plan::QueryPlanBuilder;
use super::sort::{QueryRewrite, SortOption, SortTerm};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::query_builder::ColumnRef;
use crate::scopes::AuthorizationScope;
use convert_case::{Case, Casing};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A sort callers may request by name
#[derive(Clone)]
pub struct RegisteredSort {
    pub name: String,
    pub column: ColumnRef,
    pub transform: Option<QueryRewrite>,
}

impl RegisteredSort {
    /// Enum value exposed to API callers (`created_at` -> `CREATED_AT`)
    pub fn enum_value(&self) -> String {
        self.name.to_case(Case::UpperSnake)
    }

    fn matches(&self, requested: &str) -> bool {
        self.name == requested || self.enum_value() == requested
    }
}

impl fmt::Debug for RegisteredSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSort")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Sort enum an API layer exposes for a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEnum {
    /// `<Model>SortEnum`
    pub name: String,
    pub values: Vec<SortEnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEnumValue {
    /// `CREATED_AT`
    pub value: String,
    /// Registered sort name the value resolves to
    pub sort: String,
}

#[derive(Clone)]
pub struct LoaderDefinition {
    model: Model,
    find_by: Option<String>,
    sorts: Vec<RegisteredSort>,
    modify_query: Option<QueryRewrite>,
    scopes: Vec<Arc<dyn AuthorizationScope>>,
}

impl From<Model> for LoaderDefinition {
    fn from(model: Model) -> Self {
        Self {
            model,
            find_by: None,
            sorts: Vec::new(),
            modify_query: None,
            scopes: Vec::new(),
        }
    }
}

impl LoaderDefinition {
    /// Default partition column
    pub fn find_by(mut self, column: &str) -> Self {
        self.find_by = Some(column.to_string());
        self
    }

    /// Sort on the model column of the same name
    pub fn sort(self, name: &str) -> Self {
        self.sort_on(name, name)
    }

    /// Sort on an explicit column, qualified with the model table when bare
    pub fn sort_on(self, name: &str, column: &str) -> Self {
        let column = self.model.column(column);
        self.register(RegisteredSort {
            name: name.to_string(),
            column,
            transform: None,
        })
    }

    /// Sort on a column that needs the query rewritten first, usually a join
    pub fn sort_with(self, name: &str, column: &str, transform: QueryRewrite) -> Self {
        let column = self.model.column(column);
        self.register(RegisteredSort {
            name: name.to_string(),
            column,
            transform: Some(transform),
        })
    }

    pub fn modify_query(mut self, hook: QueryRewrite) -> Self {
        self.modify_query = Some(hook);
        self
    }

    /// Append an authorization scope; scopes run in registration order
    pub fn scope(mut self, scope: Arc<dyn AuthorizationScope>) -> Self {
        self.scopes.push(scope);
        self
    }

    // Re-registering a name replaces the sort but keeps its position
    fn register(mut self, sort: RegisteredSort) -> Self {
        match self.sorts.iter_mut().find(|existing| existing.name == sort.name) {
            Some(existing) => *existing = sort,
            None => self.sorts.push(sort),
        }
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn sorts(&self) -> &[RegisteredSort] {
        &self.sorts
    }

    /// Turn requested sort options into plan sort terms, in request order
    pub fn resolve(&self, options: &[SortOption]) -> Result<Vec<SortTerm>> {
        options
            .iter()
            .map(|option| {
                let sort = self
                    .sorts
                    .iter()
                    .find(|sort| sort.matches(&option.on))
                    .ok_or_else(|| LoaderError::UnknownSort {
                        model: self.model.name.clone(),
                        name: option.on.clone(),
                    })?;

                let term = SortTerm::new(sort.column.clone(), option.direction);
                Ok(match &sort.transform {
                    Some(transform) => term.with_transform(transform.clone()),
                    None => term,
                })
            })
            .collect()
    }

    pub fn sort_enum(&self) -> SortEnum {
        SortEnum {
            name: format!("{}SortEnum", self.model.name),
            values: self
                .sorts
                .iter()
                .map(|sort| SortEnumValue {
                    value: sort.enum_value(),
                    sort: sort.name.clone(),
                })
                .collect(),
        }
    }

    /// Name of the `{ on, direction }` input type
    pub fn sort_option_name(&self) -> String {
        format!("{}SortOption", self.model.name)
    }

    /// Plan builder carrying this definition's partition key, scopes and hook
    pub fn plan_builder(&self, config: &LoaderConfig) -> QueryPlanBuilder {
        let mut builder = QueryPlanBuilder::new(self.model.clone())
            .with_config(config.clone())
            .scopes(self.scopes.clone());

        if let Some(find_by) = &self.find_by {
            builder = builder.partition_key(find_by);
        }
        if let Some(hook) = &self.modify_query {
            builder = builder.modify_query(hook.clone());
        }
        builder
    }
}

impl fmt::Debug for LoaderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderDefinition")
            .field("model", &self.model)
            .field("find_by", &self.find_by)
            .field("sorts", &self.sorts)
            .field("modify_query", &self.modify_query.is_some())
            .field("scopes", &self.scopes)
            .finish()
    }
}
