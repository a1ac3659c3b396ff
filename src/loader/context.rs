//! Model and request context shared with collaborators.

use crate::query_builder::{ColumnRef, QueryBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The relation records are loaded from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model name (`Post`), used for policy lookup and sort option naming
    pub name: String,
    /// Table name (`posts`)
    pub table: String,
    /// Query every plan starts from, e.g. one carrying a default scope
    #[serde(skip)]
    base_query: Option<QueryBuilder>,
}

impl Model {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            base_query: None,
        }
    }

    /// Start plans from `query` instead of the whole table
    ///
    /// The query must select from this model's table; the key filter and every
    /// later stage are added on top of it.
    pub fn with_base_query(mut self, query: QueryBuilder) -> Self {
        self.base_query = Some(query);
        self
    }

    /// Column of this model's table
    pub fn column(&self, column: &str) -> ColumnRef {
        ColumnRef::parse(column).or_qualify(&self.table)
    }

    /// Base query, or an unscoped one selecting every column of the table
    pub fn query(&self) -> QueryBuilder {
        match &self.base_query {
            Some(query) => query.clone(),
            None => QueryBuilder::new(&self.table).select(&[format!("{}.*", self.table).as_str()]),
        }
    }
}

/// Per-request values visible to scopes, transforms and rewrite hooks
///
/// Typically carries the current principal under a well-known key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderContext {
    values: HashMap<String, Value>,
}

impl LoaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.values.insert(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, Value>> for LoaderContext {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}
