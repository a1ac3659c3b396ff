//! Sort terms and the rewrite capability they may carry.

use super::context::LoaderContext;
use crate::error::Result;
use crate::query_builder::{ColumnRef, OrderTerm, QueryBuilder, SortDirection};
use crate::validation::validate_column_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied query rewrite: sort transforms and `modify_query` hooks
///
/// The query is opaque to the loader; whatever comes back is used as-is.
pub type QueryRewrite =
    Arc<dyn Fn(QueryBuilder, &LoaderContext) -> Result<QueryBuilder> + Send + Sync>;

/// Wrap a closure as a [`QueryRewrite`]
pub fn rewrite<F>(f: F) -> QueryRewrite
where
    F: Fn(QueryBuilder, &LoaderContext) -> Result<QueryBuilder> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One entry of the partition ordering
#[derive(Clone)]
pub struct SortTerm {
    pub column: ColumnRef,
    pub direction: SortDirection,
    /// Applied to the base query before the window columns are projected,
    /// typically to join the table `column` lives in
    pub transform: Option<QueryRewrite>,
}

impl SortTerm {
    pub fn new(column: ColumnRef, direction: SortDirection) -> Self {
        Self {
            column,
            direction,
            transform: None,
        }
    }

    pub fn asc(column: ColumnRef) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn desc(column: ColumnRef) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    pub fn with_transform(mut self, transform: QueryRewrite) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn order_term(&self) -> OrderTerm {
        OrderTerm::new(self.column.clone(), self.direction)
    }

    /// Check the column resolves to something renderable
    pub fn validate(&self) -> Result<()> {
        validate_column_path("sort", &self.column.to_sql())
    }

    /// Run this term's transform, or pass the query through unchanged
    pub fn rewrite(&self, query: QueryBuilder, context: &LoaderContext) -> Result<QueryBuilder> {
        match &self.transform {
            Some(transform) => transform(query, context),
            None => Ok(query),
        }
    }
}

impl fmt::Debug for SortTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortTerm")
            .field("column", &self.column)
            .field("direction", &self.direction)
            .field("transform", &self.transform.as_ref().map(|_| "<rewrite>"))
            .finish()
    }
}

/// A sort requested by a caller: a registered sort name and a direction
///
/// `on` accepts either the registered name (`created_at`) or its enum value
/// (`CREATED_AT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub on: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOption {
    pub fn new(on: &str, direction: SortDirection) -> Self {
        Self {
            on: on.to_string(),
            direction,
        }
    }

    pub fn asc(on: &str) -> Self {
        Self::new(on, SortDirection::Ascending)
    }

    pub fn desc(on: &str) -> Self {
        Self::new(on, SortDirection::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::Join;

    #[test]
    fn test_terms_without_transform_pass_through() {
        let term = SortTerm::asc(ColumnRef::qualified("posts", "id"));
        let query = QueryBuilder::new("posts");
        let rewritten = term.rewrite(query.clone(), &LoaderContext::new()).unwrap();
        assert_eq!(rewritten, query);
    }

    #[test]
    fn test_transform_receives_query_and_context() {
        let term = SortTerm::desc(ColumnRef::qualified("users", "name")).with_transform(rewrite(
            |query, context| {
                let join = match context.get("alias").and_then(|v| v.as_str()) {
                    Some(alias) => Join::left_outer(&format!("users {alias}"), "true"),
                    None => Join::left_outer("users", "users.id = posts.user_id"),
                };
                Ok(query.join(join))
            },
        ));

        let rewritten = term
            .rewrite(QueryBuilder::new("posts"), &LoaderContext::new())
            .unwrap();
        assert!(rewritten
            .build_sql()
            .contains("LEFT OUTER JOIN users ON users.id = posts.user_id"));
        assert_eq!(term.order_term().to_sql(), "users.name DESC");
    }

    #[test]
    fn test_validate_rejects_unrenderable_columns() {
        assert!(SortTerm::asc(ColumnRef::qualified("posts", "id")).validate().is_ok());
        let err = SortTerm::asc(ColumnRef::new("")).validate().unwrap_err();
        assert_eq!(err.argument(), Some("sort"));
        assert!(SortTerm::asc(ColumnRef::new("id desc")).validate().is_err());
    }

    #[test]
    fn test_sort_option_deserialization() {
        let option: SortOption =
            serde_json::from_str(r#"{"on": "CREATED_AT", "direction": "DESCENDING"}"#).unwrap();
        assert_eq!(option, SortOption::desc("CREATED_AT"));

        let option: SortOption = serde_json::from_str(r#"{"on": "id"}"#).unwrap();
        assert_eq!(option.direction, SortDirection::Ascending);
    }
}
