//! # Windowed Query Plans
//!
//! Builds the single query that loads one page of every requested partition.
//!
//! ```text
//! SELECT subquery.* FROM (
//!     SELECT posts.*,
//!            ROW_NUMBER() OVER (PARTITION BY posts.user_id ORDER BY ...) AS row_number,
//!            COUNT(*) OVER (PARTITION BY posts.user_id) AS total_count
//!     FROM posts
//!     WHERE posts.user_id IN (...)
//! ) subquery
//! WHERE <ordinal predicate>
//! ORDER BY subquery.row_number ASC
//! ```
//!
//! The inner query is assembled in a fixed order: key filter, request
//! filter, authorization scopes, sort transforms, window columns, then the
//! definition's `modify_query` hook. Counts are taken after authorization so a
//! partition total never includes rows the caller cannot see.

use super::context::{LoaderContext, Model};
use super::sort::{QueryRewrite, SortTerm};
use crate::config::LoaderConfig;
use crate::constants::{ORDINAL_COLUMN, TOTAL_COUNT_COLUMN};
use crate::error::{LoaderError, Result};
use crate::query_builder::{
    ColumnRef, OrdinalPredicate, PageInfo, PaginationArgs, PaginationBounds, PartitionWindow,
    QueryBuilder, RankPlanBuilder, WhereClause, WindowColumn,
};
use crate::scopes::{apply_scopes, AuthorizationScope};
use crate::validation::validate_column_path;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extra restriction on the base query, applied before authorization
#[derive(Debug, Clone, PartialEq)]
pub enum RequestFilter {
    /// `column = value` for every entry; bare columns belong to the model table
    Equals(BTreeMap<String, Value>),
    Clause(WhereClause),
}

/// One batched load: which partitions, in what order, which page
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    /// Overrides the definition's `find_by` column
    pub partition_key: Option<String>,
    pub keys: Vec<Value>,
    pub sort: Vec<SortTerm>,
    pub pagination: PaginationArgs,
    pub filter: Option<RequestFilter>,
    pub context: LoaderContext,
}

impl LoadRequest {
    pub fn new(keys: Vec<Value>) -> Self {
        Self {
            keys,
            ..Default::default()
        }
    }

    pub fn partition_key(mut self, column: &str) -> Self {
        self.partition_key = Some(column.to_string());
        self
    }

    pub fn sort(mut self, sort: Vec<SortTerm>) -> Self {
        self.sort = sort;
        self
    }

    pub fn pagination(mut self, pagination: PaginationArgs) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn filter(mut self, filter: RequestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Shorthand for [`RequestFilter::Equals`]
    pub fn where_eq(mut self, filter: BTreeMap<String, Value>) -> Self {
        self.filter = Some(RequestFilter::Equals(filter));
        self
    }

    pub fn context(mut self, context: LoaderContext) -> Self {
        self.context = context;
        self
    }
}

/// A fully built plan
///
/// Equal inputs produce equal plans; the plan owns no connection and can be
/// rendered or executed any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    model: Model,
    partition_key: ColumnRef,
    subplan: QueryBuilder,
    outer: QueryBuilder,
    predicate: OrdinalPredicate,
}

impl QueryPlan {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn partition_key(&self) -> &ColumnRef {
        &self.partition_key
    }

    /// Windowed inner query, before pagination
    pub fn subplan(&self) -> &QueryBuilder {
        &self.subplan
    }

    /// Outer query applying the predicate and the final ordering
    pub fn query(&self) -> &QueryBuilder {
        &self.outer
    }

    pub fn predicate(&self) -> &OrdinalPredicate {
        &self.predicate
    }

    /// Relay page metadata for a partition of `partition_total` rows
    pub fn page_info(&self, partition_total: i64) -> PageInfo {
        PageInfo::from_window(&self.predicate, partition_total)
    }

    pub fn to_sql(&self) -> String {
        self.outer.build_sql()
    }
}

/// Assembles [`QueryPlan`]s for one model
#[derive(Clone)]
pub struct QueryPlanBuilder {
    model: Model,
    partition_key: Option<String>,
    scopes: Vec<Arc<dyn AuthorizationScope>>,
    modify_query: Option<QueryRewrite>,
    config: LoaderConfig,
}

impl std::fmt::Debug for QueryPlanBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPlanBuilder")
            .field("model", &self.model)
            .field("partition_key", &self.partition_key)
            .field("scopes", &self.scopes)
            .field("modify_query", &self.modify_query.as_ref().map(|_| "<rewrite>"))
            .field("config", &self.config)
            .finish()
    }
}

impl QueryPlanBuilder {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            partition_key: None,
            scopes: Vec::new(),
            modify_query: None,
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Default partition column, used when a request does not name one
    pub fn partition_key(mut self, column: &str) -> Self {
        self.partition_key = Some(column.to_string());
        self
    }

    pub fn scope(mut self, scope: Arc<dyn AuthorizationScope>) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn scopes(mut self, scopes: Vec<Arc<dyn AuthorizationScope>>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Final rewrite of the windowed inner query
    pub fn modify_query(mut self, hook: QueryRewrite) -> Self {
        self.modify_query = Some(hook);
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn build(&self, request: &LoadRequest) -> Result<QueryPlan> {
        request.pagination.validate(self.config.max_page_size)?;
        let partition_key = self.resolve_partition_key(request)?;
        self.validate_sort(&request.sort)?;
        validate_filter(request.filter.as_ref())?;

        if request.keys.is_empty() && self.config.warn_on_empty_keys {
            warn!(
                model = %self.model.name,
                partition_key = %partition_key,
                "Building plan for an empty key set; no rows can match"
            );
        }

        let context = &request.context;
        let mut query = self
            .model
            .query()
            .where_in(&partition_key.to_sql(), request.keys.clone());

        query = match &request.filter {
            Some(RequestFilter::Equals(filter)) => {
                query.where_clause(WhereClause::equalities(&self.model.table, filter))
            }
            Some(RequestFilter::Clause(clause)) => query.where_clause(clause.clone()),
            None => query,
        };

        query = apply_scopes(&self.scopes, &self.model, query, context)?;

        for term in &request.sort {
            query = term.rewrite(query, context)?;
        }

        let (ordinal, total) = self.window_columns(&partition_key, &request.sort);
        query = query.project(ordinal.to_sql()).project(total.to_sql());

        if let Some(hook) = &self.modify_query {
            query = hook(query, context)?;
        }

        let alias = &self.config.subquery_alias;
        let bounds = PaginationBounds::new(
            ColumnRef::qualified(alias, ORDINAL_COLUMN),
            ColumnRef::qualified(alias, TOTAL_COUNT_COLUMN),
        );
        let predicate = bounds.predicate(&request.pagination);

        let outer = QueryBuilder::from_subquery(query.clone(), alias)
            .select(&[format!("{alias}.*").as_str()])
            .where_clause(WhereClause::raw(&predicate.to_sql()))
            .order_asc(&predicate.ordinal().to_sql());

        debug!(
            model = %self.model.name,
            partition_key = %partition_key,
            key_count = request.keys.len(),
            sort_terms = request.sort.len(),
            scopes = self.scopes.len(),
            predicate = %predicate.to_sql(),
            "Built windowed query plan"
        );

        Ok(QueryPlan {
            model: self.model.clone(),
            partition_key,
            subplan: query,
            outer,
            predicate,
        })
    }

    /// Rank of `column` within the default partition, labelled with the configured suffix
    pub fn rank(&self, column: &str) -> Result<RankPlanBuilder> {
        validate_column_path("rank_column", column)?;
        let partition_key = self.partition_key.as_deref().ok_or_else(|| {
            LoaderError::MissingPartitionKey {
                model: self.model.name.clone(),
            }
        })?;
        validate_column_path("partition_key", partition_key)?;

        Ok(RankPlanBuilder::from_config(
            &self.config,
            column,
            partition_key,
            &self.model.table,
        ))
    }

    fn resolve_partition_key(&self, request: &LoadRequest) -> Result<ColumnRef> {
        let key = request
            .partition_key
            .as_deref()
            .or(self.partition_key.as_deref())
            .ok_or_else(|| LoaderError::MissingPartitionKey {
                model: self.model.name.clone(),
            })?;

        validate_column_path("partition_key", key)?;
        Ok(self.model.column(key))
    }

    fn validate_sort(&self, sort: &[SortTerm]) -> Result<()> {
        if sort.is_empty() {
            return Err(LoaderError::invalid_argument(
                "sort",
                "at least one sort term is required",
            ));
        }
        sort.iter().try_for_each(SortTerm::validate)
    }

    /// `ROW_NUMBER()` over the ordered window and `COUNT(*)` over the bare partition
    fn window_columns(
        &self,
        partition_key: &ColumnRef,
        sort: &[SortTerm],
    ) -> (WindowColumn, WindowColumn) {
        let mut window =
            PartitionWindow::new(partition_key.clone(), sort.iter().map(SortTerm::order_term));
        if let Some(column) = &self.config.tie_break_column {
            window = window.with_tie_break(self.model.column(column));
        }

        let total = WindowColumn::count_all(window.count_window(), TOTAL_COUNT_COLUMN);
        (WindowColumn::row_number(window, ORDINAL_COLUMN), total)
    }
}

fn validate_filter(filter: Option<&RequestFilter>) -> Result<()> {
    match filter {
        Some(RequestFilter::Equals(columns)) => columns
            .keys()
            .try_for_each(|column| validate_column_path("filter", column)),
        _ => Ok(()),
    }
}
