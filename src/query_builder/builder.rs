use super::expr::SortDirection;
use super::{Condition, Join, WhereClause};
use sqlx::PgPool;

/// Relation a query selects from
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table(String),
    /// Derived table: `FROM (<query>) alias`
    Subquery {
        query: Box<QueryBuilder>,
        alias: String,
    },
}

impl FromSource {
    /// Name other clauses use to refer to this source
    pub fn name(&self) -> &str {
        match self {
            FromSource::Table(table) => table,
            FromSource::Subquery { alias, .. } => alias,
        }
    }

    fn to_sql(&self) -> String {
        match self {
            FromSource::Table(table) => table.clone(),
            FromSource::Subquery { query, alias } => format!("({}) {}", query.build_sql(), alias),
        }
    }
}

/// Immutable-by-convention SQL query builder
///
/// Every method consumes and returns the builder, so a finished builder is a
/// plain value: cloning it is the only way to branch, and two builders built
/// from the same calls compare equal and render identical SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    source: FromSource,
    select_fields: Vec<String>,
    joins: Vec<Join>,
    where_clauses: Vec<WhereClause>,
    order_by: Vec<String>,
}

impl QueryBuilder {
    /// Create a new query builder for the given table
    pub fn new(table: &str) -> Self {
        Self::from_source(FromSource::Table(table.to_string()))
    }

    /// Create a query selecting from a derived table
    pub fn from_subquery(query: QueryBuilder, alias: &str) -> Self {
        Self::from_source(FromSource::Subquery {
            query: Box::new(query),
            alias: alias.to_string(),
        })
    }

    fn from_source(source: FromSource) -> Self {
        Self {
            source,
            select_fields: vec!["*".to_string()],
            joins: Vec::new(),
            where_clauses: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn source(&self) -> &FromSource {
        &self.source
    }

    pub fn select_fields(&self) -> &[String] {
        &self.select_fields
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    /// Set specific fields to select
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Append an expression to the projection
    pub fn project(mut self, expression: impl Into<String>) -> Self {
        self.select_fields.push(expression.into());
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add an INNER JOIN
    pub fn inner_join(self, table: &str, on_condition: &str) -> Self {
        self.join(Join::inner(table, on_condition))
    }

    /// Add a LEFT OUTER JOIN
    pub fn left_outer_join(self, table: &str, on_condition: &str) -> Self {
        self.join(Join::left_outer(table, on_condition))
    }

    /// Whether a join against `name` (table or alias) is already present
    pub fn has_join(&self, name: &str) -> bool {
        self.joins.iter().any(|join| join.source_name() == name)
    }

    /// Add a WHERE clause
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// Add a single condition
    pub fn where_condition(self, condition: Condition) -> Self {
        self.where_clause(WhereClause::and(vec![condition]))
    }

    /// Add a simple WHERE condition
    pub fn where_eq(self, field: &str, value: serde_json::Value) -> Self {
        self.where_condition(Condition::eq(field, value))
    }

    /// Add WHERE IN condition
    pub fn where_in(self, field: &str, values: Vec<serde_json::Value>) -> Self {
        self.where_clause(WhereClause::in_condition(field, values))
    }

    /// Add ORDER BY clause
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by
            .push(format!("{} {}", field, direction.as_sql()));
        self
    }

    /// Add ORDER BY ASC
    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Ascending)
    }

    /// Add ORDER BY DESC
    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Descending)
    }

    /// Build the complete SQL query string
    pub fn build_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.select_fields.join(", "));

        // FROM clause
        sql.push_str(&format!(" FROM {}", self.source.to_sql()));

        // JOIN clauses
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        // WHERE clauses; each one is grouped so an OR cannot widen its siblings
        match self.where_clauses.as_slice() {
            [] => {}
            [only] => {
                sql.push_str(" WHERE ");
                sql.push_str(&only.to_sql());
            }
            clauses => {
                let where_parts: Vec<String> =
                    clauses.iter().map(WhereClause::to_grouped_sql).collect();
                sql.push_str(" WHERE ");
                sql.push_str(&where_parts.join(" AND "));
            }
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        sql
    }

    /// Execute the query and return all rows
    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let sql = self.build_sql();
        sqlx::query_as::<_, T>(&sql).fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_query_building() {
        let query = QueryBuilder::new("posts")
            .select(&["posts.id", "posts.title", "posts.user_id"])
            .where_eq("posts.user_id", serde_json::json!(1))
            .order_desc("posts.created_at");

        let sql = query.build_sql();
        assert_eq!(
            sql,
            "SELECT posts.id, posts.title, posts.user_id FROM posts \
             WHERE posts.user_id = 1 ORDER BY posts.created_at DESC"
        );
    }

    #[test]
    fn test_join_query_building() {
        let query = QueryBuilder::new("posts")
            .select(&["posts.*"])
            .left_outer_join("users", "users.id = posts.user_id")
            .where_eq("users.active", serde_json::json!(true));

        let sql = query.build_sql();
        assert!(sql.contains("LEFT OUTER JOIN users ON users.id = posts.user_id"));
        assert!(sql.ends_with("WHERE users.active = true"));
        assert!(query.has_join("users"));
        assert!(!query.has_join("comments"));
    }

    #[test]
    fn test_project_appends_to_selection() {
        let query = QueryBuilder::new("posts")
            .select(&["posts.*"])
            .project("1 AS marker");
        assert_eq!(query.select_fields(), ["posts.*", "1 AS marker"]);
        assert_eq!(query.build_sql(), "SELECT posts.*, 1 AS marker FROM posts");
    }

    #[test]
    fn test_subquery_source() {
        let inner = QueryBuilder::new("posts").where_in(
            "posts.user_id",
            vec![serde_json::json!(1), serde_json::json!(2)],
        );
        let outer = QueryBuilder::from_subquery(inner, "subquery")
            .select(&["subquery.*"])
            .order_asc("subquery.id");

        assert_eq!(outer.source().name(), "subquery");
        assert_eq!(
            outer.build_sql(),
            "SELECT subquery.* FROM (SELECT * FROM posts WHERE posts.user_id IN (1, 2)) subquery \
             ORDER BY subquery.id ASC"
        );
    }

    #[test]
    fn test_or_clauses_stay_inside_their_group() {
        let sql = QueryBuilder::new("posts")
            .where_in("posts.user_id", vec![serde_json::json!(1)])
            .where_clause(WhereClause::raw("posts.published OR posts.pinned"))
            .build_sql();
        assert_eq!(
            sql,
            "SELECT * FROM posts WHERE posts.user_id IN (1) AND (posts.published OR posts.pinned)"
        );

        let sql = QueryBuilder::new("posts")
            .where_clause(WhereClause::raw("posts.published OR posts.pinned"))
            .build_sql();
        assert_eq!(sql, "SELECT * FROM posts WHERE posts.published OR posts.pinned");
    }

    #[test]
    fn test_builders_are_values() {
        let build = || {
            QueryBuilder::new("posts")
                .where_eq("posts.user_id", serde_json::json!(7))
                .order_asc("posts.id")
        };
        assert_eq!(build(), build());
        assert_eq!(build().build_sql(), build().build_sql());
    }
}
