//! # Query Builder System
//!
//! SQL building blocks for windowed, partition-paginated loads.
//!
//! ## Key Components
//!
//! - [`builder`] - Value-typed query builder with SQL generation and sqlx execution
//! - [`conditions`] - WHERE clause building
//! - [`joins`] - JOIN clauses, mostly used by sort transforms
//! - [`expr`] - Column references, sort directions, integer operands
//! - [`window`] - `PARTITION BY ... ORDER BY ...` windows and window function columns
//! - [`pagination`] - Relay `before`/`after`/`first`/`last` compiled to ordinal predicates
//! - [`rank`] - Per-partition rank columns
//!
//! ## Example Usage
//!
//! ```rust
//! use fancy_loader::query_builder::{ColumnRef, PaginationArgs, PaginationBounds};
//!
//! let bounds = PaginationBounds::new(
//!     ColumnRef::qualified("subquery", "row_number"),
//!     ColumnRef::qualified("subquery", "total_count"),
//! );
//! let predicate = bounds.predicate(&PaginationArgs::new().after(10).first(10));
//! assert_eq!(
//!     predicate.to_sql(),
//!     "subquery.row_number > 10 AND subquery.row_number <= 20"
//! );
//! ```

pub mod builder;
pub mod conditions;
pub mod expr;
pub mod joins;
pub mod pagination;
pub mod rank;
pub mod window;

pub use builder::{FromSource, QueryBuilder};
pub use conditions::{Condition, LogicalOperator, WhereClause};
pub use expr::{ColumnRef, Operand, SortDirection};
pub use joins::{Join, JoinType};
pub use pagination::{
    ComparisonOp, OrdinalComparison, OrdinalPredicate, PageInfo, PaginationArgs, PaginationBounds,
};
pub use rank::RankPlanBuilder;
pub use window::{OrderTerm, PartitionWindow, WindowColumn, WindowFunction};
