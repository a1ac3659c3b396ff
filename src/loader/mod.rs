//! # Partition Loader
//!
//! Loads a page of child records for many parents with one query.
//!
//! ## Key Components
//!
//! - [`context`] - The model being loaded and per-request context values
//! - [`sort`] - Sort terms, sort options and the rewrite capability
//! - [`definition`] - Registered sorts, partition key, scopes and hooks for a model
//! - [`plan`] - Windowed query plan assembly
//! - [`executor`] - Plan execution and grouping rows back into partitions
//!
//! ## Example Usage
//!
//! ```rust
//! use fancy_loader::config::LoaderConfig;
//! use fancy_loader::loader::{LoadRequest, LoaderDefinition, Model, SortOption};
//! use fancy_loader::query_builder::PaginationArgs;
//! use serde_json::json;
//!
//! # fn main() -> fancy_loader::Result<()> {
//! let posts = LoaderDefinition::from(Model::new("Post", "posts"))
//!     .find_by("user_id")
//!     .sort("created_at");
//!
//! let request = LoadRequest::new(vec![json!(1), json!(2)])
//!     .sort(posts.resolve(&[SortOption::desc("CREATED_AT")])?)
//!     .pagination(PaginationArgs::new().first(10));
//!
//! let plan = posts.plan_builder(&LoaderConfig::default()).build(&request)?;
//! assert!(plan.to_sql().ends_with(
//!     "WHERE subquery.row_number > 0 AND subquery.row_number <= 10 \
//!      ORDER BY subquery.row_number ASC"
//! ));
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod definition;
pub mod executor;
pub mod plan;
pub mod sort;

pub use context::{LoaderContext, Model};
pub use definition::{LoaderDefinition, RegisteredSort, SortEnum, SortEnumValue};
pub use executor::{group_by_partition, PartitionLoader, PartitionedRecord, WindowedRow};
pub use plan::{LoadRequest, QueryPlan, QueryPlanBuilder, RequestFilter};
pub use sort::{rewrite, QueryRewrite, SortOption, SortTerm};
