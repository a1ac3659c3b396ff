#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fancy Loader
//!
//! Batched child-record loading with Relay-style cursor pagination, compiled
//! into a single window-function query.
//!
//! ## Overview
//!
//! A batched loader collects parent keys (every author on a page, say) and
//! fetches their children in one round trip. Paginating those children per
//! parent normally means one query per parent. This crate instead numbers
//! rows within each parent's partition with `ROW_NUMBER()`, counts each
//! partition with `COUNT(*) OVER (...)`, and slices every partition at once
//! with a predicate over those two columns.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - SQL building blocks, partition windows, pagination bounds, rank columns
//! - [`loader`] - Loader definitions, query plans and execution
//! - [`scopes`] - Authorization scopes applied before windowing
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fancy_loader::config::ConfigManager;
//! use fancy_loader::loader::{
//!     LoadRequest, LoaderDefinition, Model, PartitionLoader, PartitionedRecord, SortOption,
//! };
//! use fancy_loader::query_builder::PaginationArgs;
//! use sqlx::PgPool;
//!
//! #[derive(sqlx::FromRow)]
//! struct Post {
//!     id: i64,
//!     user_id: i64,
//!     title: String,
//! }
//!
//! impl PartitionedRecord for Post {
//!     type Key = i64;
//!
//!     fn partition_key(&self) -> i64 {
//!         self.user_id
//!     }
//! }
//!
//! # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::load()?;
//! let posts = LoaderDefinition::from(Model::new("Post", "posts"))
//!     .find_by("user_id")
//!     .sort("created_at")
//!     .sort("id");
//!
//! let loader = PartitionLoader::new(posts.plan_builder(config.config()));
//! let request = LoadRequest::default()
//!     .sort(posts.resolve(&[SortOption::desc("CREATED_AT"), SortOption::asc("ID")])?)
//!     .pagination(PaginationArgs::new().first(5));
//!
//! let by_author = loader.load::<Post>(pool, &[1, 2, 3], request).await?;
//! for (author, page) in &by_author {
//!     println!("author {author}: {} posts on this page", page.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                                # Unit, integration and property tests
//! cargo test --features test-database       # Adds tests against PostgreSQL (DATABASE_URL)
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod logging;
pub mod query_builder;
pub mod scopes;
pub mod validation;

pub use config::{ConfigManager, LoaderConfig, LoggingConfig};
pub use error::{LoaderError, Result};
pub use loader::{
    LoadRequest, LoaderContext, LoaderDefinition, Model, PartitionLoader, QueryPlan,
    QueryPlanBuilder, SortOption, SortTerm,
};
pub use logging::init_structured_logging;
pub use query_builder::{
    PageInfo, PaginationArgs, PaginationBounds, PartitionWindow, QueryBuilder, RankPlanBuilder,
    SortDirection,
};
pub use scopes::{AuthorizationScope, PolicyScope};
