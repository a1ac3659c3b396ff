//! # Authorization Scopes
//!
//! Authorization narrows the base query before any sorting or windowing is
//! applied, so partition totals and ordinals only ever count rows the caller
//! may see.
//!
//! Scopes run in the order they were registered. Each receives the model, the
//! query built so far and the request context, and returns the query the next
//! scope starts from. Errors stop the chain and reach the caller unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use fancy_loader::loader::{LoaderContext, Model};
//! use fancy_loader::scopes::{apply_scopes, scope_fn, AuthorizationScope};
//! use std::sync::Arc;
//!
//! # fn main() -> fancy_loader::Result<()> {
//! let published_only: Arc<dyn AuthorizationScope> = scope_fn("published", |model, query, _| {
//!     Ok(query.where_eq(&model.column("published").to_sql(), serde_json::json!(true)))
//! });
//!
//! let posts = Model::new("Post", "posts");
//! let query = apply_scopes(&[published_only], &posts, posts.query(), &LoaderContext::new())?;
//! assert!(query.build_sql().ends_with("WHERE posts.published = true"));
//! # Ok(())
//! # }
//! ```

pub mod policy;

use crate::error::Result;
use crate::loader::{LoaderContext, Model};
use crate::query_builder::QueryBuilder;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

pub use policy::PolicyScope;

/// A step of the authorization chain
pub trait AuthorizationScope: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Return `query` narrowed to what `context` may see of `model`
    fn apply(&self, model: &Model, query: QueryBuilder, context: &LoaderContext)
        -> Result<QueryBuilder>;
}

impl fmt::Debug for dyn AuthorizationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationScope({})", self.name())
    }
}

/// Fold `query` through every scope in order
pub fn apply_scopes(
    scopes: &[Arc<dyn AuthorizationScope>],
    model: &Model,
    query: QueryBuilder,
    context: &LoaderContext,
) -> Result<QueryBuilder> {
    scopes.iter().try_fold(query, |query, scope| {
        trace!(scope = scope.name(), model = %model.name, "Applying authorization scope");
        scope.apply(model, query, context)
    })
}

type ScopeFn =
    dyn Fn(&Model, QueryBuilder, &LoaderContext) -> Result<QueryBuilder> + Send + Sync;

/// Authorization scope backed by a closure
pub struct FnScope {
    name: String,
    apply: Box<ScopeFn>,
}

impl AuthorizationScope for FnScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(
        &self,
        model: &Model,
        query: QueryBuilder,
        context: &LoaderContext,
    ) -> Result<QueryBuilder> {
        (self.apply)(model, query, context)
    }
}

/// Build a shareable [`FnScope`]
pub fn scope_fn<F>(name: &str, apply: F) -> Arc<dyn AuthorizationScope>
where
    F: Fn(&Model, QueryBuilder, &LoaderContext) -> Result<QueryBuilder> + Send + Sync + 'static,
{
    Arc::new(FnScope {
        name: name.to_string(),
        apply: Box::new(apply),
    })
}
