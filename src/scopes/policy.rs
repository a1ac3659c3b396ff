//! Policy-backed authorization scope
//!
//! Resolves a per-model policy and hands it the principal found in the
//! request context under a configured key. A model without a registered
//! policy is refused rather than left unscoped.

use super::AuthorizationScope;
use crate::error::{LoaderError, Result};
use crate::loader::{LoaderContext, Model};
use crate::query_builder::QueryBuilder;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// `(principal, query) -> narrowed query`
pub type Policy = Arc<dyn Fn(Option<&Value>, QueryBuilder) -> Result<QueryBuilder> + Send + Sync>;

pub struct PolicyScope {
    context_key: String,
    policies: HashMap<String, Policy>,
}

impl PolicyScope {
    /// Policies will receive `context[context_key]` as the principal
    pub fn new(context_key: &str) -> Self {
        Self {
            context_key: context_key.to_string(),
            policies: HashMap::new(),
        }
    }

    /// Register the policy for a model name
    pub fn policy<F>(mut self, model_name: &str, policy: F) -> Self
    where
        F: Fn(Option<&Value>, QueryBuilder) -> Result<QueryBuilder> + Send + Sync + 'static,
    {
        self.policies.insert(model_name.to_string(), Arc::new(policy));
        self
    }

    pub fn context_key(&self) -> &str {
        &self.context_key
    }
}

impl AuthorizationScope for PolicyScope {
    fn name(&self) -> &str {
        "policy"
    }

    fn apply(
        &self,
        model: &Model,
        query: QueryBuilder,
        context: &LoaderContext,
    ) -> Result<QueryBuilder> {
        let policy = self.policies.get(&model.name).ok_or_else(|| {
            LoaderError::authorization(
                self.name(),
                format!("no policy scope registered for {}", model.name),
            )
        })?;

        policy(context.get(&self.context_key), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> PolicyScope {
        PolicyScope::new("current_user").policy("Post", |user, query| match user {
            Some(user) if user["admin"] == json!(true) => Ok(query),
            Some(user) => Ok(query.where_eq("posts.user_id", user["id"].clone())),
            None => Ok(query.where_eq("posts.published", json!(true))),
        })
    }

    #[test]
    fn test_policy_receives_principal() {
        let posts = Model::new("Post", "posts");
        let context = LoaderContext::new().with("current_user", json!({"id": 3, "admin": false}));

        let scoped = scope().apply(&posts, posts.query(), &context).unwrap();
        assert!(scoped.build_sql().ends_with("WHERE posts.user_id = 3"));

        let admin = LoaderContext::new().with("current_user", json!({"id": 1, "admin": true}));
        let scoped = scope().apply(&posts, posts.query(), &admin).unwrap();
        assert_eq!(scoped, posts.query());
    }

    #[test]
    fn test_missing_principal_is_anonymous() {
        let posts = Model::new("Post", "posts");
        let scoped = scope()
            .apply(&posts, posts.query(), &LoaderContext::new())
            .unwrap();
        assert!(scoped.build_sql().ends_with("WHERE posts.published = true"));
    }

    #[test]
    fn test_unregistered_model_is_refused() {
        let users = Model::new("User", "users");
        let err = scope()
            .apply(&users, users.query(), &LoaderContext::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authorization scope `policy` failed: no policy scope registered for User"
        );
    }
}
