//! Shared helpers for integration tests
#![allow(dead_code)]

pub mod strategies;

use fancy_loader::loader::{rewrite, LoaderDefinition, Model};
use fancy_loader::query_builder::{ColumnRef, OrdinalPredicate, PaginationArgs, PaginationBounds};

/// `Post` loader mirroring a typical blog schema: posts partitioned by author
pub fn posts_definition() -> LoaderDefinition {
    LoaderDefinition::from(Model::new("Post", "posts"))
        .find_by("user_id")
        .sort("id")
        .sort("created_at")
        .sort("title")
        .sort_with(
            "author_name",
            "users.name",
            rewrite(|query, _| {
                if query.has_join("users") {
                    return Ok(query);
                }
                Ok(query.left_outer_join("users", "users.id = posts.user_id"))
            }),
        )
}

pub fn bounds() -> PaginationBounds {
    PaginationBounds::new(
        ColumnRef::qualified("subquery", "row_number"),
        ColumnRef::qualified("subquery", "total_count"),
    )
}

/// Ordinals of a `total`-row partition the predicate keeps
pub fn selected(predicate: &OrdinalPredicate, total: i64) -> Vec<i64> {
    (1..=total).filter(|&n| predicate.matches(n, total)).collect()
}

/// Relay connection slicing over ordinals `1..=total`
///
/// Cursor bounds first, then `first` from the head, then `last` from the
/// tail of what remains.
pub fn relay_slice(total: i64, args: &PaginationArgs) -> Vec<i64> {
    let mut edges: Vec<i64> = (1..=total)
        .filter(|&n| n > args.after)
        .filter(|&n| args.before.map_or(true, |before| n < before))
        .collect();

    if let Some(first) = args.first {
        edges.truncate(first as usize);
    }
    if let Some(last) = args.last {
        let skip = edges.len().saturating_sub(last as usize);
        edges.drain(..skip);
    }
    edges
}
