//! Plan execution and per-partition grouping.
//!
//! Rows come back from the engine already in ordinal order, one partition
//! interleaved with the next. Grouping keeps that order within each
//! partition and gives every requested key an entry, empty when it has no rows.

use super::plan::{LoadRequest, QueryPlan, QueryPlanBuilder};
use crate::constants::{ORDINAL_COLUMN, TOTAL_COUNT_COLUMN};
use crate::error::Result;
use crate::logging::{log_error, log_plan_operation};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// A record together with its window columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedRow<T> {
    pub record: T,
    /// 1-indexed position within the partition
    pub row_number: i64,
    /// Rows in the partition before pagination
    pub total_count: i64,
}

impl<'r, T> FromRow<'r, PgRow> for WindowedRow<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            record: T::from_row(row)?,
            row_number: row.try_get(ORDINAL_COLUMN)?,
            total_count: row.try_get(TOTAL_COUNT_COLUMN)?,
        })
    }
}

impl QueryPlan {
    /// Execute and decode plain records; the window columns are ignored
    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Ok(self.query().fetch_all(pool).await?)
    }

    /// Execute and keep each row's ordinal and partition total
    pub async fn fetch_windowed<T>(&self, pool: &PgPool) -> Result<Vec<WindowedRow<T>>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Ok(self.query().fetch_all(pool).await?)
    }
}

/// A record that knows which partition it belongs to
pub trait PartitionedRecord {
    type Key: Eq + Hash + Clone;

    fn partition_key(&self) -> Self::Key;
}

impl<T: PartitionedRecord> PartitionedRecord for WindowedRow<T> {
    type Key = T::Key;

    fn partition_key(&self) -> Self::Key {
        self.record.partition_key()
    }
}

/// Group rows by partition, preserving row order within each partition
///
/// Every key in `keys` is present in the result.
pub fn group_by_partition<T>(keys: &[T::Key], rows: Vec<T>) -> HashMap<T::Key, Vec<T>>
where
    T: PartitionedRecord,
{
    let mut grouped: HashMap<T::Key, Vec<T>> =
        keys.iter().map(|key| (key.clone(), Vec::new())).collect();

    for row in rows {
        grouped.entry(row.partition_key()).or_default().push(row);
    }
    grouped
}

/// Loads one page of many partitions with a single query
#[derive(Debug, Clone)]
pub struct PartitionLoader {
    builder: QueryPlanBuilder,
}

impl PartitionLoader {
    pub fn new(builder: QueryPlanBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &QueryPlanBuilder {
        &self.builder
    }

    /// Load `keys` using the sort, page, filter and context of `request`
    ///
    /// The request's own keys are replaced by `keys`.
    pub async fn load<T>(
        &self,
        pool: &PgPool,
        keys: &[T::Key],
        request: LoadRequest,
    ) -> Result<HashMap<T::Key, Vec<T>>>
    where
        T: PartitionedRecord + for<'r> FromRow<'r, PgRow> + Send + Unpin,
        T::Key: Serialize,
    {
        let started = Instant::now();
        let model = self.builder.model().name.clone();

        let request = LoadRequest {
            keys: keys
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<_, _>>()?,
            ..request
        };

        let rows: Vec<T> = match self.execute(pool, &request).await {
            Ok(rows) => rows,
            Err(e) => {
                log_error("partition_loader", "load", &e.to_string(), Some(&model));
                return Err(e);
            }
        };

        log_plan_operation(
            "load",
            &model,
            keys.len(),
            Some(rows.len()),
            Some(started.elapsed().as_millis() as u64),
            None,
        );

        Ok(group_by_partition(keys, rows))
    }

    async fn execute<T>(&self, pool: &PgPool, request: &LoadRequest) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.builder.build(request)?.fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Post {
        id: i64,
        user_id: i64,
    }

    impl PartitionedRecord for Post {
        type Key = i64;

        fn partition_key(&self) -> i64 {
            self.user_id
        }
    }

    fn post(id: i64, user_id: i64) -> Post {
        Post { id, user_id }
    }

    #[test]
    fn test_every_requested_key_is_present() {
        let grouped = group_by_partition(&[1, 2, 3], vec![post(10, 1), post(11, 3)]);
        assert_eq!(grouped.len(), 3);
        assert!(grouped[&2].is_empty());
        assert_eq!(grouped[&3], vec![post(11, 3)]);
    }

    #[test]
    fn test_row_order_is_kept_per_partition() {
        let rows = vec![post(5, 1), post(9, 2), post(3, 1), post(7, 2), post(1, 1)];
        let grouped = group_by_partition(&[1, 2], rows);
        let ids = |key: i64| grouped[&key].iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(1), vec![5, 3, 1]);
        assert_eq!(ids(2), vec![9, 7]);
    }

    #[test]
    fn test_windowed_rows_group_by_their_record() {
        let rows = vec![
            WindowedRow {
                record: post(1, 4),
                row_number: 1,
                total_count: 2,
            },
            WindowedRow {
                record: post(2, 4),
                row_number: 2,
                total_count: 2,
            },
        ];
        let grouped = group_by_partition(&[4], rows);
        let ordinals: Vec<_> = grouped[&4].iter().map(|row| row.row_number).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }
}
