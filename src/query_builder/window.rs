//! # Partition Windows
//!
//! The `OVER (...)` clauses shared by the ordinal and total-count window
//! functions. The ordinal window partitions by the find-by key and orders by
//! every sort term in declared order; the count window keeps the partition and
//! drops the ordering, since a count does not depend on it.

use super::expr::{ColumnRef, SortDirection};

/// One `ORDER BY` entry of a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: ColumnRef,
    pub direction: SortDirection,
}

impl OrderTerm {
    pub fn new(column: ColumnRef, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: ColumnRef) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}

/// `PARTITION BY <key> ORDER BY <terms>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionWindow {
    partition_by: ColumnRef,
    order: Vec<OrderTerm>,
}

impl PartitionWindow {
    pub fn new(partition_by: ColumnRef, order: impl IntoIterator<Item = OrderTerm>) -> Self {
        Self {
            partition_by,
            order: order.into_iter().collect(),
        }
    }

    /// Partition with no ordering
    pub fn unordered(partition_by: ColumnRef) -> Self {
        Self::new(partition_by, Vec::new())
    }

    /// Same partition without the ordering, for `COUNT(*)`
    pub fn count_window(&self) -> Self {
        Self::unordered(self.partition_by.clone())
    }

    pub fn partition_by(&self) -> &ColumnRef {
        &self.partition_by
    }

    pub fn order(&self) -> &[OrderTerm] {
        &self.order
    }

    /// Append `column ASC` unless the window already ends on that column
    pub fn with_tie_break(mut self, column: ColumnRef) -> Self {
        let already_last = self
            .order
            .last()
            .is_some_and(|term| term.column == column);
        if !already_last {
            self.order.push(OrderTerm::asc(column));
        }
        self
    }

    /// Body of the `OVER (...)` clause, without parentheses
    pub fn to_sql(&self) -> String {
        let mut sql = format!("PARTITION BY {}", self.partition_by);
        if !self.order.is_empty() {
            let terms: Vec<String> = self.order.iter().map(OrderTerm::to_sql).collect();
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }
        sql
    }
}

/// Window functions the loader projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunction {
    RowNumber,
    CountAll,
}

impl WindowFunction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            WindowFunction::RowNumber => "ROW_NUMBER()",
            WindowFunction::CountAll => "COUNT(*)",
        }
    }
}

/// A labelled window function column: `ROW_NUMBER() OVER (...) AS label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowColumn {
    pub function: WindowFunction,
    pub window: PartitionWindow,
    pub alias: String,
}

impl WindowColumn {
    pub fn row_number(window: PartitionWindow, alias: &str) -> Self {
        Self {
            function: WindowFunction::RowNumber,
            window,
            alias: alias.to_string(),
        }
    }

    pub fn count_all(window: PartitionWindow, alias: &str) -> Self {
        Self {
            function: WindowFunction::CountAll,
            window,
            alias: alias.to_string(),
        }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "{} OVER ({}) AS {}",
            self.function.to_sql(),
            self.window.to_sql(),
            self.alias
        )
    }
}
