//! # Cursor Pagination Bounds
//!
//! Relay-style `before`/`after`/`first`/`last` arguments compiled into a
//! predicate over each row's ordinal within its partition. Every bound is a
//! row position, never a row value, so one predicate slices every partition
//! of a batched query at once.
//!
//! `last` without `before` counts back from the end of the partition, whose
//! size is only known to the engine. That bound is expressed against the
//! partition-total window column instead of a literal.

use super::expr::{ColumnRef, Operand};
use crate::error::{LoaderError, Result};
use crate::validation::validate_non_negative;
use serde::{Deserialize, Serialize};

/// Relay connection arguments, all counted in 1-indexed row ordinals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationArgs {
    /// Exclusive upper bound
    #[serde(default)]
    pub before: Option<i64>,
    /// Exclusive lower bound
    #[serde(default)]
    pub after: i64,
    #[serde(default)]
    pub first: Option<i64>,
    #[serde(default)]
    pub last: Option<i64>,
}

impl PaginationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, before: i64) -> Self {
        self.before = Some(before);
        self
    }

    pub fn after(mut self, after: i64) -> Self {
        self.after = after;
        self
    }

    pub fn first(mut self, first: i64) -> Self {
        self.first = Some(first);
        self
    }

    pub fn last(mut self, last: i64) -> Self {
        self.last = Some(last);
        self
    }

    /// Reject arguments the bounds arithmetic cannot give a meaning to
    ///
    /// Crossed or zero-width bounds are valid: they select nothing.
    pub fn validate(&self, max_page_size: Option<i64>) -> Result<()> {
        validate_non_negative("after", self.after)?;
        if let Some(before) = self.before {
            validate_non_negative("before", before)?;
        }

        for (argument, size) in [("first", self.first), ("last", self.last)] {
            let Some(size) = size else { continue };
            validate_non_negative(argument, size)?;
            if let Some(max) = max_page_size {
                if size > max {
                    return Err(LoaderError::invalid_argument(
                        argument,
                        format!("exceeds the maximum page size of {max} (got {size})"),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl ComparisonOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::GtEq => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::LtEq => "<=",
        }
    }

    fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::GtEq => lhs >= rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::LtEq => lhs <= rhs,
        }
    }
}

/// `ordinal <op> bound`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalComparison {
    pub op: ComparisonOp,
    pub bound: Operand,
}

impl OrdinalComparison {
    fn new(op: ComparisonOp, bound: Operand) -> Self {
        Self { op, bound }
    }
}

/// Conjunction of ordinal comparisons selecting one page of every partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalPredicate {
    ordinal: ColumnRef,
    partition_total: ColumnRef,
    conjuncts: Vec<OrdinalComparison>,
}

impl OrdinalPredicate {
    pub fn ordinal(&self) -> &ColumnRef {
        &self.ordinal
    }

    pub fn conjuncts(&self) -> &[OrdinalComparison] {
        &self.conjuncts
    }

    /// Whether any bound depends on the partition size
    pub fn references_partition_total(&self) -> bool {
        let total = &self.partition_total;
        let resolve = |column: &ColumnRef| (column != total).then_some(0);
        self.conjuncts
            .iter()
            .any(|c| c.bound.evaluate(&resolve).is_none())
    }

    /// Evaluate the predicate for one row
    pub fn matches(&self, ordinal: i64, partition_total: i64) -> bool {
        let resolve =
            |column: &ColumnRef| (column == &self.partition_total).then_some(partition_total);
        self.conjuncts.iter().all(|comparison| {
            comparison
                .bound
                .evaluate(&resolve)
                .is_some_and(|bound| comparison.op.holds(ordinal, bound))
        })
    }

    /// Inclusive ordinal range selected from a partition of `partition_total`
    /// rows, or `None` when the page is empty
    pub fn ordinal_range(&self, partition_total: i64) -> Option<(i64, i64)> {
        let resolve =
            |column: &ColumnRef| (column == &self.partition_total).then_some(partition_total);
        let mut low = 1;
        let mut high = partition_total;

        for comparison in &self.conjuncts {
            let bound = comparison.bound.evaluate(&resolve)?;
            match comparison.op {
                ComparisonOp::Gt => low = low.max(bound.saturating_add(1)),
                ComparisonOp::GtEq => low = low.max(bound),
                ComparisonOp::Lt => high = high.min(bound.saturating_sub(1)),
                ComparisonOp::LtEq => high = high.min(bound),
            }
        }

        (low <= high).then_some((low, high))
    }

    pub fn to_sql(&self) -> String {
        self.conjuncts
            .iter()
            .map(|c| format!("{} {} {}", self.ordinal, c.op.to_sql(), c.bound.to_sql()))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Compiles pagination arguments into an [`OrdinalPredicate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationBounds {
    ordinal: ColumnRef,
    partition_total: ColumnRef,
}

impl PaginationBounds {
    pub fn new(ordinal: ColumnRef, partition_total: ColumnRef) -> Self {
        Self {
            ordinal,
            partition_total,
        }
    }

    /// Conjuncts, in order: `> after`, `< before`, `<= after + first`,
    /// `>= effective_before - last`. Arguments are not validated here.
    pub fn predicate(&self, args: &PaginationArgs) -> OrdinalPredicate {
        use ComparisonOp::*;

        let after = args.after;
        let lower = OrdinalComparison::new(Gt, Operand::Literal(after));
        let before_bound = |before: i64| OrdinalComparison::new(Lt, Operand::Literal(before));
        let first_bound =
            |first: i64| OrdinalComparison::new(LtEq, Operand::Literal(after.saturating_add(first)));
        let last_from_before = |before: i64, last: i64| {
            OrdinalComparison::new(GtEq, Operand::Literal(before.saturating_sub(last)))
        };
        // One past the final row of the partition, resolved by the engine
        let last_from_end = |last: i64| {
            OrdinalComparison::new(
                GtEq,
                Operand::column(self.partition_total.clone()).plus(1).minus(last),
            )
        };

        let bounds = match (args.before, args.first, args.last) {
            (None, None, None) => vec![],
            (Some(before), None, None) => vec![before_bound(before)],
            (None, Some(first), None) => vec![first_bound(first)],
            (None, None, Some(last)) => vec![last_from_end(last)],
            (Some(before), Some(first), None) => vec![before_bound(before), first_bound(first)],
            (Some(before), None, Some(last)) => {
                vec![before_bound(before), last_from_before(before, last)]
            }
            // Middle slice: head window capped by `first`, tail window by `last`
            (None, Some(first), Some(last)) => vec![first_bound(first), last_from_end(last)],
            (Some(before), Some(first), Some(last)) => vec![
                before_bound(before),
                first_bound(first),
                last_from_before(before, last),
            ],
        };

        let mut conjuncts = Vec::with_capacity(bounds.len() + 1);
        conjuncts.push(lower);
        conjuncts.extend(bounds);

        OrdinalPredicate {
            ordinal: self.ordinal.clone(),
            partition_total: self.partition_total.clone(),
            conjuncts,
        }
    }
}

/// Relay `PageInfo` for one partition's page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_ordinal: Option<i64>,
    pub end_ordinal: Option<i64>,
    pub total_count: i64,
}

impl PageInfo {
    /// Page metadata derived from the predicate and the partition total the
    /// engine reported. An empty page reports no neighbours.
    pub fn from_window(predicate: &OrdinalPredicate, partition_total: i64) -> Self {
        match predicate.ordinal_range(partition_total) {
            Some((start, end)) => Self {
                has_previous_page: start > 1,
                has_next_page: end < partition_total,
                start_ordinal: Some(start),
                end_ordinal: Some(end),
                total_count: partition_total,
            },
            None => Self {
                has_previous_page: false,
                has_next_page: false,
                start_ordinal: None,
                end_ordinal: None,
                total_count: partition_total,
            },
        }
    }
}
