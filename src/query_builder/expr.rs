//! Column references, sort directions and the small integer arithmetic used
//! by pagination bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a column, optionally qualified with a table or alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Parse `table.column` or a bare `column`
    pub fn parse(path: &str) -> Self {
        match path.split_once('.') {
            Some((table, column)) => Self::qualified(table, column),
            None => Self::new(path),
        }
    }

    /// Qualify a bare reference with `table`, leaving qualified ones untouched
    pub fn or_qualify(self, table: &str) -> Self {
        match self.table {
            Some(_) => self,
            None => Self::qualified(table, self.column),
        }
    }

    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// Direction of a sort term
///
/// Serialized the way API layers expose it: `ASCENDING` / `DESCENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Integer-valued operand of an ordinal comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(i64),
    Column(ColumnRef),
    Add(Box<Operand>, Box<Operand>),
    Sub(Box<Operand>, Box<Operand>),
}

impl Operand {
    pub fn column(column: ColumnRef) -> Self {
        Operand::Column(column)
    }

    pub fn plus(self, rhs: i64) -> Self {
        Operand::Add(Box::new(self), Box::new(Operand::Literal(rhs)))
    }

    pub fn minus(self, rhs: i64) -> Self {
        Operand::Sub(Box::new(self), Box::new(Operand::Literal(rhs)))
    }

    fn is_atomic(&self) -> bool {
        matches!(self, Operand::Literal(_) | Operand::Column(_))
    }

    /// Evaluate against concrete column values; `None` if a column is unbound
    pub fn evaluate<F>(&self, resolve: &F) -> Option<i64>
    where
        F: Fn(&ColumnRef) -> Option<i64>,
    {
        match self {
            Operand::Literal(value) => Some(*value),
            Operand::Column(column) => resolve(column),
            Operand::Add(lhs, rhs) => lhs.evaluate(resolve)?.checked_add(rhs.evaluate(resolve)?),
            Operand::Sub(lhs, rhs) => lhs.evaluate(resolve)?.checked_sub(rhs.evaluate(resolve)?),
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Operand::Literal(value) => value.to_string(),
            Operand::Column(column) => column.to_sql(),
            Operand::Add(lhs, rhs) => format!("{} + {}", lhs.to_sql(), rhs.to_grouped_sql()),
            Operand::Sub(lhs, rhs) => format!("{} - {}", lhs.to_sql(), rhs.to_grouped_sql()),
        }
    }

    // Arithmetic is left-associative, so only compound right operands need parens
    fn to_grouped_sql(&self) -> String {
        if self.is_atomic() {
            self.to_sql()
        } else {
            format!("({})", self.to_sql())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_rendering() {
        assert_eq!(ColumnRef::new("id").to_sql(), "id");
        assert_eq!(
            ColumnRef::qualified("posts", "user_id").to_sql(),
            "posts.user_id"
        );
        assert_eq!(ColumnRef::parse("posts.id"), ColumnRef::qualified("posts", "id"));
        assert_eq!(
            ColumnRef::new("title").or_qualify("posts"),
            ColumnRef::qualified("posts", "title")
        );
        assert_eq!(
            ColumnRef::qualified("users", "id").or_qualify("posts"),
            ColumnRef::qualified("users", "id")
        );
    }

    #[test]
    fn test_sort_direction_serialization() {
        assert_eq!(
            serde_json::to_string(&SortDirection::Descending).unwrap(),
            "\"DESCENDING\""
        );
        let parsed: SortDirection = serde_json::from_str("\"ASCENDING\"").unwrap();
        assert_eq!(parsed, SortDirection::Ascending);
        assert_eq!(SortDirection::Descending.as_sql(), "DESC");
    }

    #[test]
    fn test_operand_rendering_and_evaluation() {
        let total = ColumnRef::qualified("subquery", "total_count");
        let bound = Operand::column(total.clone()).plus(1).minus(3);
        assert_eq!(bound.to_sql(), "subquery.total_count + 1 - 3");

        let resolve = |c: &ColumnRef| (c == &total).then_some(4);
        assert_eq!(bound.evaluate(&resolve), Some(2));

        let nested = Operand::Literal(10).minus(5).plus(0);
        assert_eq!(nested.to_sql(), "10 - 5 + 0");
        let grouped = Operand::Sub(
            Box::new(Operand::Literal(10)),
            Box::new(Operand::Literal(5).plus(1)),
        );
        assert_eq!(grouped.to_sql(), "10 - (5 + 1)");
        assert_eq!(grouped.evaluate(&|_: &ColumnRef| None), Some(4));
    }

    #[test]
    fn test_unbound_column_evaluates_to_none() {
        let operand = Operand::column(ColumnRef::new("total_count")).plus(1);
        assert_eq!(operand.evaluate(&|_: &ColumnRef| None), None);
    }
}
