use serde_json::Value;
use std::collections::BTreeMap;

/// Represents different types of SQL conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        field: String,
        operator: String,
        value: Value,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
    NotIn {
        field: String,
        values: Vec<Value>,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    Raw {
        sql: String,
    },
}

impl Condition {
    /// Equality condition, or `IS NULL` when the value is null
    pub fn eq(field: &str, value: Value) -> Self {
        if value.is_null() {
            Condition::IsNull {
                field: field.to_string(),
            }
        } else {
            Condition::Simple {
                field: field.to_string(),
                operator: "=".to_string(),
                value,
            }
        }
    }

    /// Convert condition to SQL string
    pub fn to_sql(&self) -> String {
        match self {
            Condition::Simple {
                field,
                operator,
                value,
            } => {
                format!("{} {} {}", field, operator, format_value(value))
            }
            // An empty key set matches nothing; `IN ()` is a syntax error
            Condition::In { values, .. } if values.is_empty() => "FALSE".to_string(),
            Condition::In { field, values } => {
                format!("{field} IN ({})", format_list(values))
            }
            Condition::NotIn { values, .. } if values.is_empty() => "TRUE".to_string(),
            Condition::NotIn { field, values } => {
                format!("{field} NOT IN ({})", format_list(values))
            }
            Condition::IsNull { field } => {
                format!("{field} IS NULL")
            }
            Condition::IsNotNull { field } => {
                format!("{field} IS NOT NULL")
            }
            Condition::Raw { sql } => sql.clone(),
        }
    }

    /// SQL that keeps its meaning next to other conditions; raw fragments are parenthesized
    pub fn to_grouped_sql(&self) -> String {
        match self {
            Condition::Raw { sql } => format!("({sql})"),
            _ => self.to_sql(),
        }
    }
}

/// Represents a WHERE clause that can contain multiple conditions
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl WhereClause {
    fn single(condition: Condition) -> Self {
        Self {
            conditions: vec![condition],
            operator: LogicalOperator::And,
        }
    }

    /// Create a simple WHERE clause with a single condition
    pub fn simple(field: &str, operator: &str, value: Value) -> Self {
        Self::single(Condition::Simple {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
        })
    }

    /// Create WHERE IN clause
    pub fn in_condition(field: &str, values: Vec<Value>) -> Self {
        Self::single(Condition::In {
            field: field.to_string(),
            values,
        })
    }

    /// Create WHERE NOT IN clause
    pub fn not_in_condition(field: &str, values: Vec<Value>) -> Self {
        Self::single(Condition::NotIn {
            field: field.to_string(),
            values,
        })
    }

    /// Create WHERE IS NULL clause
    pub fn is_null(field: &str) -> Self {
        Self::single(Condition::IsNull {
            field: field.to_string(),
        })
    }

    /// Create WHERE IS NOT NULL clause
    pub fn is_not_null(field: &str) -> Self {
        Self::single(Condition::IsNotNull {
            field: field.to_string(),
        })
    }

    /// Create raw SQL condition
    pub fn raw(sql: &str) -> Self {
        Self::single(Condition::Raw {
            sql: sql.to_string(),
        })
    }

    /// Equality on every `(column, value)` pair, columns qualified with `table`
    /// unless they already carry a qualifier
    pub fn equalities(table: &str, filter: &BTreeMap<String, Value>) -> Self {
        let conditions = filter
            .iter()
            .map(|(column, value)| {
                let field = if column.contains('.') {
                    column.clone()
                } else {
                    format!("{table}.{column}")
                };
                Condition::eq(&field, value.clone())
            })
            .collect();
        Self::and(conditions)
    }

    /// Combine multiple conditions with AND
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::And,
        }
    }

    /// Combine multiple conditions with OR
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::Or,
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            return "1=1".to_string();
        }

        if self.conditions.len() == 1 {
            return self.conditions[0].to_sql();
        }

        let operator_str = match self.operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };

        let condition_sqls: Vec<String> = self
            .conditions
            .iter()
            .map(Condition::to_grouped_sql)
            .collect();

        format!("({})", condition_sqls.join(operator_str))
    }

    /// SQL safe to AND with sibling clauses
    pub fn to_grouped_sql(&self) -> String {
        match self.conditions.as_slice() {
            [only] => only.to_grouped_sql(),
            _ => self.to_sql(),
        }
    }
}

fn format_list(values: &[Value]) -> String {
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a JSON value for SQL
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => format!("'{}'", value.to_string().replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_condition() {
        let clause = WhereClause::in_condition("posts.user_id", vec![json!(50), json!(51)]);
        assert_eq!(clause.to_sql(), "posts.user_id IN (50, 51)");
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let clause = WhereClause::in_condition("posts.user_id", Vec::new());
        assert_eq!(clause.to_sql(), "FALSE");
        let clause = WhereClause::not_in_condition("posts.user_id", Vec::new());
        assert_eq!(clause.to_sql(), "TRUE");
    }

    #[test]
    fn test_string_values_are_escaped() {
        let clause = WhereClause::simple("posts.title", "=", json!("it's"));
        assert_eq!(clause.to_sql(), "posts.title = 'it''s'");
    }

    #[test]
    fn test_equalities_qualify_bare_columns() {
        let mut filter = BTreeMap::new();
        filter.insert("title".to_string(), json!("Hello"));
        filter.insert("users.active".to_string(), json!(true));
        filter.insert("deleted_at".to_string(), Value::Null);

        let clause = WhereClause::equalities("posts", &filter);
        assert_eq!(
            clause.to_sql(),
            "(posts.deleted_at IS NULL AND posts.title = 'Hello' AND users.active = true)"
        );
    }

    #[test]
    fn test_or_clause() {
        let clause = WhereClause::or(vec![
            Condition::IsNull {
                field: "posts.archived_at".to_string(),
            },
            Condition::eq("posts.pinned", json!(true)),
        ]);
        assert_eq!(
            clause.to_sql(),
            "(posts.archived_at IS NULL OR posts.pinned = true)"
        );
    }

    #[test]
    fn test_raw_conditions_are_grouped_when_combined() {
        let raw = WhereClause::raw("posts.published OR posts.pinned");
        assert_eq!(raw.to_sql(), "posts.published OR posts.pinned");
        assert_eq!(raw.to_grouped_sql(), "(posts.published OR posts.pinned)");

        let combined = WhereClause::and(vec![
            Condition::Raw {
                sql: "posts.published OR posts.pinned".to_string(),
            },
            Condition::eq("posts.user_id", json!(1)),
        ]);
        assert_eq!(
            combined.to_sql(),
            "((posts.published OR posts.pinned) AND posts.user_id = 1)"
        );
        assert_eq!(combined.to_grouped_sql(), combined.to_sql());
    }

    #[test]
    fn test_empty_clause_is_tautology() {
        assert_eq!(WhereClause::and(Vec::new()).to_sql(), "1=1");
    }
}
