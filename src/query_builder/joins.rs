use super::conditions::WhereClause;

/// Represents different types of SQL JOINs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    Cross,
}

impl JoinType {
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// Represents a SQL JOIN clause
///
/// Sort transforms use joins to bring a related table's column into reach of
/// the partition window (ordering posts by their author's name, for example).
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub source: String,
    pub on: Option<WhereClause>,
}

impl Join {
    /// Create an INNER JOIN
    pub fn inner(source: &str, on_condition: &str) -> Self {
        Self::on(JoinType::Inner, source, WhereClause::raw(on_condition))
    }

    /// Create a LEFT OUTER JOIN
    pub fn left_outer(source: &str, on_condition: &str) -> Self {
        Self::on(JoinType::LeftOuter, source, WhereClause::raw(on_condition))
    }

    /// Create a JOIN with a structured ON clause
    pub fn on(join_type: JoinType, source: &str, on: WhereClause) -> Self {
        Self {
            join_type,
            source: source.to_string(),
            on: Some(on),
        }
    }

    /// Create a CROSS JOIN
    pub fn cross(source: &str) -> Self {
        Self {
            join_type: JoinType::Cross,
            source: source.to_string(),
            on: None,
        }
    }

    /// Source table name or alias, used to avoid joining the same table twice
    pub fn source_name(&self) -> &str {
        self.source
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or(&self.source)
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.join_type.to_sql(), self.source);

        if let Some(ref on) = self.on {
            sql.push_str(&format!(" ON {}", on.to_sql()));
        }

        sql
    }
}
