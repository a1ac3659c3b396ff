use super::expr::ColumnRef;
use super::window::{OrderTerm, PartitionWindow, WindowColumn};
use crate::config::LoaderConfig;
use crate::constants::DEFAULT_RANK_SUFFIX;

/// Builds a rank column: a record's ordinal position by one column's value
/// within its partition
///
/// ```text
/// ROW_NUMBER() OVER (PARTITION BY posts.user_id ORDER BY posts.email ASC) AS email_rank
/// ```
///
/// Independent of pagination; project it wherever a rank is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPlanBuilder {
    column: String,
    partition_by: String,
    table: String,
    name_suffix: String,
}

impl RankPlanBuilder {
    pub fn new(column: &str, partition_by: &str, table: &str) -> Self {
        Self {
            column: column.to_string(),
            partition_by: partition_by.to_string(),
            table: table.to_string(),
            name_suffix: DEFAULT_RANK_SUFFIX.to_string(),
        }
    }

    /// Rank labelled with the configured `rank_suffix`
    pub fn from_config(
        config: &LoaderConfig,
        column: &str,
        partition_by: &str,
        table: &str,
    ) -> Self {
        Self::new(column, partition_by, table).with_suffix(&config.rank_suffix)
    }

    /// Replace the label suffix; a blank suffix labels the rank with the bare column name
    pub fn with_suffix(mut self, name_suffix: &str) -> Self {
        self.name_suffix = name_suffix.trim().to_string();
        self
    }

    /// Label of the rank column
    pub fn name(&self) -> String {
        format!("{}{}", self.column_ref().column, self.name_suffix)
    }

    fn column_ref(&self) -> ColumnRef {
        ColumnRef::parse(&self.column).or_qualify(&self.table)
    }

    pub fn window(&self) -> PartitionWindow {
        PartitionWindow::new(
            ColumnRef::parse(&self.partition_by).or_qualify(&self.table),
            [OrderTerm::asc(self.column_ref())],
        )
    }

    pub fn build(&self) -> WindowColumn {
        WindowColumn::row_number(self.window(), &self.name())
    }

    pub fn to_sql(&self) -> String {
        self.build().to_sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_column() {
        let rank = RankPlanBuilder::new("email", "user_id", "posts");
        assert_eq!(
            rank.to_sql(),
            "ROW_NUMBER() OVER (PARTITION BY posts.user_id ORDER BY posts.email ASC) AS email_rank"
        );
    }

    #[test]
    fn test_custom_and_empty_suffix() {
        let rank = RankPlanBuilder::new("position", "list_id", "items").with_suffix("_order");
        assert_eq!(rank.name(), "position_order");

        let rank = RankPlanBuilder::new("position", "list_id", "items").with_suffix("");
        assert_eq!(rank.name(), "position");
        assert!(rank.to_sql().ends_with("AS position"));

        let rank = RankPlanBuilder::new("position", "list_id", "items").with_suffix("   ");
        assert_eq!(rank.name(), "position");
        let rank = RankPlanBuilder::new("position", "list_id", "items").with_suffix(" _order ");
        assert_eq!(rank.name(), "position_order");
    }

    #[test]
    fn test_suffix_from_config() {
        let config = LoaderConfig {
            rank_suffix: "_position".to_string(),
            ..Default::default()
        };
        let rank = RankPlanBuilder::from_config(&config, "email", "user_id", "posts");
        assert_eq!(rank.name(), "email_position");
        assert!(rank.to_sql().ends_with("AS email_position"));
    }

    #[test]
    fn test_qualified_columns_are_kept() {
        let rank = RankPlanBuilder::new("users.name", "posts.user_id", "posts");
        assert_eq!(
            rank.to_sql(),
            "ROW_NUMBER() OVER (PARTITION BY posts.user_id ORDER BY users.name ASC) AS name_rank"
        );
    }
}
