//! # Loader Constants
//!
//! Column labels and defaults shared by the plan builder, the executor and the
//! configuration layer.

/// Label of the `ROW_NUMBER()` window column carrying each row's ordinal
pub const ORDINAL_COLUMN: &str = "row_number";

/// Label of the `COUNT(*)` window column carrying each partition's total
pub const TOTAL_COUNT_COLUMN: &str = "total_count";

/// Alias of the derived table wrapping the windowed subplan
pub const DEFAULT_SUBQUERY_ALIAS: &str = "subquery";

/// Suffix appended to ranked column labels
pub const DEFAULT_RANK_SUFFIX: &str = "_rank";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "FANCY_LOADER";

/// Base name of configuration files (`fancy-loader.toml`, `fancy-loader-test.yaml`, ...)
pub const CONFIG_FILE_STEM: &str = "fancy-loader";

/// Postgres truncates identifiers beyond this length
pub const MAX_IDENTIFIER_LENGTH: usize = 63;
