//! Input types: dialect selection and analysis/format options.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL dialect used to parse the input.
///
/// T-SQL is the default: the aggregate set, the `GO` batch separator and the
/// sentinel spellings in the result all follow SQL Server conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    #[default]
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect,
            GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }

    /// Lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Ansi => "ansi",
            Self::Bigquery => "bigquery",
            Self::Clickhouse => "clickhouse",
            Self::Databricks => "databricks",
            Self::Duckdb => "duckdb",
            Self::Hive => "hive",
            Self::Mssql => "mssql",
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default recursion depth for nested CTE/subquery analysis.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Options controlling the analysis behavior.
///
/// `Default` is the comprehensive preset: every pass enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    /// Dialect used to parse the input and every nested fragment
    pub dialect: Dialect,

    /// Keep table references only reachable through a nested scope
    pub include_inner_tables: bool,

    /// Collapse structurally equal entries in every result list
    pub deduplicate_results: bool,

    /// Recursively analyze CTE bodies and subqueries into `innerAnalysis`
    pub analyze_nested_queries: bool,

    /// Build output-column lineage
    pub build_column_lineage: bool,

    /// Deepest nesting level that still gets its own inner analysis
    pub max_nesting_depth: usize,
}

impl AnalysisOptions {
    /// Structure only: no nested analysis and no lineage.
    pub fn performance() -> Self {
        Self {
            analyze_nested_queries: false,
            build_column_lineage: false,
            ..Self::comprehensive()
        }
    }

    /// Every pass enabled.
    pub fn comprehensive() -> Self {
        Self {
            dialect: Dialect::default(),
            include_inner_tables: true,
            deduplicate_results: true,
            analyze_nested_queries: true,
            build_column_lineage: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::comprehensive()
    }
}

/// Options for [`crate::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    pub dialect: Dialect,
    /// Multi-line indented output instead of a single line per statement
    pub pretty: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            pretty: true,
        }
    }
}
