//! Result records produced by the analyzer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{
    ColumnUsage, ExpressionKind, JoinType, SubQueryType, TableType, TransformationType,
};

/// Structural decomposition of one SQL fragment.
///
/// The root call produces one of these for the whole input; every CTE body and
/// subquery gets its own, nested under [`CteDefinition::inner_analysis`] and
/// [`SubQueryInfo::inner_analysis`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// The text this result was computed from
    pub sql: String,

    /// Syntax errors as `"Line {line}, Column {column}: {message}"`. When non-empty every
    /// other list is empty.
    #[serde(default)]
    pub errors: Vec<String>,

    /// Tables, views, CTE references, derived tables and table functions
    #[serde(default)]
    pub tables: Vec<TableReference>,

    /// Columns mentioned in SELECT lists of this level
    #[serde(default)]
    pub select_columns: Vec<ColumnReference>,

    /// Columns mentioned in WHERE and HAVING
    #[serde(default)]
    pub predicate_columns: Vec<ColumnReference>,

    /// Columns mentioned in JOIN conditions
    #[serde(default)]
    pub join_columns: Vec<ColumnReference>,

    #[serde(default)]
    pub group_by_columns: Vec<ColumnReference>,

    #[serde(default)]
    pub order_by_columns: Vec<ColumnReference>,

    /// CTEs declared by this level's `WITH` clause
    #[serde(default)]
    pub ctes: Vec<CteDefinition>,

    /// Subqueries found directly at this level
    #[serde(default)]
    pub subqueries: Vec<SubQueryInfo>,

    #[serde(default)]
    pub column_lineage: Vec<ColumnLineage>,

    /// Exactly the columns the outermost query hands back to its caller
    #[serde(default)]
    pub final_output_columns: Vec<ColumnReference>,
}

impl AnalysisResult {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    /// A result carrying only syntax errors.
    pub fn from_errors(sql: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            sql: sql.into(),
            errors,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Distinct non-empty schema names across the table list, in first-seen order.
    ///
    /// Names differing only in case count once.
    pub fn schemas(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for schema in self.tables.iter().filter_map(|t| t.schema.as_deref()) {
            if schema.is_empty() || seen.iter().any(|s| s.eq_ignore_ascii_case(schema)) {
                continue;
            }
            seen.push(schema.to_string());
        }
        seen
    }

    /// Select columns of this level plus those of every nested analysis.
    pub fn total_select_column_count(&self) -> usize {
        let nested: usize = self
            .ctes
            .iter()
            .filter_map(|c| c.inner_analysis.as_deref())
            .chain(
                self.subqueries
                    .iter()
                    .filter_map(|s| s.inner_analysis.as_deref()),
            )
            .map(AnalysisResult::total_select_column_count)
            .sum();
        self.select_columns.len() + nested
    }

    /// Appends another statement's analysis of the same script.
    pub(crate) fn absorb(&mut self, other: AnalysisResult) {
        self.tables.extend(other.tables);
        self.select_columns.extend(other.select_columns);
        self.predicate_columns.extend(other.predicate_columns);
        self.join_columns.extend(other.join_columns);
        self.group_by_columns.extend(other.group_by_columns);
        self.order_by_columns.extend(other.order_by_columns);
        self.ctes.extend(other.ctes);
        self.subqueries.extend(other.subqueries);
        self.column_lineage.extend(other.column_lineage);
        self.final_output_columns.extend(other.final_output_columns);
    }
}

/// A relation mentioned in a FROM clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Bare relation name, or `[DerivedTable]` for a subquery in FROM
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(rename = "type")]
    pub table_type: TableType,

    /// Join this relation was brought in by; `None` for the first FROM item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_type: Option<JoinType>,

    /// False when the relation is only reachable through a subquery or derived table
    pub direct_reference: bool,

    /// Select columns attributed to this table during correlation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select_columns: Vec<ColumnReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_columns: Vec<ColumnReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicate_columns: Vec<ColumnReference>,
}

impl TableReference {
    pub fn new(name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            database: None,
            schema: None,
            name: name.into(),
            alias: None,
            table_type,
            join_type: None,
            direct_reference: true,
            select_columns: Vec::new(),
            join_columns: Vec::new(),
            predicate_columns: Vec::new(),
        }
    }

    /// The name columns use to refer to this table: its alias, else its name.
    pub fn reference_identifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A column mention, classified by clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReference {
    /// Qualifier as written: `p` in `p.id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_alias: Option<String>,

    /// Table name, filled for three- and four-part names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Column name, or `*`, `[Expression]`, `[Unknown]`
    pub column_name: String,

    /// Output alias given with `AS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    pub usage: ColumnUsage,

    pub expression_kind: ExpressionKind,

    /// Full expression text for computed items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Sort direction; only meaningful for ORDER BY entries
    pub ascending: bool,
}

impl ColumnReference {
    pub fn new(column_name: impl Into<String>, usage: ColumnUsage) -> Self {
        Self {
            table_alias: None,
            table_name: None,
            schema: None,
            column_name: column_name.into(),
            alias: None,
            usage,
            expression_kind: ExpressionKind::Column,
            expression: None,
            ascending: true,
        }
    }

    /// The qualifier used to find the owning table: alias, else table name.
    pub fn source_identifier(&self) -> Option<&str> {
        self.table_alias
            .as_deref()
            .or(self.table_name.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// The name the caller sees for this column: alias, else column name.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.column_name)
    }
}

/// One entry of a `WITH` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CteDefinition {
    pub name: String,

    /// Column names declared as `name (a, b, c)`
    #[serde(default)]
    pub columns: Vec<String>,

    /// Body text without the surrounding parentheses
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_analysis: Option<Box<AnalysisResult>>,
}

/// A nested query found at this level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubQueryInfo {
    /// Alias of a derived table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    pub query: String,

    #[serde(rename = "type")]
    pub subquery_type: SubQueryType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_analysis: Option<Box<AnalysisResult>>,
}

/// A base column feeding an output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Resolved table name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Qualifier as written, or the resolved table's alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_alias: Option<String>,

    pub column_name: String,
}

impl SourceColumn {
    /// `alias-or-name:column`, the form used in lineage signatures.
    pub fn signature(&self) -> String {
        let owner = self
            .table_alias
            .as_deref()
            .or(self.table_name.as_deref())
            .unwrap_or_default();
        format!("{owner}:{}", self.column_name)
    }
}

/// Where one output column comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLineage {
    pub output_column: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_alias: Option<String>,

    #[serde(default)]
    pub source_columns: Vec<SourceColumn>,

    pub is_computed: bool,

    pub expression: String,

    pub transformation: TransformationType,
}

/// Outcome of a parse-only check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxValidation {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}
