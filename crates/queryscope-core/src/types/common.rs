//! Tag enums shared by the result records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What kind of relation a [`super::TableReference`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum TableType {
    #[default]
    Table,
    View,
    /// A name declared by a `WITH` clause in this or an enclosing scope
    Cte,
    /// A subquery in `FROM`
    DerivedTable,
    TableValuedFunction,
}

/// The join a table reference participates in, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// The clause a column mention was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ColumnUsage {
    Select,
    Where,
    Having,
    Join,
    GroupBy,
    OrderBy,
}

/// Shape of the expression a column reference stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionKind {
    Column,
    Function,
    Aggregate,
    Literal,
    Subquery,
    Star,
    /// CASE, arithmetic, predicates and other operators
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SubQueryType {
    DerivedTable,
    ScalarSubquery,
    ExistsSubquery,
    InSubquery,
}

/// How an output column is computed from its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TransformationType {
    Direct,
    Cast,
    Function,
    Aggregate,
    Case,
    Arithmetic,
    Literal,
    Subquery,
    Unknown,
}

impl TransformationType {
    /// Whether the output differs from a plain pass-through of one column.
    pub fn is_computed(self) -> bool {
        !matches!(self, Self::Direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_serialization() {
        assert_eq!(
            serde_json::to_string(&TableType::TableValuedFunction).unwrap(),
            "\"tableValuedFunction\""
        );
        assert_eq!(
            serde_json::to_string(&ColumnUsage::GroupBy).unwrap(),
            "\"groupBy\""
        );
        assert_eq!(
            serde_json::to_string(&SubQueryType::ExistsSubquery).unwrap(),
            "\"existsSubquery\""
        );
    }

    #[test]
    fn test_is_computed() {
        assert!(!TransformationType::Direct.is_computed());
        assert!(TransformationType::Cast.is_computed());
        assert!(TransformationType::Unknown.is_computed());
    }
}
