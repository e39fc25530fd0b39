//! Function-name knowledge used by classification and column extraction.

use sqlparser::ast::ObjectName;
use std::collections::HashMap;
use std::sync::LazyLock;

/// The closed set of aggregate function names (lowercase).
const AGGREGATE_FUNCTIONS: &[&str] = &[
    "sum",
    "count",
    "avg",
    "min",
    "max",
    "stdev",
    "stdevp",
    "var",
    "varp",
    "count_big",
    "grouping",
    "grouping_id",
    "string_agg",
    "approx_count_distinct",
];

/// Functions that only convert their argument to another type.
const CAST_FUNCTIONS: &[&str] = &["cast", "convert", "try_cast", "try_convert"];

/// Functions that pick a value by condition.
const CASE_FUNCTIONS: &[&str] = &["iif", "if", "choose"];

/// Argument positions (0-based) holding a date-part keyword such as `day` in
/// `DATEDIFF(day, a, b)`. These parse as identifiers but are never columns.
static DATE_PART_ARGS: LazyLock<HashMap<&'static str, &'static [usize]>> = LazyLock::new(|| {
    HashMap::from([
        ("datediff", &[0][..]),
        ("datediff_big", &[0][..]),
        ("dateadd", &[0][..]),
        ("datepart", &[0][..]),
        ("datename", &[0][..]),
        ("datetrunc", &[0][..]),
        ("date_part", &[0][..]),
        ("date_trunc", &[0][..]),
        ("date_diff", &[2][..]),
        ("timestampdiff", &[0][..]),
        ("timestampadd", &[0][..]),
    ])
});

/// Last part of a possibly qualified function name, lowercased.
pub(crate) fn function_base_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.to_lowercase())
        .unwrap_or_default()
}

pub(crate) fn is_aggregate(name: &str) -> bool {
    AGGREGATE_FUNCTIONS.contains(&name.to_lowercase().as_str())
}

pub(crate) fn is_cast(name: &str) -> bool {
    CAST_FUNCTIONS.contains(&name.to_lowercase().as_str())
}

pub(crate) fn is_conditional(name: &str) -> bool {
    CASE_FUNCTIONS.contains(&name.to_lowercase().as_str())
}

/// Whether argument `index` of `function` is a date-part keyword rather than an expression.
pub(crate) fn is_date_part_arg(function: &str, index: usize) -> bool {
    DATE_PART_ARGS
        .get(function.to_lowercase().as_str())
        .is_some_and(|indices| indices.contains(&index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("SUM", true)]
    #[case("count_big", true)]
    #[case("Grouping_Id", true)]
    #[case("approx_count_distinct", true)]
    #[case("coalesce", false)]
    #[case("upper", false)]
    fn test_is_aggregate(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_aggregate(name), expected);
    }

    #[rstest]
    #[case("DATEDIFF", 0, true)]
    #[case("datediff", 1, false)]
    #[case("DATEADD", 0, true)]
    #[case("date_diff", 2, true)]
    #[case("date_diff", 0, false)]
    #[case("upper", 0, false)]
    fn test_date_part_args(#[case] name: &str, #[case] index: usize, #[case] expected: bool) {
        assert_eq!(is_date_part_arg(name, index), expected);
    }

    #[test]
    fn test_cast_and_conditional() {
        assert!(is_cast("TRY_CONVERT"));
        assert!(!is_cast("coalesce"));
        assert!(is_conditional("IIF"));
        assert!(!is_conditional("nullif"));
    }
}
