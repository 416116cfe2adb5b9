//! Operator value shapes
//!
//! Each operator accepts a fixed set of value kinds. Multi-value operators
//! (configured in [`FilterConfig`]) additionally turn a delimited string into
//! a trimmed list before it is stored.

use sq_core::config::FilterConfig;
use sq_core::{Operator, QueryError, QueryResult};

use crate::filters::FilterValue;

/// Kind of value an operator expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// null, bool, number or string
    Scalar,
    /// number or string (dates travel as strings)
    Comparable,
    /// string
    Pattern,
    /// one or more items: a list or a delimited string
    List,
    /// exactly two items: a list or a delimited string
    Range,
    /// null, bool or string
    Nullish,
    /// nested condition object or list of them
    Logical,
}

impl ValueShape {
    /// Shape expected by `operator`
    pub fn of(operator: Operator) -> Self {
        match operator {
            Operator::Eq | Operator::Ne => Self::Scalar,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => Self::Comparable,
            Operator::Like
            | Operator::NotLike
            | Operator::ILike
            | Operator::NotILike
            | Operator::StartsWith
            | Operator::EndsWith
            | Operator::Substring => Self::Pattern,
            Operator::In | Operator::NotIn => Self::List,
            Operator::Between | Operator::NotBetween => Self::Range,
            Operator::Is | Operator::Not => Self::Nullish,
            Operator::Or | Operator::And => Self::Logical,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Scalar => "expected a string, number, boolean or null",
            Self::Comparable => "expected a string or number",
            Self::Pattern => "expected a string",
            Self::List => "expected a non-empty list or delimited string",
            Self::Range => "expected exactly two values",
            Self::Nullish => "expected null, a boolean or a string",
            Self::Logical => "expected a condition object or list",
        }
    }
}

/// Split a delimited string into trimmed items
pub fn split_list(value: &str, delimiter: &str) -> Vec<String> {
    value
        .split(delimiter)
        .map(|item| item.trim().to_string())
        .collect()
}

/// Blank items do not count as values
fn all_present(items: &[String]) -> bool {
    items.iter().all(|item| !item.trim().is_empty())
}

/// Check that `value` fits the shape `operator` expects
pub fn validate(operator: Operator, value: &FilterValue, delimiter: &str) -> QueryResult<()> {
    let shape = ValueShape::of(operator);
    let fits = match (shape, value) {
        (ValueShape::Scalar, v) => v.is_scalar(),
        (ValueShape::Comparable, FilterValue::Number(_) | FilterValue::Text(_)) => true,
        (ValueShape::Pattern, FilterValue::Text(_)) => true,
        (ValueShape::List, FilterValue::List(items)) => !items.is_empty() && all_present(items),
        (ValueShape::List, FilterValue::Text(text)) => all_present(&split_list(text, delimiter)),
        (ValueShape::Range, FilterValue::List(items)) => items.len() == 2 && all_present(items),
        (ValueShape::Range, FilterValue::Text(text)) => {
            let items = split_list(text, delimiter);
            items.len() == 2 && all_present(&items)
        }
        (ValueShape::Nullish, FilterValue::Null | FilterValue::Bool(_) | FilterValue::Text(_)) => {
            true
        }
        (ValueShape::Logical, FilterValue::Object(_) | FilterValue::List(_)) => true,
        _ => false,
    };

    if fits {
        Ok(())
    } else {
        Err(QueryError::invalid_value(
            operator,
            value.to_string(),
            shape.describe(),
        ))
    }
}

/// Validate `value` for `operator` and convert it to its stored form
pub fn prepare(
    operator: Operator,
    value: FilterValue,
    config: &FilterConfig,
) -> QueryResult<FilterValue> {
    validate(operator, &value, &config.list_delimiter)?;
    Ok(normalize(operator, value, config))
}

/// Split string values of multi-value operators; other values pass through
pub fn normalize(operator: Operator, value: FilterValue, config: &FilterConfig) -> FilterValue {
    match value {
        FilterValue::Text(text) if config.expects_array(operator) => {
            FilterValue::List(split_list(&text, &config.list_delimiter))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_list_trims() {
        assert_eq!(split_list("1, 2, 3", ","), vec!["1", "2", "3"]);
        assert_eq!(split_list("a|b", "|"), vec!["a", "b"]);
        assert_eq!(split_list("solo", ","), vec!["solo"]);
    }

    #[test]
    fn test_scalar_operators() {
        assert!(validate(Operator::Eq, &FilterValue::from("active"), ",").is_ok());
        assert!(validate(Operator::Eq, &FilterValue::from(3), ",").is_ok());
        assert!(validate(Operator::Ne, &FilterValue::Null, ",").is_ok());
        assert!(validate(Operator::Eq, &FilterValue::from(vec!["a", "b"]), ",").is_err());
    }

    #[test]
    fn test_pattern_operators_need_strings() {
        assert!(validate(Operator::Like, &FilterValue::from("%a%"), ",").is_ok());
        let err = validate(Operator::ILike, &FilterValue::from(5), ",").unwrap_err();
        assert_eq!(err.error_code(), "invalid_operator_value");
        assert_eq!(
            err.to_string(),
            "Invalid operator iLike for value 5: expected a string"
        );
    }

    #[test]
    fn test_comparison_operators() {
        assert!(validate(Operator::Gte, &FilterValue::from(10), ",").is_ok());
        assert!(validate(Operator::Lt, &FilterValue::from("2024-01-01"), ",").is_ok());
        assert!(validate(Operator::Gt, &FilterValue::Bool(true), ",").is_err());
    }

    #[test]
    fn test_list_operators() {
        assert!(validate(Operator::In, &FilterValue::from(vec!["1", "2"]), ",").is_ok());
        assert!(validate(Operator::In, &FilterValue::from("1, 2"), ",").is_ok());
        assert!(validate(Operator::NotIn, &FilterValue::List(vec![]), ",").is_err());
        assert!(validate(Operator::In, &FilterValue::from(""), ",").is_err());
        assert!(validate(Operator::In, &FilterValue::from(7), ",").is_err());
    }

    #[test]
    fn test_range_operators_need_two_values() {
        assert!(validate(Operator::Between, &FilterValue::from(vec!["1", "10"]), ",").is_ok());
        assert!(validate(Operator::NotBetween, &FilterValue::from("1,10"), ",").is_ok());
        assert!(validate(Operator::Between, &FilterValue::from("1"), ",").is_err());
        assert!(validate(Operator::Between, &FilterValue::from(vec!["1", "2", "3"]), ",").is_err());
    }

    #[test]
    fn test_blank_items_are_rejected() {
        assert!(validate(Operator::Between, &FilterValue::from("5,"), ",").is_err());
        assert!(validate(Operator::Between, &FilterValue::from(",5"), ",").is_err());
        assert!(validate(Operator::In, &FilterValue::from(" , "), ",").is_err());
        assert!(validate(Operator::In, &FilterValue::from("1,,2"), ",").is_err());
        assert!(validate(Operator::NotIn, &FilterValue::from(vec!["1", " "]), ",").is_err());
        assert!(validate(Operator::Between, &FilterValue::from(vec!["", "9"]), ",").is_err());
    }

    #[test]
    fn test_nullish_and_logical_operators() {
        assert!(validate(Operator::Is, &FilterValue::Null, ",").is_ok());
        assert!(validate(Operator::Not, &FilterValue::Bool(false), ",").is_ok());
        assert!(validate(Operator::Is, &FilterValue::from(1), ",").is_err());

        let condition = FilterValue::from_json(json!({"status": {"eq": "active"}})).unwrap();
        assert!(validate(Operator::Or, &condition, ",").is_ok());
        assert!(validate(Operator::And, &FilterValue::from("x"), ",").is_err());
    }

    #[test]
    fn test_prepare_splits_multi_value_strings() {
        let config = FilterConfig::default();
        let value = prepare(Operator::In, FilterValue::from("1, 2, 3"), &config).unwrap();
        assert_eq!(value, FilterValue::from(vec!["1", "2", "3"]));

        let value = prepare(Operator::Eq, FilterValue::from("1, 2"), &config).unwrap();
        assert_eq!(value, FilterValue::from("1, 2"));
    }

    #[test]
    fn test_prepare_keeps_strings_for_unlisted_operators() {
        let config = FilterConfig {
            multi_value_operators: vec![Operator::In],
            ..FilterConfig::default()
        };
        let value = prepare(Operator::Between, FilterValue::from("1,5"), &config).unwrap();
        assert_eq!(value, FilterValue::from("1,5"));
    }

    #[test]
    fn test_every_operator_has_a_shape() {
        for op in Operator::ALL {
            assert!(!ValueShape::of(op).describe().is_empty());
        }
    }
}
