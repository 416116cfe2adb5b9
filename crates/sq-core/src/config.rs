//! Configuration types and loading

use serde::{Deserialize, Serialize};

use crate::pagination::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::types::Operator;

/// Query builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Pagination defaults
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Filter handling
    #[serde(default)]
    pub filters: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaginationConfig {
    /// Page a new builder starts on and `reset` returns to
    pub default_page: i64,
    /// Page size a new builder starts with and `reset` returns to
    pub default_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Operators whose value is a list; string values are split into one
    pub multi_value_operators: Vec<Operator>,
    /// Separator for splitting string values of multi-value operators
    pub list_delimiter: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            multi_value_operators: vec![
                Operator::In,
                Operator::NotIn,
                Operator::Between,
                Operator::NotBetween,
            ],
            list_delimiter: ",".to_string(),
        }
    }
}

impl FilterConfig {
    /// Check if string values for `operator` are split into lists
    pub fn expects_array(&self, operator: Operator) -> bool {
        self.multi_value_operators.contains(&operator)
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl QueryConfig {
    /// Parse configuration from JSON; missing sections take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup over the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(page) = lookup("SMART_QUERY_DEFAULT_PAGE") {
            config.pagination.default_page = page
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("SMART_QUERY_DEFAULT_PAGE", "not an integer"))?;
        }
        if let Some(limit) = lookup("SMART_QUERY_DEFAULT_LIMIT") {
            config.pagination.default_limit = limit
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("SMART_QUERY_DEFAULT_LIMIT", "not an integer"))?;
        }
        if let Some(operators) = lookup("SMART_QUERY_MULTI_VALUE_OPERATORS") {
            config.filters.multi_value_operators = operators
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    Operator::from_str(name).ok_or_else(|| {
                        ConfigError::invalid(
                            "SMART_QUERY_MULTI_VALUE_OPERATORS",
                            format!("unknown operator {}", name),
                        )
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(delimiter) = lookup("SMART_QUERY_LIST_DELIMITER") {
            config.filters.list_delimiter = delimiter;
        }

        config.validate()?;
        tracing::debug!(
            default_page = config.pagination.default_page,
            default_limit = config.pagination.default_limit,
            multi_value_operators = config.filters.multi_value_operators.len(),
            "Query configuration loaded"
        );
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.default_page < 1 {
            return Err(ConfigError::invalid(
                "pagination.default_page",
                "must be at least 1",
            ));
        }
        if self.pagination.default_limit < 1 {
            return Err(ConfigError::invalid(
                "pagination.default_limit",
                "must be at least 1",
            ));
        }
        if self.filters.list_delimiter.is_empty() {
            return Err(ConfigError::invalid(
                "filters.list_delimiter",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.pagination.default_page, 1);
        assert_eq!(config.pagination.default_limit, 10);
        assert!(config.filters.expects_array(Operator::In));
        assert!(config.filters.expects_array(Operator::NotBetween));
        assert!(!config.filters.expects_array(Operator::Eq));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = QueryConfig::from_lookup(lookup_from(&[
            ("SMART_QUERY_DEFAULT_LIMIT", "25"),
            ("SMART_QUERY_MULTI_VALUE_OPERATORS", "in, notIn"),
            ("SMART_QUERY_LIST_DELIMITER", "|"),
        ]))
        .unwrap();

        assert_eq!(config.pagination.default_page, 1);
        assert_eq!(config.pagination.default_limit, 25);
        assert_eq!(
            config.filters.multi_value_operators,
            vec![Operator::In, Operator::NotIn]
        );
        assert_eq!(config.filters.list_delimiter, "|");
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = QueryConfig::from_lookup(lookup_from(&[("SMART_QUERY_DEFAULT_PAGE", "one")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = QueryConfig::from_lookup(lookup_from(&[(
            "SMART_QUERY_MULTI_VALUE_OPERATORS",
            "in,contains",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("unknown operator contains"));

        let err = QueryConfig::from_lookup(lookup_from(&[("SMART_QUERY_DEFAULT_LIMIT", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("pagination.default_limit"));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            QueryConfig::from_json(r#"{"pagination": {"default_page": 1, "default_limit": 50}}"#)
                .unwrap();
        assert_eq!(config.pagination.default_limit, 50);
        assert_eq!(config.filters, FilterConfig::default());
    }

    #[test]
    fn test_from_json_operator_names() {
        let config = QueryConfig::from_json(
            r#"{"filters": {"multi_value_operators": ["in", "between"], "list_delimiter": ";"}}"#,
        )
        .unwrap();
        assert!(config.filters.expects_array(Operator::Between));
        assert!(!config.filters.expects_array(Operator::NotIn));
    }

    #[test]
    fn test_from_json_rejects_empty_delimiter() {
        let err = QueryConfig::from_json(
            r#"{"filters": {"multi_value_operators": [], "list_delimiter": ""}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
