//! Core error types for Smart Query RS
//!
//! Every variant is raised synchronously by the mutation that detected it.
//! The state the mutation targeted is left exactly as it was.

use thiserror::Error;

use crate::types::Operator;

/// Core error type for all query builder operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid sort key: {key}")]
    NotSortableKey { key: String },

    #[error("Key path \"{path}\" is not filterable")]
    NotFilterableKey { path: String },

    #[error("Sort key not found or does not match current sort: {key}")]
    SortKeyMismatch {
        key: String,
        /// Key of the sort that was active when the call was made
        active: Option<String>,
    },

    #[error("Key path \"{path}\" does not exist in current filters")]
    FilterNotFound { path: String },

    #[error("Invalid operator {operator} for value {value}: {reason}")]
    InvalidOperatorValue {
        operator: Operator,
        value: String,
        reason: String,
    },

    #[error("Invalid query parameter {key}: {message}")]
    InvalidParam { key: String, message: String },
}

impl QueryError {
    pub fn not_sortable(key: impl Into<String>) -> Self {
        Self::NotSortableKey { key: key.into() }
    }

    pub fn not_filterable(path: impl Into<String>) -> Self {
        Self::NotFilterableKey { path: path.into() }
    }

    pub fn sort_mismatch(key: impl Into<String>, active: Option<&str>) -> Self {
        Self::SortKeyMismatch {
            key: key.into(),
            active: active.map(str::to_string),
        }
    }

    pub fn filter_not_found(path: impl Into<String>) -> Self {
        Self::FilterNotFound { path: path.into() }
    }

    pub fn invalid_value(
        operator: Operator,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOperatorValue {
            operator,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_param(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::NotSortableKey { .. } => "not_sortable_key",
            QueryError::NotFilterableKey { .. } => "not_filterable_key",
            QueryError::SortKeyMismatch { .. } => "sort_key_mismatch",
            QueryError::FilterNotFound { .. } => "filter_not_found",
            QueryError::InvalidOperatorValue { .. } => "invalid_operator_value",
            QueryError::InvalidParam { .. } => "invalid_param",
        }
    }
}
