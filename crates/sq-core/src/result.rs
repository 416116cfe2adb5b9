//! Result type alias

use crate::error::QueryError;

/// Standard Result type for query builder operations
pub type QueryResult<T> = Result<T, QueryError>;
