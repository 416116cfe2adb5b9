//! URL query parameters
//!
//! Parameters are emitted in a fixed order: `page`, `limit`, `order_by`,
//! `order_type`, `search`, `filter`. The `filter` value is the nested filter
//! object serialized as JSON.

use serde_json::Value;
use sq_core::{Order, QueryError, QueryResult};
use std::fmt;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::filters::FilterSnapshot;
use crate::nesting;

/// Query state as URL parameters; absent fields are not emitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    pub order_type: Option<Order>,
    pub search: Option<String>,
    /// Flat filter view; emitted in its nested form
    pub filter: Option<FilterSnapshot>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present parameters as `(key, value)` pairs in emission order
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("order_by", order_by.clone()));
        }
        if let Some(order_type) = self.order_type {
            pairs.push(("order_type", order_type.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", nesting::to_nested(filter).to_string()));
        }
        pairs
    }

    /// Value of one parameter as it would be emitted
    pub fn get(&self, key: &str) -> Option<String> {
        self.pairs()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Encode as an `application/x-www-form-urlencoded` query string
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }

    /// Parse a query string (a leading `?` is allowed)
    ///
    /// `page` and `limit` must be integers and `order_type` must name an
    /// order. A malformed `filter` is logged and dropped. Unknown keys are
    /// ignored and a repeated key keeps its last value.
    pub fn parse(query: &str) -> QueryResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "page" => params.page = Some(parse_int("page", &value)?),
                "limit" => params.limit = Some(parse_int("limit", &value)?),
                "order_by" => params.order_by = Some(value.into_owned()),
                "order_type" => {
                    let order = Order::from_str(&value).ok_or_else(|| {
                        let message = format!("unknown order \"{value}\"");
                        QueryError::invalid_param("order_type", message)
                    })?;
                    params.order_type = Some(order);
                }
                "search" => params.search = Some(value.into_owned()),
                "filter" => params.filter = parse_filter(&value),
                other => {
                    debug!(key = %other, "Ignoring unknown query parameter");
                }
            }
        }

        Ok(params)
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn parse_int(key: &str, value: &str) -> QueryResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            QueryError::invalid_param(key, format!("expected an integer, got \"{value}\""))
        })
}

fn parse_filter(value: &str) -> Option<FilterSnapshot> {
    let parsed = serde_json::from_str::<Value>(value)
        .map_err(|e| QueryError::invalid_param("filter", e.to_string()))
        .and_then(|json| nesting::from_nested(&json));

    match parsed {
        Ok(filter) => Some(filter),
        Err(e) => {
            warn!(error = %e, "Dropping malformed filter parameter");
            None
        }
    }
}
