//! Query descriptor
//!
//! The complete request description assembled from pagination, sort,
//! search and filter state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sq_core::{Order, PaginationSnapshot};

use crate::filters::FilterSnapshot;
use crate::nesting;
use crate::sorts::SortCriterion;

/// Assembled query, serialized with the wire key names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<Order>,
    #[serde(default)]
    pub search: String,
    /// Flat filter view, keyed by dot-joined path
    #[serde(rename = "where", default)]
    pub where_: FilterSnapshot,
}

impl QueryDescriptor {
    /// Assemble a descriptor from the individual state snapshots
    pub fn assemble(
        pagination: PaginationSnapshot,
        sort: Option<&SortCriterion>,
        search: &str,
        filters: FilterSnapshot,
    ) -> Self {
        Self {
            page: pagination.page,
            limit: pagination.limit,
            offset: pagination.offset,
            total: pagination.total,
            order_by: sort.map(|s| s.order_by.clone()),
            order_type: sort.map(|s| s.order_type),
            search: search.to_string(),
            where_: filters,
        }
    }

    /// The active sort, if any
    pub fn sort(&self) -> Option<SortCriterion> {
        match (&self.order_by, self.order_type) {
            (Some(order_by), Some(order_type)) => {
                Some(SortCriterion::new(order_by.clone(), order_type))
            }
            _ => None,
        }
    }

    /// Filters in their nested form
    pub fn nested_where(&self) -> Value {
        nesting::to_nested(&self.where_)
    }

    pub fn has_filters(&self) -> bool {
        !self.where_.is_empty()
    }
}
