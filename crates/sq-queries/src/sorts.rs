//! Sort state
//!
//! At most one field is sorted at a time. Adding a sort on another key
//! replaces the active one; updating or removing requires the caller to name
//! the active key.

use serde::{Deserialize, Serialize};
use sq_core::{KeyPath, Order, QueryError, QueryResult};
use std::sync::Arc;
use tracing::debug;

use crate::capabilities::CapabilityTable;

/// The active sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// Dot-joined key path being sorted on
    pub order_by: String,
    /// Sort order
    pub order_type: Order,
}

impl SortCriterion {
    pub fn new(order_by: impl Into<String>, order_type: Order) -> Self {
        Self {
            order_by: order_by.into(),
            order_type,
        }
    }

    pub fn asc(order_by: impl Into<String>) -> Self {
        Self::new(order_by, Order::Asc)
    }

    pub fn desc(order_by: impl Into<String>) -> Self {
        Self::new(order_by, Order::Desc)
    }

    /// Reverse the sort order
    pub fn reversed(mut self) -> Self {
        self.order_type = self.order_type.reverse();
        self
    }
}

/// Single-key sort state validated against the sortable table
#[derive(Debug, Clone, Default)]
pub struct SortState {
    sortable: Arc<CapabilityTable>,
    active: Option<SortCriterion>,
}

impl SortState {
    pub fn new(sortable: Arc<CapabilityTable>) -> Self {
        Self {
            sortable,
            active: None,
        }
    }

    /// Sort on `key`, replacing any active sort
    pub fn add_sort(&mut self, key: impl Into<KeyPath>, order: Order) -> QueryResult<&mut Self> {
        let key = key.into();
        self.ensure_sortable(&key)?;

        let criterion = SortCriterion::new(key.dotted(), order);
        if let Some(previous) = &self.active {
            if previous.order_by != criterion.order_by {
                debug!(
                    previous = %previous.order_by,
                    key = %criterion.order_by,
                    "Replacing active sort"
                );
            }
        }
        debug!(key = %criterion.order_by, order = %order, "Sort set");
        self.active = Some(criterion);
        Ok(self)
    }

    /// Change the order of the active sort on `key`
    pub fn update_sort(&mut self, key: impl Into<KeyPath>, order: Order) -> QueryResult<&mut Self> {
        let key = key.into();
        self.ensure_active(&key)?;
        // The table may have been swapped since the sort was added
        self.ensure_sortable(&key)?;

        if let Some(active) = self.active.as_mut() {
            active.order_type = order;
        }
        debug!(key = %key, order = %order, "Sort updated");
        Ok(self)
    }

    /// Clear the active sort on `key`
    pub fn remove_sort(&mut self, key: impl Into<KeyPath>) -> QueryResult<&mut Self> {
        let key = key.into();
        self.ensure_active(&key)?;
        self.active = None;
        debug!(key = %key, "Sort removed");
        Ok(self)
    }

    pub fn reset(&mut self) -> &mut Self {
        self.active = None;
        self
    }

    /// The active sort, if any
    pub fn sort(&self) -> Option<&SortCriterion> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Check whether `key` may be sorted on
    pub fn is_sortable(&self, key: &KeyPath) -> bool {
        self.sortable.allows(key)
    }

    /// Swap the sortable table, keeping the active sort
    pub fn rebind(&mut self, sortable: Arc<CapabilityTable>) -> &mut Self {
        self.sortable = sortable;
        self
    }

    fn ensure_sortable(&self, key: &KeyPath) -> QueryResult<()> {
        if self.sortable.allows(key) {
            Ok(())
        } else {
            debug!(key = %key, "Rejected sort on non-sortable key");
            Err(QueryError::not_sortable(key.dotted()))
        }
    }

    fn ensure_active(&self, key: &KeyPath) -> QueryResult<()> {
        let active = self.active.as_ref().map(|c| c.order_by.as_str());
        if active == Some(key.dotted().as_str()) {
            Ok(())
        } else {
            Err(QueryError::sort_mismatch(key.dotted(), active))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SortState {
        SortState::new(Arc::new(CapabilityTable::from_paths([
            "id",
            "name",
            "company.id",
            "company.name",
        ])))
    }

    #[test]
    fn test_initial_state_is_unset() {
        assert!(state().sort().is_none());
    }

    #[test]
    fn test_add_sort() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc).unwrap();
        assert_eq!(sort.sort(), Some(&SortCriterion::asc("id")));
    }

    #[test]
    fn test_add_nested_sort() {
        let mut sort = state();
        sort.add_sort(["company", "id"], Order::Desc).unwrap();
        assert_eq!(sort.sort(), Some(&SortCriterion::desc("company.id")));
    }

    #[test]
    fn test_add_sort_rejects_unknown_key() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc).unwrap();

        let err = sort.add_sort("email", Order::Desc).unwrap_err();
        assert_eq!(err, QueryError::not_sortable("email"));
        assert_eq!(sort.sort(), Some(&SortCriterion::asc("id")));

        let err = sort.add_sort("company.invalid.field", Order::Asc).unwrap_err();
        assert_eq!(err.to_string(), "Invalid sort key: company.invalid.field");
    }

    #[test]
    fn test_add_sort_replaces_active() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc)
            .unwrap()
            .add_sort("name", Order::Desc)
            .unwrap();
        assert_eq!(sort.sort(), Some(&SortCriterion::desc("name")));
    }

    #[test]
    fn test_update_sort() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc).unwrap();
        sort.update_sort("id", Order::Desc).unwrap();
        assert_eq!(sort.sort(), Some(&SortCriterion::desc("id")));
    }

    #[test]
    fn test_update_sort_requires_active_key() {
        let mut sort = state();
        let err = sort.update_sort("id", Order::Desc).unwrap_err();
        assert!(matches!(err, QueryError::SortKeyMismatch { active: None, .. }));

        sort.add_sort("id", Order::Asc).unwrap();
        let err = sort.update_sort("name", Order::Desc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Sort key not found or does not match current sort: name"
        );
        assert_eq!(sort.sort(), Some(&SortCriterion::asc("id")));
    }

    #[test]
    fn test_update_sort_rechecks_capability() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc).unwrap();
        sort.rebind(Arc::new(CapabilityTable::from_paths(["name"])));

        let err = sort.update_sort("id", Order::Desc).unwrap_err();
        assert_eq!(err, QueryError::not_sortable("id"));
        assert_eq!(sort.sort(), Some(&SortCriterion::asc("id")));
    }

    #[test]
    fn test_remove_sort() {
        let mut sort = state();
        sort.add_sort("id", Order::Asc).unwrap();
        sort.remove_sort("id").unwrap();
        assert!(sort.sort().is_none());
    }

    #[test]
    fn test_remove_sort_requires_active_key() {
        let mut sort = state();
        assert!(sort.remove_sort("id").is_err());

        sort.add_sort("id", Order::Asc).unwrap();
        let err = sort.remove_sort("name").unwrap_err();
        assert_eq!(err.error_code(), "sort_key_mismatch");
        assert!(sort.is_active());
    }

    #[test]
    fn test_reset() {
        let mut sort = state();
        sort.reset();
        assert!(sort.sort().is_none());

        sort.add_sort("company.name", Order::Asc).unwrap();
        sort.reset();
        assert!(sort.sort().is_none());
    }

    #[test]
    fn test_criterion_serializes_wire_names() {
        let json = serde_json::to_value(SortCriterion::desc("name")).unwrap();
        assert_eq!(json, serde_json::json!({"order_by": "name", "order_type": "DESC"}));
    }

    #[test]
    fn test_criterion_reversed() {
        assert_eq!(SortCriterion::asc("id").reversed(), SortCriterion::desc("id"));
    }
}
