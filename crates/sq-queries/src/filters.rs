//! Filter state
//!
//! Filters are kept as a flat map from dot-joined field path to the
//! operators applied to that field. The nested form sent to the API is
//! derived from this map on demand (see [`crate::nesting`]).
//!
//! Every path stored here was filterable when it was inserted, and a field
//! whose last operator is removed disappears from the map.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use sq_core::config::FilterConfig;
use sq_core::{KeyPath, Operator, QueryError, QueryResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::capabilities::CapabilityTable;
use crate::nesting;
use crate::operators;

/// Operators applied to one field
pub type OperatorMap = BTreeMap<Operator, FilterValue>;

/// Flat view of all filters, keyed by dot-joined field path
pub type FilterSnapshot = BTreeMap<String, OperatorMap>;

/// Filter value types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// JSON null (for `is` / `not` checks)
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// Single string value
    Text(String),
    /// List of string values
    List(Vec<String>),
    /// Nested condition object (for `or` / `and`)
    Object(Map<String, Value>),
}

impl FilterValue {
    /// Convert from JSON. Arrays may hold scalars, which are stringified;
    /// arrays holding arrays or objects are rejected.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => Some(Self::Number(n)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Value::Object(map) => Some(Self::Object(map)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Object(map) => Value::Object(map.clone()),
        }
    }

    /// Check if the value is a single scalar
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::Text(_)
        )
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).ok_or_else(|| {
            serde::de::Error::custom("lists may only hold strings, numbers or booleans")
        })
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for FilterValue {
    /// Non-finite numbers have no JSON form and become `Null`
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Map<String, Value>> for FilterValue {
    fn from(map: Map<String, Value>) -> Self {
        Self::Object(map)
    }
}

/// One `{field, operator, value}` condition for bulk application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Dot-joined field path
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl FilterEntry {
    pub fn new(
        field: impl Into<KeyPath>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into().dotted(),
            operator,
            value: value.into(),
        }
    }
}

/// Multi-field filter state validated against the filterable table
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    filterable: Arc<CapabilityTable>,
    config: FilterConfig,
    filters: FilterSnapshot,
}

impl FilterState {
    pub fn new(filterable: Arc<CapabilityTable>, config: FilterConfig) -> Self {
        Self {
            filterable,
            config,
            filters: FilterSnapshot::new(),
        }
    }

    /// Add `operator: value` to the field's operators
    ///
    /// A field may carry several operators (`gte` and `lte` for a range);
    /// adding an operator the field already has replaces its value.
    pub fn add_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> QueryResult<&mut Self> {
        let path = field.into();
        self.ensure_filterable(&path)?;
        let value = operators::prepare(operator, value.into(), &self.config)?;

        debug!(field = %path, operator = %operator, "Filter added");
        self.filters
            .entry(path.dotted())
            .or_default()
            .insert(operator, value);
        Ok(self)
    }

    /// Replace every operator on an existing field with `operator: value`
    ///
    /// With `operator` or `value` missing the call only checks that the field
    /// is filterable and currently filtered.
    pub fn update_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Option<Operator>,
        value: Option<FilterValue>,
    ) -> QueryResult<&mut Self> {
        let path = field.into();
        self.ensure_filterable(&path)?;

        let key = path.dotted();
        if !self.filters.contains_key(&key) {
            debug!(field = %key, "Rejected update of unset filter");
            return Err(QueryError::filter_not_found(key));
        }

        let (Some(operator), Some(value)) = (operator, value) else {
            return Ok(self);
        };
        let value = operators::prepare(operator, value, &self.config)?;

        debug!(field = %key, operator = %operator, "Filter replaced");
        self.filters.insert(key, OperatorMap::from([(operator, value)]));
        Ok(self)
    }

    /// Remove one operator, or the whole field when `operator` is `None`
    ///
    /// Removing something that is not set does nothing.
    pub fn remove_filter(
        &mut self,
        field: impl Into<KeyPath>,
        operator: Option<Operator>,
    ) -> &mut Self {
        let key = field.into().dotted();

        match operator {
            Some(operator) => {
                if let Some(conditions) = self.filters.get_mut(&key) {
                    conditions.remove(&operator);
                    if conditions.is_empty() {
                        self.filters.remove(&key);
                    }
                    debug!(field = %key, operator = %operator, "Filter operator removed");
                }
            }
            None => {
                if self.filters.remove(&key).is_some() {
                    debug!(field = %key, "Filter removed");
                }
            }
        }
        self
    }

    /// Apply a batch of conditions
    ///
    /// Each entry sets its field to exactly `{operator: value}`, so a later
    /// entry for the same field overwrites an earlier one. With
    /// `reset_existing` the previous filters are discarded first; otherwise
    /// fields not named in the batch are kept. Nothing is applied unless every
    /// entry is valid.
    pub fn apply_filters<I>(&mut self, entries: I, reset_existing: bool) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = FilterEntry>,
    {
        let mut batch = FilterSnapshot::new();
        for entry in entries {
            let path = KeyPath::parse(&entry.field);
            self.ensure_filterable(&path)?;
            let value = operators::prepare(entry.operator, entry.value, &self.config)?;
            batch.insert(path.dotted(), OperatorMap::from([(entry.operator, value)]));
        }

        if reset_existing {
            self.filters.clear();
        }
        debug!(fields = batch.len(), reset_existing, "Filters applied");
        self.filters.extend(batch);
        Ok(self)
    }

    /// Replace all filters with a flat snapshot, validating every condition
    pub fn set_filters(&mut self, snapshot: FilterSnapshot) -> QueryResult<&mut Self> {
        let mut staged = FilterSnapshot::new();
        for (field, conditions) in snapshot {
            let path = KeyPath::parse(&field);
            self.ensure_filterable(&path)?;
            let mut prepared = OperatorMap::new();
            for (operator, value) in conditions {
                prepared.insert(operator, operators::prepare(operator, value, &self.config)?);
            }
            if !prepared.is_empty() {
                staged.insert(path.dotted(), prepared);
            }
        }

        debug!(fields = staged.len(), "Filters replaced");
        self.filters = staged;
        Ok(self)
    }

    pub fn reset(&mut self) -> &mut Self {
        self.filters.clear();
        self
    }

    /// Current filters (flat view)
    pub fn filters(&self) -> &FilterSnapshot {
        &self.filters
    }

    /// Copy of the current filters (flat view)
    pub fn snapshot(&self) -> FilterSnapshot {
        self.filters.clone()
    }

    /// Nested view: `company.name` becomes `{"company": {"name": {...}}}`
    pub fn nested(&self) -> Value {
        nesting::to_nested(&self.filters)
    }

    /// Operators set on a field
    pub fn get(&self, field: impl Into<KeyPath>) -> Option<&OperatorMap> {
        self.filters.get(&field.into().dotted())
    }

    pub fn contains(&self, field: impl Into<KeyPath>) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of filtered fields
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check whether `field` may be filtered on
    pub fn is_filterable(&self, field: &KeyPath) -> bool {
        self.filterable.allows(field)
    }

    /// Filter handling settings in effect
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Swap the filterable table, keeping the current filters
    pub fn rebind(&mut self, filterable: Arc<CapabilityTable>) -> &mut Self {
        self.filterable = filterable;
        self
    }

    fn ensure_filterable(&self, path: &KeyPath) -> QueryResult<()> {
        if self.filterable.allows(path) {
            Ok(())
        } else {
            debug!(field = %path, "Rejected filter on non-filterable key");
            Err(QueryError::not_filterable(path.dotted()))
        }
    }
}
