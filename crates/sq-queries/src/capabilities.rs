//! Schema capabilities
//!
//! Flattens a schema's sortable and filterable declarations into lookup
//! tables keyed by dot-joined path. Nested object fields are always walked,
//! whether or not the object field itself declares the capability.

use serde_json::{Map, Value};
use sq_core::{Capability, FieldDeclaration, KeyPath, Schema};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Set of key paths that carry one capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityTable {
    paths: BTreeSet<String>,
}

impl CapabilityTable {
    /// Create an empty table (nothing is capable)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from dot-joined paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether the field at `path` carries the capability
    pub fn allows(&self, path: &KeyPath) -> bool {
        !path.is_empty() && self.paths.contains(&path.dotted())
    }

    /// Check a dot-joined path
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// All capable paths in lexical order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Nested view: `company.name` becomes `{"company": {"name": true}}`
    ///
    /// When both a path and one of its descendants are capable the nested
    /// object replaces the `true` marker of the parent. The parent stays
    /// capable for [`allows`](Self::allows) and is still listed by
    /// [`paths`](Self::paths), which is the complete view.
    pub fn to_nested(&self) -> Value {
        let mut root = Map::new();
        for path in &self.paths {
            let segments: Vec<&str> = path.split('.').collect();
            let Some((leaf, parents)) = segments.split_last() else {
                continue;
            };
            let mut current = &mut root;
            for segment in parents {
                let slot = current
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                current = match slot {
                    Value::Object(map) => map,
                    _ => unreachable!("slot was just made an object"),
                };
            }
            current
                .entry(leaf.to_string())
                .or_insert(Value::Bool(true));
        }
        Value::Object(root)
    }

    fn collect(
        &mut self,
        fields: &[FieldDeclaration],
        prefix: Option<&KeyPath>,
        capability: Capability,
    ) {
        for field in fields {
            let path = match prefix {
                Some(parent) => parent.child(field.name.as_str()),
                None => KeyPath::new([field.name.as_str()]),
            };
            if field.declares(capability) {
                self.paths.insert(path.dotted());
            }
            if field.is_object() {
                self.collect(&field.children, Some(&path), capability);
            }
        }
    }
}

/// Resolve the table of one capability from a schema
pub fn resolve<S: Schema + ?Sized>(schema: &S, capability: Capability) -> CapabilityTable {
    let mut table = CapabilityTable::new();
    table.collect(&schema.fields(), None, capability);
    table
}

/// Resolve the sortable key paths of a schema
pub fn resolve_sortable<S: Schema + ?Sized>(schema: &S) -> CapabilityTable {
    resolve(schema, Capability::Sortable)
}

/// Resolve the filterable key paths of a schema
pub fn resolve_filterable<S: Schema + ?Sized>(schema: &S) -> CapabilityTable {
    resolve(schema, Capability::Filterable)
}

/// Both capability tables of one schema, shared by the states of a builder
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub sortable: Arc<CapabilityTable>,
    pub filterable: Arc<CapabilityTable>,
}

impl Capabilities {
    /// Resolve both tables once
    pub fn resolve<S: Schema + ?Sized>(schema: &S) -> Self {
        let sortable = resolve_sortable(schema);
        let filterable = resolve_filterable(schema);
        debug!(
            sortable = sortable.len(),
            filterable = filterable.len(),
            "Schema capabilities resolved"
        );
        Self {
            sortable: Arc::new(sortable),
            filterable: Arc::new(filterable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sq_core::ObjectSchema;

    fn user_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field(FieldDeclaration::new("id").queryable())
            .field(FieldDeclaration::new("name").filterable())
            .field(FieldDeclaration::new("email").filterable())
            .object(
                "company",
                ObjectSchema::new()
                    .field(FieldDeclaration::new("id"))
                    .field(FieldDeclaration::new("name").queryable())
                    .object(
                        "address",
                        ObjectSchema::new().field(FieldDeclaration::new("city").sortable()),
                    ),
            )
    }

    #[test]
    fn test_resolve_sortable() {
        let table = resolve_sortable(&user_schema());
        let paths: Vec<&str> = table.paths().collect();
        assert_eq!(paths, vec!["company.address.city", "company.name", "id"]);
    }

    #[test]
    fn test_resolve_filterable() {
        let table = resolve_filterable(&user_schema());
        assert!(table.allows(&KeyPath::from("name")));
        assert!(table.allows(&KeyPath::from(["company", "name"])));
        assert!(!table.allows(&KeyPath::from("company.id")));
        assert!(!table.allows(&KeyPath::from("company")));
        assert!(!table.allows(&KeyPath::from("company.address.city")));
    }

    #[test]
    fn test_unknown_paths_are_not_capable() {
        let table = resolve_sortable(&user_schema());
        assert!(!table.allows(&KeyPath::from("company.invalid.field")));
        assert!(!table.allows(&KeyPath::from("")));
    }

    #[test]
    fn test_empty_schema_yields_empty_table() {
        let table = resolve_sortable(&ObjectSchema::new());
        assert!(table.is_empty());
        assert!(!table.allows(&KeyPath::from("id")));
    }

    #[test]
    fn test_capable_object_field() {
        let schema = ObjectSchema::new().field(
            FieldDeclaration::object("meta", vec![FieldDeclaration::new("tag").filterable()])
                .filterable(),
        );
        let table = resolve_filterable(&schema);
        assert!(table.contains("meta"));
        assert!(table.contains("meta.tag"));
    }

    #[test]
    fn test_nested_view() {
        let table = resolve_sortable(&user_schema());
        assert_eq!(
            table.to_nested(),
            json!({
                "id": true,
                "company": {
                    "name": true,
                    "address": {"city": true}
                }
            })
        );
    }

    #[test]
    fn test_nested_view_prefers_object_over_marker() {
        let table = CapabilityTable::from_paths(["meta", "meta.tag"]);
        assert_eq!(table.to_nested(), json!({"meta": {"tag": true}}));
        assert!(table.allows(&KeyPath::from("meta")));
        assert_eq!(table.paths().collect::<Vec<_>>(), vec!["meta", "meta.tag"]);
    }

    #[test]
    fn test_capabilities_resolve_both() {
        let caps = Capabilities::resolve(&user_schema());
        assert_eq!(caps.sortable.len(), 3);
        assert_eq!(caps.filterable.len(), 4);
    }
}
