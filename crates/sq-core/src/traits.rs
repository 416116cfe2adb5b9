//! Core traits
//!
//! The query builder never inspects a schema library directly. Anything that
//! can list its fields, say which of them are sortable or filterable, and
//! describe nested object fields the same way can back a builder.

use serde::{Deserialize, Serialize};

/// Capability a schema field may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Sortable,
    Filterable,
}

/// A declared schema field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Field name (a single path segment)
    pub name: String,
    /// Field may be used as a sort key
    #[serde(default)]
    pub sortable: bool,
    /// Field may be used in filters
    #[serde(default)]
    pub filterable: bool,
    /// Fields of a nested object
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDeclaration>,
}

impl FieldDeclaration {
    /// Create a plain field with no capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a nested object field
    pub fn object(name: impl Into<String>, children: Vec<FieldDeclaration>) -> Self {
        Self {
            name: name.into(),
            children,
            ..Default::default()
        }
    }

    /// Mark the field sortable
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the field filterable
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Mark the field both sortable and filterable
    pub fn queryable(self) -> Self {
        self.sortable().filterable()
    }

    /// Add a nested child field
    pub fn with_child(mut self, child: FieldDeclaration) -> Self {
        self.children.push(child);
        self
    }

    /// Check whether the field declares a capability
    pub fn declares(&self, capability: Capability) -> bool {
        match capability {
            Capability::Sortable => self.sortable,
            Capability::Filterable => self.filterable,
        }
    }

    /// Check if this is a nested object field
    pub fn is_object(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Capability oracle for a record schema
pub trait Schema {
    /// Top-level field declarations, nested objects carrying their children
    fn fields(&self) -> Vec<FieldDeclaration>;
}

impl<S: Schema + ?Sized> Schema for &S {
    fn fields(&self) -> Vec<FieldDeclaration> {
        (**self).fields()
    }
}

impl Schema for [FieldDeclaration] {
    fn fields(&self) -> Vec<FieldDeclaration> {
        self.to_vec()
    }
}

impl Schema for Vec<FieldDeclaration> {
    fn fields(&self) -> Vec<FieldDeclaration> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_declaration_builder() {
        let field = FieldDeclaration::new("id").queryable();
        assert!(field.declares(Capability::Sortable));
        assert!(field.declares(Capability::Filterable));
        assert!(!field.is_object());

        let plain = FieldDeclaration::new("email").filterable();
        assert!(!plain.declares(Capability::Sortable));
        assert!(plain.declares(Capability::Filterable));
    }

    #[test]
    fn test_object_field() {
        let company = FieldDeclaration::object(
            "company",
            vec![FieldDeclaration::new("name").filterable()],
        )
        .with_child(FieldDeclaration::new("id"));

        assert!(company.is_object());
        assert_eq!(company.children.len(), 2);
        assert!(!company.declares(Capability::Filterable));
    }

    #[test]
    fn test_vec_is_a_schema() {
        let fields = vec![FieldDeclaration::new("id").sortable()];
        assert_eq!(fields.fields().len(), 1);
        assert_eq!((&fields).fields()[0].name, "id");
    }
}
