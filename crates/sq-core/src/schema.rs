//! Object schema
//!
//! A plain, serializable [`Schema`] implementation. Schemas from other
//! sources (derive macros, validation libraries, remote metadata) only need
//! to implement the trait.

use serde::{Deserialize, Serialize};

use crate::traits::{FieldDeclaration, Schema};

/// A record schema described as a list of field declarations
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub fields: Vec<FieldDeclaration>,
}

impl ObjectSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self { fields: vec![] }
    }

    /// Add a field (builder pattern)
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a nested object field (builder pattern)
    pub fn object(mut self, name: impl Into<String>, schema: ObjectSchema) -> Self {
        self.fields
            .push(FieldDeclaration::object(name, schema.fields));
        self
    }

    /// Parse a schema from JSON
    ///
    /// ```json
    /// {"fields": [{"name": "id", "sortable": true, "filterable": true}]}
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a top-level field
    pub fn get(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl Schema for ObjectSchema {
    fn fields(&self) -> Vec<FieldDeclaration> {
        self.fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let schema = ObjectSchema::new()
            .field(FieldDeclaration::new("id").queryable())
            .field(FieldDeclaration::new("email").filterable())
            .object(
                "company",
                ObjectSchema::new().field(FieldDeclaration::new("name").filterable()),
            );

        assert_eq!(schema.len(), 3);
        assert!(schema.get("company").unwrap().is_object());
        assert!(schema.get("missing").is_none());
    }

    #[test]
    fn test_schema_from_json() {
        let schema = ObjectSchema::from_json(
            r#"{
                "fields": [
                    {"name": "id", "sortable": true, "filterable": true},
                    {"name": "company", "children": [
                        {"name": "name", "filterable": true}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let id = schema.get("id").unwrap();
        assert!(id.sortable && id.filterable);
        let company = schema.get("company").unwrap();
        assert!(!company.sortable);
        assert_eq!(company.children[0].name, "name");
    }

    #[test]
    fn test_schema_from_invalid_json() {
        assert!(ObjectSchema::from_json("{\"fields\": 3}").is_err());
    }
}
