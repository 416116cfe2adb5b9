//! Conversion between the flat and nested filter forms
//!
//! Flat: `{"company.name": {"like": "%a%"}}`
//! Nested: `{"company": {"name": {"like": "%a%"}}}`
//!
//! In the nested form an object key that names an operator holds a value;
//! any other key is one more path segment. An operator-named key whose value
//! is an object is read as a segment unless the operator takes an object
//! (`or`, `and`), so a field named `or` or `and` below the top level cannot
//! be read back.

use serde_json::{Map, Value};
use sq_core::{KeyPath, Operator, QueryError, QueryResult};

use crate::filters::{FilterSnapshot, FilterValue, OperatorMap};
use crate::operators::ValueShape;

/// Build the nested form of a flat snapshot
///
/// Sibling paths that share a prefix are merged into one object.
pub fn to_nested(snapshot: &FilterSnapshot) -> Value {
    let mut root = Map::new();
    for (field, operators) in snapshot {
        let mut current = &mut root;
        for segment in field.split('.') {
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
        for (operator, value) in operators {
            current.insert(operator.as_str().to_string(), value.to_json());
        }
    }
    Value::Object(root)
}

/// Read a nested filter object back into its flat form
pub fn from_nested(value: &Value) -> QueryResult<FilterSnapshot> {
    let Value::Object(map) = value else {
        return Err(QueryError::invalid_param("filter", "expected a JSON object"));
    };
    let mut snapshot = FilterSnapshot::new();
    collect(map, &KeyPath::new(Vec::<String>::new()), &mut snapshot)?;
    Ok(snapshot)
}

fn collect(
    map: &Map<String, Value>,
    path: &KeyPath,
    snapshot: &mut FilterSnapshot,
) -> QueryResult<()> {
    let mut operators = OperatorMap::new();

    for (key, value) in map {
        let operator = if path.segments().is_empty() {
            None
        } else {
            Operator::from_str(key).filter(|op| {
                !value.is_object() || ValueShape::of(*op) == ValueShape::Logical
            })
        };

        match (operator, value) {
            (Some(operator), value) => {
                let value = FilterValue::from_json(value.clone()).ok_or_else(|| {
                    let message = format!("unsupported value for {path}.{key}");
                    QueryError::invalid_param("filter", message)
                })?;
                operators.insert(operator, value);
            }
            (None, Value::Object(child)) => collect(child, &path.child(key.as_str()), snapshot)?,
            (None, _) => {
                return Err(QueryError::invalid_param(
                    "filter",
                    format!("\"{key}\" is neither an operator nor a nested object"),
                ));
            }
        }
    }

    if !operators.is_empty() {
        snapshot.insert(path.dotted(), operators);
    }
    Ok(())
}
