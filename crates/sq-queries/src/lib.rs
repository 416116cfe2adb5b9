//! # sq-queries
//!
//! Query-state builder for Smart Query RS.
//!
//! This crate keeps pagination, search, sort and filter state for list
//! queries against a remote data API. Sort and filter mutations are checked
//! against capability tables resolved from a schema.
//!
//! ## Structure
//!
//! - `capabilities` - Sortable/filterable key paths resolved from a schema
//! - `search` - Free-text search term
//! - `sorts` - Single-key sort state
//! - `operators` - Value shapes accepted by each filter operator
//! - `filters` - Filter values and filter state
//! - `nesting` - Flat and nested filter views
//! - `query` - The assembled query descriptor
//! - `params` - URL query parameters
//! - `builder` - The query builder tying the states together
//!
//! ## Example
//!
//! ```
//! use sq_core::{FieldDeclaration, ObjectSchema, Operator, Order};
//! use sq_queries::QueryBuilder;
//!
//! let schema = ObjectSchema::new()
//!     .field(FieldDeclaration::new("id").queryable())
//!     .field(FieldDeclaration::new("status").filterable());
//!
//! let mut builder = QueryBuilder::new(&schema);
//! builder
//!     .set_pagination(4, 25)
//!     .add_sort("id", Order::Desc)?
//!     .add_filter("status", Operator::Eq, "active")?;
//!
//! assert_eq!(builder.build().offset, 75);
//! assert!(builder.add_sort("status", Order::Asc).is_err());
//! # Ok::<(), sq_core::QueryError>(())
//! ```

pub mod capabilities;
pub mod search;
pub mod sorts;
pub mod operators;
pub mod filters;
pub mod nesting;
pub mod query;
pub mod params;
pub mod builder;

// Re-exports for convenience
pub use capabilities::{Capabilities, CapabilityTable};
pub use search::SearchState;
pub use sorts::{SortCriterion, SortState};
pub use operators::ValueShape;
pub use filters::{FilterEntry, FilterSnapshot, FilterState, FilterValue, OperatorMap};
pub use query::QueryDescriptor;
pub use params::QueryParams;
pub use builder::{BuilderOptions, QueryBuilder};
