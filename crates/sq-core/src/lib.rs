//! # sq-core
//!
//! Core types, traits, and utilities for Smart Query RS.
//!
//! This crate provides the foundational building blocks used by the query builder:
//! - Common error types
//! - Result type aliases
//! - Key paths, sort orders, and filter operators
//! - The schema capability contract (`Schema`) and a concrete `ObjectSchema`
//! - Pagination state
//! - Configuration types

pub mod error;
pub mod result;
pub mod types;
pub mod traits;
pub mod schema;
pub mod pagination;
pub mod config;

pub use error::*;
pub use result::*;
pub use types::*;
pub use traits::*;
pub use schema::*;
pub use pagination::*;
