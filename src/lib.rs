//! # querycrate
//!
//! Turns client-supplied filter trees, sort lists and page requests into parameterized
//! SQL over a table (or subselect) and runs it as a paginated count + result pair
//! through Sea-ORM.
//!
//! ```rust,ignore
//! use querycrate::{PageRequest, Repository};
//!
//! let request: PageRequest = serde_json::from_str(r#"{
//!     "page": 0,
//!     "size": 10,
//!     "filter": {"field": "status", "operator": "eq", "value": "ACTIVE"},
//!     "sort": [{"field": "createdAt", "dir": "desc"}]
//! }"#)?;
//!
//! let page = Repository::<Order>::new().get_rows(&db, &request).await?;
//! println!("{} of {}", page.rows.len(), page.total);
//! ```
//!
//! Values never appear in the generated SQL: every operand is bound through a
//! [`ParameterMap`] and rewritten to the backend's placeholder style right before
//! execution. Malformed requests are rejected with a [`QueryError`] before any statement
//! runs.

pub mod config;
pub mod core;
pub mod database;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod pagination;
pub mod query;
pub mod schema;

pub use config::QueryConfig;
pub use crate::core::Repository;
pub use database::QueryExecutor;
pub use errors::QueryError;
pub use filtering::{FilterCompiler, Fragment, ParameterMap};
pub use models::{
    FilterNode, Group, Logic, Operator, PageRequest, PageResponse, Predicate, SortDescriptor,
    SortDirection,
};
pub use pagination::fetch_page;
pub use query::{AssembledQuery, QueryParts, assemble};
pub use schema::{ColumnDef, EntitySchema, Persistent, register, schema_for};
