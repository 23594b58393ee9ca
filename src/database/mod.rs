//! Dialect adapter between assembled statements and Sea-ORM connections

pub mod binding;
pub mod executor;

pub use binding::to_statement;
pub use executor::QueryExecutor;
