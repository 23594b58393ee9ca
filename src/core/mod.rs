//! Typed entry point over one [`Persistent`](crate::schema::Persistent) entity

pub mod repository;

pub use repository::Repository;
