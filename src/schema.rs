//! # Entity Schemas
//!
//! An [`EntitySchema`] maps the abstract field names clients filter and sort by to the
//! physical columns of one table, and lists the columns searched by the `keyword`
//! pseudo-field. It is built once per entity type and shared read-only afterwards.
//!
//! Entity types describe themselves through [`Persistent`]:
//!
//! ```rust,ignore
//! #[derive(FromQueryResult)]
//! pub struct Order {
//!     pub id: i64,
//!     pub status: String,
//!     pub created_at: String,
//! }
//!
//! impl Persistent for Order {
//!     const TABLE_NAME: &'static str = "ORDERS";
//!     const CATALOG: Option<&'static str> = Some("SALES");
//!
//!     fn columns() -> Vec<ColumnDef> {
//!         vec![
//!             ColumnDef::new("id").key(),
//!             ColumnDef::new("status").column("STATUS_CD"),
//!             ColumnDef::new("createdAt").column("CREATE_TIME"),
//!             ColumnDef::new("title").column("TITLE").keyword(),
//!         ]
//!     }
//! }
//!
//! let schema = schema_for::<Order>();
//! assert_eq!(schema.table(), "SALES.ORDERS");
//! ```

use sea_orm::FromQueryResult;
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use crate::errors::QueryError;

/// One persisted field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub field: &'static str,
    /// Physical column; the field name is used when absent
    pub column: Option<&'static str>,
    /// Searched by the `keyword` pseudo-field
    pub keyword: bool,
    /// Primary key column used by key lookups and deletes
    pub key: bool,
}

impl ColumnDef {
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            column: None,
            keyword: false,
            key: false,
        }
    }

    #[must_use]
    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub const fn keyword(mut self) -> Self {
        self.keyword = true;
        self
    }

    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub fn column_name(&self) -> &'static str {
        match self.column {
            Some(column) if !column.trim().is_empty() => column,
            _ => self.field,
        }
    }
}

/// Static description of a table-backed entity type
pub trait Persistent: FromQueryResult + Send + Sync + 'static {
    const TABLE_NAME: &'static str;
    const CATALOG: Option<&'static str> = None;

    fn columns() -> Vec<ColumnDef>;

    /// Name used in error messages and logs
    #[must_use]
    fn entity_name() -> &'static str {
        Self::TABLE_NAME
    }
}

/// Field-to-column mapping of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    name: String,
    table: String,
    columns: HashMap<String, String>,
    keyword_columns: Vec<String>,
    key_column: Option<String>,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name: name.into(),
                table: table.into(),
                columns: HashMap::new(),
                keyword_columns: Vec::new(),
                key_column: None,
            },
        }
    }

    /// Build the schema of a [`Persistent`] type. Prefer [`schema_for`], which caches it.
    #[must_use]
    pub fn of<E: Persistent>() -> Self {
        let table = match E::CATALOG {
            Some(catalog) if !catalog.trim().is_empty() => {
                format!("{catalog}.{}", E::TABLE_NAME)
            }
            _ => E::TABLE_NAME.to_string(),
        };

        E::columns()
            .into_iter()
            .fold(Self::builder(E::entity_name(), table), SchemaBuilder::column_def)
            .build()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table expression used in `FROM`, `catalog.table` when a catalog is set
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Physical column mapped for `field`, if any
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns [`QueryError::Mapping`] when the field has no column.
    pub fn resolve(&self, field: &str) -> Result<&str, QueryError> {
        self.column(field)
            .ok_or_else(|| QueryError::mapping(&self.name, field))
    }

    /// Keyword-search columns in declaration order
    #[must_use]
    pub fn keyword_columns(&self) -> &[String] {
        &self.keyword_columns
    }

    /// The flagged key column, else the column mapped for `id`
    #[must_use]
    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref().or_else(|| self.column("id"))
    }
}

pub struct SchemaBuilder {
    schema: EntitySchema,
}

impl SchemaBuilder {
    #[must_use]
    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.schema.columns.insert(field.into(), column.into());
        self
    }

    /// Map a field and add its column to the keyword-search set
    #[must_use]
    pub fn keyword_column(self, field: impl Into<String>, column: impl Into<String>) -> Self {
        let column = column.into();
        let mut builder = self.column(field, column.clone());
        if !builder.schema.keyword_columns.contains(&column) {
            builder.schema.keyword_columns.push(column);
        }
        builder
    }

    #[must_use]
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.schema.key_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn column_def(self, def: ColumnDef) -> Self {
        let column = def.column_name();
        let builder = if def.keyword {
            self.keyword_column(def.field, column)
        } else {
            self.column(def.field, column)
        };
        if def.key {
            builder.key_column(column)
        } else {
            builder
        }
    }

    #[must_use]
    pub fn build(self) -> EntitySchema {
        self.schema
    }
}

type Registry = RwLock<HashMap<TypeId, Arc<EntitySchema>>>;

static SCHEMAS: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    SCHEMAS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide schema of `E`, built on first use and shared afterwards
#[must_use]
pub fn schema_for<E: Persistent>() -> Arc<EntitySchema> {
    let type_id = TypeId::of::<E>();

    if let Some(schema) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
    {
        return Arc::clone(schema);
    }

    // built before locking so `E::columns()` may itself look up other schemas
    let schema = EntitySchema::of::<E>();

    let mut schemas = registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(schemas.entry(type_id).or_insert_with(|| {
        tracing::debug!(
            entity = schema.name(),
            table = schema.table(),
            columns = schema.columns.len(),
            keyword_columns = schema.keyword_columns.len(),
            "Registered entity schema"
        );
        Arc::new(schema)
    }))
}

/// Eagerly build and cache the schema of `E`, typically at startup
pub fn register<E: Persistent>() {
    let _ = schema_for::<E>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, QueryResult};

    struct Order;

    impl FromQueryResult for Order {
        fn from_query_result(_res: &QueryResult, _pre: &str) -> Result<Self, DbErr> {
            Ok(Self)
        }
    }

    impl Persistent for Order {
        const TABLE_NAME: &'static str = "ORDERS";
        const CATALOG: Option<&'static str> = Some("SALES");

        fn columns() -> Vec<ColumnDef> {
            vec![
                ColumnDef::new("id").key(),
                ColumnDef::new("status").column("STATUS_CD"),
                ColumnDef::new("createdAt").column("CREATE_TIME"),
                ColumnDef::new("name").column("NAME").keyword(),
                ColumnDef::new("description").column(" ").keyword(),
            ]
        }
    }

    #[test]
    fn test_schema_of_persistent_type() {
        let schema = EntitySchema::of::<Order>();
        assert_eq!(schema.name(), "ORDERS");
        assert_eq!(schema.table(), "SALES.ORDERS");
        assert_eq!(schema.column("status"), Some("STATUS_CD"));
        assert_eq!(schema.column("id"), Some("id"));
        // blank column names fall back to the field name
        assert_eq!(schema.column("description"), Some("description"));
        assert_eq!(schema.keyword_columns(), ["NAME", "description"]);
        assert_eq!(schema.key_column(), Some("id"));
    }

    #[test]
    fn test_resolve_unknown_field() {
        let schema = EntitySchema::of::<Order>();
        let err = schema.resolve("doesNotExist").unwrap_err();
        assert!(matches!(
            err,
            QueryError::Mapping { ref field, .. } if field == "doesNotExist"
        ));
    }

    #[test]
    fn test_keyword_columns_are_deduplicated_in_order() {
        let schema = EntitySchema::builder("doc", "DOCS")
            .keyword_column("title", "TITLE")
            .keyword_column("body", "BODY")
            .keyword_column("heading", "TITLE")
            .build();
        assert_eq!(schema.keyword_columns(), ["TITLE", "BODY"]);
        assert_eq!(schema.column("heading"), Some("TITLE"));
    }

    #[test]
    fn test_key_column_falls_back_to_id_field() {
        let schema = EntitySchema::builder("doc", "DOCS")
            .column("id", "DOC_ID")
            .build();
        assert_eq!(schema.key_column(), Some("DOC_ID"));

        let schema = EntitySchema::builder("doc", "DOCS").build();
        assert_eq!(schema.key_column(), None);
    }

    struct OrderLine;

    impl FromQueryResult for OrderLine {
        fn from_query_result(_res: &QueryResult, _pre: &str) -> Result<Self, DbErr> {
            Ok(Self)
        }
    }

    impl Persistent for OrderLine {
        const TABLE_NAME: &'static str = "ORDER_LINES";

        fn columns() -> Vec<ColumnDef> {
            // reuses the parent's key column name, looked up through the registry
            let parent_key = schema_for::<Order>().key_column() == Some("id");
            vec![
                ColumnDef::new("id").key(),
                ColumnDef::new("orderId").column(if parent_key { "ORDER_ID" } else { "PARENT" }),
            ]
        }
    }

    #[test]
    fn test_columns_may_look_up_other_schemas() {
        let schema = schema_for::<OrderLine>();
        assert_eq!(schema.column("orderId"), Some("ORDER_ID"));
        assert!(Arc::ptr_eq(&schema, &schema_for::<OrderLine>()));
    }

    #[test]
    fn test_schema_for_is_shared() {
        register::<Order>();
        let first = schema_for::<Order>();
        let second = schema_for::<Order>();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
