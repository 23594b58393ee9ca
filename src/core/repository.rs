use serde_json::Value;
use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    config::QueryConfig,
    database::QueryExecutor,
    errors::QueryError,
    filtering::{FilterCompiler, Fragment, ParameterMap},
    models::{FilterNode, PageRequest, PageResponse},
    pagination::{PageBounds, fetch_page},
    query::{AssembledQuery, QueryParts, assemble},
    schema::{EntitySchema, Persistent, schema_for},
};

/// Paginated reads and key-based lookups and deletes for `E`.
///
/// The schema is fetched from the process-wide registry once, so a repository is cheap
/// to clone and to share between requests.
pub struct Repository<E: Persistent> {
    schema: Arc<EntitySchema>,
    config: QueryConfig,
    entity: PhantomData<fn() -> E>,
}

impl<E: Persistent> Repository<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: schema_for::<E>(),
            config: QueryConfig::default(),
            entity: PhantomData,
        }
    }

    /// # Errors
    ///
    /// Returns [`QueryError::InvalidConfig`] when `config` does not validate.
    pub fn with_config(config: QueryConfig) -> Result<Self, QueryError> {
        config.validate()?;
        Ok(Self {
            schema: schema_for::<E>(),
            config,
            entity: PhantomData,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &str {
        self.schema.table()
    }

    #[must_use]
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.schema.column(field)
    }

    /// Compile a filter tree on its own, e.g. to embed it in a hand-written statement.
    ///
    /// # Errors
    ///
    /// Any compile error of the tree.
    pub fn build_sql_conditions(&self, filter: &FilterNode) -> Result<Fragment, QueryError> {
        FilterCompiler::new(&self.schema, &self.config).compile_root(filter)
    }

    /// Assemble the count and result statements of `request` over `from`.
    ///
    /// # Errors
    ///
    /// Any compile error of the filter or sort list, or a base parameter conflict.
    pub fn prepare(
        &self,
        request: &PageRequest,
        from: &str,
        base_params: ParameterMap,
    ) -> Result<AssembledQuery, QueryError> {
        let parts = QueryParts {
            base: from,
            filter: request.filter.as_ref(),
            sort: &request.sort,
        };
        assemble(&self.schema, &self.config, parts, base_params)
    }

    /// One page of `E` rows from the entity table.
    ///
    /// # Errors
    ///
    /// Compile errors before any statement runs, then execution errors.
    pub async fn get_rows<X>(
        &self,
        executor: &X,
        request: &PageRequest,
    ) -> Result<PageResponse<E>, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        self.get_rows_from(executor, request, self.schema.table(), ParameterMap::new())
            .await
    }

    /// One page of `E` rows read from `from`, a table name or a parenthesized subselect
    /// with an alias. `base_params` binds the named parameters `from` references.
    ///
    /// # Errors
    ///
    /// Compile errors before any statement runs, then execution errors.
    pub async fn get_rows_from<X>(
        &self,
        executor: &X,
        request: &PageRequest,
        from: &str,
        base_params: ParameterMap,
    ) -> Result<PageResponse<E>, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        let query = self.prepare(request, from, base_params)?;
        fetch_page(executor, &query, PageBounds::new(request.page, request.size)).await
    }

    /// # Errors
    ///
    /// [`QueryError::Mapping`] when the entity has no key column, else execution errors.
    pub async fn find_by_key<X>(
        &self,
        executor: &X,
        key: impl Into<Value> + Send,
    ) -> Result<Option<E>, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = :id",
            self.schema.table(),
            self.key_column()?
        );
        let params: ParameterMap = [("id", key.into())].into_iter().collect();

        let rows = executor
            .execute_query(&sql, &params, Some(1), 0)
            .await
            .map_err(|err| QueryError::execution("key lookup failed", err))?;

        rows.first()
            .map(|row| E::from_query_result(row, ""))
            .transpose()
            .map_err(|err| QueryError::execution("row decoding failed", err))
    }

    /// Delete the row with `key`, returning the number of rows removed
    ///
    /// # Errors
    ///
    /// [`QueryError::Mapping`] when the entity has no key column, else execution errors.
    pub async fn delete_by_key<X>(
        &self,
        executor: &X,
        key: impl Into<Value> + Send,
    ) -> Result<u64, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        let sql = format!(
            "DELETE FROM {} WHERE {} = :id",
            self.schema.table(),
            self.key_column()?
        );
        let params: ParameterMap = [("id", key.into())].into_iter().collect();
        self.execute_delete(executor, &sql, &params).await
    }

    /// Delete every row whose key is in `keys`. An empty list deletes nothing and runs
    /// no statement.
    ///
    /// # Errors
    ///
    /// [`QueryError::Mapping`] when the entity has no key column, else execution errors.
    pub async fn delete_by_keys<X>(&self, executor: &X, keys: Vec<Value>) -> Result<u64, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        let sql = format!(
            "DELETE FROM {} WHERE {} IN (:ids)",
            self.schema.table(),
            self.key_column()?
        );
        if keys.is_empty() {
            return Ok(0);
        }
        let params: ParameterMap = [("ids", Value::Array(keys))].into_iter().collect();
        self.execute_delete(executor, &sql, &params).await
    }

    async fn execute_delete<X>(
        &self,
        executor: &X,
        sql: &str,
        params: &ParameterMap,
    ) -> Result<u64, QueryError>
    where
        X: QueryExecutor + ?Sized,
    {
        let removed = executor
            .execute_update(sql, params)
            .await
            .map_err(|err| QueryError::execution("delete failed", err))?;
        tracing::debug!(entity = self.schema.name(), removed, "Deleted rows");
        Ok(removed)
    }

    fn key_column(&self) -> Result<&str, QueryError> {
        self.schema
            .key_column()
            .ok_or_else(|| QueryError::mapping(self.schema.name(), "id"))
    }
}

impl<E: Persistent> Default for Repository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Persistent> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            config: self.config.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: Persistent> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &self.schema.name())
            .field("table", &self.schema.table())
            .field("config", &self.config)
            .finish()
    }
}
