use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, QueryResult};

use super::binding::to_statement;
use crate::{filtering::ParameterMap, query::COUNT_ALIAS};

/// Runs statements produced by the query assembler.
///
/// Statements carry `:name` placeholders; implementations bind them from the
/// [`ParameterMap`] in their own dialect.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a count statement and return its single value
    async fn execute_count(&self, sql: &str, params: &ParameterMap) -> Result<u64, DbErr>;

    /// Run a result statement, limited to `max_rows` rows starting at `offset` when
    /// `max_rows` is set
    async fn execute_query(
        &self,
        sql: &str,
        params: &ParameterMap,
        max_rows: Option<u64>,
        offset: u64,
    ) -> Result<Vec<QueryResult>, DbErr>;

    /// Run a data-modifying statement and return the number of affected rows
    async fn execute_update(&self, sql: &str, params: &ParameterMap) -> Result<u64, DbErr>;
}

#[async_trait]
impl<C> QueryExecutor for C
where
    C: ConnectionTrait + Send + Sync,
{
    async fn execute_count(&self, sql: &str, params: &ParameterMap) -> Result<u64, DbErr> {
        let stmt = to_statement(self.get_database_backend(), sql, params)?;
        let row = self
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("count query returned no row".to_string()))?;

        let count: i64 = row.try_get("", COUNT_ALIAS)?;
        u64::try_from(count).map_err(|_| DbErr::Type(format!("negative row count {count}")))
    }

    async fn execute_query(
        &self,
        sql: &str,
        params: &ParameterMap,
        max_rows: Option<u64>,
        offset: u64,
    ) -> Result<Vec<QueryResult>, DbErr> {
        let sql = match max_rows {
            Some(limit) => format!("{sql} LIMIT {limit} OFFSET {offset}"),
            None => sql.to_string(),
        };
        let stmt = to_statement(self.get_database_backend(), &sql, params)?;
        self.query_all(stmt).await
    }

    async fn execute_update(&self, sql: &str, params: &ParameterMap) -> Result<u64, DbErr> {
        let stmt = to_statement(self.get_database_backend(), sql, params)?;
        Ok(self.execute(stmt).await?.rows_affected())
    }
}
