use sea_orm::FromQueryResult;

use crate::{
    database::QueryExecutor,
    errors::QueryError,
    models::PageResponse,
    query::AssembledQuery,
};

/// Largest LIMIT/OFFSET literal the supported backends accept (signed 64-bit)
const MAX_SQL_ROWS: u64 = i64::MAX.unsigned_abs();

/// Page bounds of a request: 0-based `page`, `size` rows per page (0 = all rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub page: u64,
    pub size: u64,
}

impl PageBounds {
    #[must_use]
    pub const fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// `(max_rows, offset)` passed to the executor; unbounded when `size` is 0.
    /// Both are capped at `i64::MAX`, so an oversized page reads past the end instead of
    /// producing a literal the database rejects.
    #[must_use]
    pub const fn limit_offset(&self) -> (Option<u64>, u64) {
        if self.size == 0 {
            return (None, 0);
        }
        let limit = if self.size > MAX_SQL_ROWS {
            MAX_SQL_ROWS
        } else {
            self.size
        };
        let offset = self.size.saturating_mul(self.page);
        let offset = if offset > MAX_SQL_ROWS {
            MAX_SQL_ROWS
        } else {
            offset
        };
        (Some(limit), offset)
    }
}

/// Run an assembled query and return one page of typed rows.
///
/// The count statement always runs first. The result statement only runs when the
/// count is positive, and is cut to the requested page when `size > 0`; a page past the
/// end yields no rows but still reports the full total.
///
/// # Errors
///
/// Any data-store failure is returned as [`QueryError::Execution`]; no partial page is
/// returned.
pub async fn fetch_page<M, X>(
    executor: &X,
    query: &AssembledQuery,
    bounds: PageBounds,
) -> Result<PageResponse<M>, QueryError>
where
    M: FromQueryResult,
    X: QueryExecutor + ?Sized,
{
    let total = executor
        .execute_count(&query.count_sql, &query.params)
        .await
        .map_err(|err| QueryError::execution("count query failed", err))?;

    if total == 0 {
        tracing::trace!("No matching rows, result query skipped");
        return Ok(PageResponse::empty());
    }

    let (max_rows, offset) = bounds.limit_offset();
    let rows = executor
        .execute_query(&query.result_sql, &query.params, max_rows, offset)
        .await
        .map_err(|err| QueryError::execution("result query failed", err))?;

    let rows = rows
        .iter()
        .map(|row| M::from_query_result(row, ""))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| QueryError::execution("row decoding failed", err))?;

    tracing::trace!(total, rows = rows.len(), "Fetched page");

    Ok(PageResponse::new(total, rows))
}
