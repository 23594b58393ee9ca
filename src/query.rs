use crate::{
    config::QueryConfig,
    errors::QueryError,
    filtering::{FilterCompiler, ParameterMap, order_by_clause},
    models::{FilterNode, SortDescriptor},
    schema::EntitySchema,
};

/// Column alias of the row count produced by [`AssembledQuery::count_sql`]
pub const COUNT_ALIAS: &str = "cnt";

/// Count and result statements sharing one parameter map
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledQuery {
    pub count_sql: String,
    pub result_sql: String,
    pub params: ParameterMap,
}

/// Inputs of [`assemble`] besides the schema and config
#[derive(Debug, Clone, Copy)]
pub struct QueryParts<'a> {
    /// Table name or parenthesized subselect placed after `FROM`
    pub base: &'a str,
    pub filter: Option<&'a FilterNode>,
    pub sort: &'a [SortDescriptor],
}

/// Build the count and result statements for one page request.
///
/// `base_params` are the named parameters the base expression itself references
/// (e.g. a subselect); they are bound next to the filter's parameters.
///
/// # Errors
///
/// Every compile error of the filter and sort list, plus
/// [`QueryError::ParameterConflict`] when a base parameter reuses a filter
/// parameter name. Nothing is executed.
pub fn assemble(
    schema: &EntitySchema,
    config: &QueryConfig,
    parts: QueryParts<'_>,
    base_params: ParameterMap,
) -> Result<AssembledQuery, QueryError> {
    let mut params = ParameterMap::new();
    let mut where_sql = String::new();

    if let Some(filter) = parts.filter {
        let fragment = FilterCompiler::new(schema, config).compile_root(filter)?;
        if !fragment.is_empty() {
            where_sql = format!(" WHERE 1=1 AND ({})", fragment.sql);
        }
        params = fragment.params;
    }

    params.merge(base_params)?;

    let order_sql = order_by_clause(schema, parts.sort)?;
    let base = parts.base;

    let query = AssembledQuery {
        count_sql: format!("SELECT count(*) AS {COUNT_ALIAS} FROM {base}{where_sql}"),
        result_sql: format!("SELECT * FROM {base}{where_sql}{order_sql}"),
        params,
    };

    tracing::debug!(
        entity = schema.name(),
        sql = %query.result_sql,
        params = query.params.len(),
        "Assembled page query"
    );

    Ok(query)
}
