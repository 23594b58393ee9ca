use crate::{
    errors::QueryError,
    models::{SortDescriptor, SortDirection},
    schema::EntitySchema,
};

fn parse_order(direction: &SortDirection) -> Result<&'static str, QueryError> {
    match direction {
        SortDirection::Asc => Ok("ASC"),
        SortDirection::Desc => Ok("DESC"),
        SortDirection::Unknown(raw) => Err(QueryError::InvalidDirection {
            direction: raw.clone(),
        }),
    }
}

/// Build ` ORDER BY col DIR, ...` for the given sort list, or an empty string when
/// there is nothing to sort by.
///
/// # Errors
///
/// Returns [`QueryError::Mapping`] for a field without a column and
/// [`QueryError::InvalidDirection`] for a direction other than `asc`/`desc`.
pub fn order_by_clause(
    schema: &EntitySchema,
    sort: &[SortDescriptor],
) -> Result<String, QueryError> {
    if sort.is_empty() {
        return Ok(String::new());
    }

    let terms = sort
        .iter()
        .map(|descriptor| {
            let column = schema.resolve(&descriptor.field)?;
            let order = parse_order(&descriptor.dir)?;
            Ok(format!("{column} {order}"))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;

    Ok(format!(" ORDER BY {}", terms.join(", ")))
}
