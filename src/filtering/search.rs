use serde_json::Value;

use crate::{errors::QueryError, schema::EntitySchema};

/// Appended to LIKE comparisons when wildcards are escaped
const LIKE_ESCAPE_CLAUSE: &str = " ESCAPE '\\'";

/// Escape LIKE wildcards so the value matches literally.
/// Escapes: \ (escape char), % (match any) and _ (match single char)
pub(crate) fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Text form of a scalar used inside a LIKE pattern. Strings are used as-is, other
/// JSON values by their JSON text.
pub(crate) fn like_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `%value%` substring pattern
pub(crate) fn substring_pattern(value: &Value, escape: bool) -> String {
    let text = like_text(value);
    if escape {
        format!("%{}%", escape_like_wildcards(&text))
    } else {
        format!("%{text}%")
    }
}

/// `column LIKE :param`, with an ESCAPE clause when wildcards are escaped
pub(crate) fn like_comparison(column: &str, param: &str, escape: bool) -> String {
    let escape_clause = if escape { LIKE_ESCAPE_CLAUSE } else { "" };
    format!("{column} LIKE :{param}{escape_clause}")
}

/// ORs a LIKE comparison over every keyword column, all sharing one parameter.
///
/// # Errors
///
/// Returns [`QueryError::KeywordConfiguration`] when the entity has no keyword columns.
pub(crate) fn keyword_condition(
    schema: &EntitySchema,
    param: &str,
    escape: bool,
) -> Result<String, QueryError> {
    let columns = schema.keyword_columns();
    if columns.is_empty() {
        return Err(QueryError::KeywordConfiguration {
            entity: schema.name().to_string(),
        });
    }

    Ok(columns
        .iter()
        .map(|column| like_comparison(column, param, escape))
        .collect::<Vec<_>>()
        .join(" OR "))
}
