use sea_orm::{DatabaseBackend, DbErr, Statement, Value};
use serde_json::Value as JsonValue;

use crate::filtering::ParameterMap;

/// Turn SQL with `:name` placeholders into a backend statement.
///
/// Each placeholder becomes `$n` (Postgres) or `?` (MySQL, SQLite) and its value is
/// pushed in order, so a name used twice is bound twice. A collection parameter expands
/// to one placeholder per element; an empty collection becomes `NULL`, which matches
/// nothing inside `IN (...)`.
///
/// Quoted literals and identifiers, `--` and `/* */` comments are copied verbatim, and
/// `::` casts are not taken for placeholders.
///
/// # Errors
///
/// Returns `DbErr::Custom` when the SQL references a name missing from `params`.
pub fn to_statement(
    backend: DatabaseBackend,
    sql: &str,
    params: &ParameterMap,
) -> Result<Statement, DbErr> {
    let mut rewritten = String::with_capacity(sql.len());
    let mut values = Vec::with_capacity(params.len());
    let mut chars = sql.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((index, c)) = chars.next() {
        if let Some(open) = quote {
            rewritten.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                rewritten.push(c);
            }
            '-' if chars.peek().is_some_and(|&(_, next)| next == '-') => {
                rewritten.push(c);
                for (_, next) in chars.by_ref() {
                    rewritten.push(next);
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                rewritten.push(c);
                if let Some((_, star)) = chars.next() {
                    rewritten.push(star);
                }
                let mut previous = '\0';
                for (_, next) in chars.by_ref() {
                    rewritten.push(next);
                    if previous == '*' && next == '/' {
                        break;
                    }
                    previous = next;
                }
            }
            ':' if chars.peek().is_some_and(|&(_, next)| next == ':') => {
                rewritten.push_str("::");
                chars.next();
            }
            ':' if chars.peek().is_some_and(|&(_, next)| is_name_start(next)) => {
                let start = index + 1;
                let mut end = start;
                while let Some(&(offset, next)) = chars.peek() {
                    if !is_name_char(next) {
                        break;
                    }
                    end = offset + next.len_utf8();
                    chars.next();
                }

                let name = &sql[start..end];
                let value = params
                    .get(name)
                    .ok_or_else(|| DbErr::Custom(format!("no value bound for parameter '{name}'")))?;
                bind(backend, value, &mut rewritten, &mut values);
            }
            _ => rewritten.push(c),
        }
    }

    Ok(Statement::from_sql_and_values(backend, rewritten, values))
}

fn bind(backend: DatabaseBackend, value: &JsonValue, sql: &mut String, values: &mut Vec<Value>) {
    match value {
        JsonValue::Array(items) if items.is_empty() => sql.push_str("NULL"),
        JsonValue::Array(items) => {
            for (position, item) in items.iter().enumerate() {
                if position > 0 {
                    sql.push_str(", ");
                }
                values.push(to_db_value(item));
                push_placeholder(backend, values.len(), sql);
            }
        }
        scalar => {
            values.push(to_db_value(scalar));
            push_placeholder(backend, values.len(), sql);
        }
    }
}

fn push_placeholder(backend: DatabaseBackend, position: usize, sql: &mut String) {
    match backend {
        DatabaseBackend::Postgres => {
            sql.push('$');
            sql.push_str(&position.to_string());
        }
        _ => sql.push('?'),
    }
}

/// Convert a JSON operand into the value Sea-ORM binds
#[must_use]
pub fn to_db_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::String(None),
        JsonValue::Bool(flag) => Value::from(*flag),
        JsonValue::Number(number) => {
            if let Some(int) = number.as_i64() {
                Value::from(int)
            } else if let Some(unsigned) = number.as_u64() {
                Value::from(unsigned)
            } else {
                Value::from(number.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(text) => Value::from(text.clone()),
        nested => Value::from(nested.to_string()),
    }
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
