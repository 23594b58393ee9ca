//! # Error Handling
//!
//! Every failure the engine can produce is a [`QueryError`]. The variants fall into two
//! categories:
//!
//! - **Compile errors** are raised while the filter tree, sort list and parameters are
//!   turned into SQL. They are programmer or configuration mistakes, are detected before
//!   any statement reaches the database, and are never retried.
//! - **Execution errors** wrap the [`DbErr`] reported by the data store (connectivity,
//!   syntax, constraint violations). The original cause stays reachable through
//!   [`std::error::Error::source`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! match repository.get_rows(&db, &request).await {
//!     Ok(page) => Json(page).into_response(),
//!     Err(err) if err.is_compile_error() => /* reject the request */,
//!     Err(err) => err.into_response(),
//! }
//! ```
//!
//! `QueryError` also implements [`IntoResponse`], so axum handlers can return it
//! directly. Compile errors become `400 Bad Request` with their message; execution
//! errors become `500 Internal Server Error` with a generic message while the cause is
//! logged through `tracing`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// A filter or sort field has no physical column in the entity schema
    #[error("no column is mapped for field '{field}' of entity '{entity}'")]
    Mapping { entity: String, field: String },

    /// Unknown or missing comparison operator, or a logic value other than `and`/`or`
    #[error("invalid operator '{operator}'")]
    InvalidOperator { operator: String },

    /// Sort direction other than `asc`/`desc`
    #[error("invalid sort direction '{direction}'")]
    InvalidDirection { direction: String },

    /// The operand does not fit the operator (e.g. a malformed `between` pair)
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// Keyword search on an entity without keyword-search columns
    #[error("keyword search requested on entity '{entity}' which has no keyword columns")]
    KeywordConfiguration { entity: String },

    /// A base-expression parameter uses a name the filter compiler generated
    #[error("parameter '{name}' is bound twice")]
    ParameterConflict { name: String },

    #[error("invalid query configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The data store rejected or failed a statement
    #[error("{context}: {source}")]
    Execution {
        context: String,
        #[source]
        source: DbErr,
    },
}

impl QueryError {
    pub fn mapping(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Mapping {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn invalid_operator(operator: impl Into<String>) -> Self {
        Self::InvalidOperator {
            operator: operator.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a data-store failure, keeping the original cause
    pub fn execution(context: impl Into<String>, source: DbErr) -> Self {
        Self::Execution {
            context: context.into(),
            source,
        }
    }

    /// True for errors detected before any statement was executed
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        !self.is_execution_error()
    }

    #[must_use]
    pub const fn is_execution_error(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    fn status_code(&self) -> StatusCode {
        if self.is_execution_error() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }

    /// Sanitized message; database details are never part of it
    fn user_message(&self) -> String {
        match self {
            Self::Execution { .. } => "A database error occurred".to_string(),
            other => other.to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Execution { context, source } => {
                tracing::error!(context = %context, error = ?source, "Query execution failed");
            }
            _ => {
                tracing::debug!(error = %self, "Query rejected before execution");
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body = ErrorResponse {
            error: self.user_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
