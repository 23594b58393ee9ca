use serde::Deserialize;

use crate::errors::QueryError;

/// Default prefix for generated parameter names (`p__0`, `p_1__0`, ...)
pub const DEFAULT_PARAM_PREFIX: &str = "p";

/// Tuning knobs for filter compilation.
///
/// Deserializable so it can live in the application's own configuration file:
///
/// ```toml
/// [query]
/// param_prefix = "f"
/// escape_like_wildcards = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Root prefix of every generated parameter name. Must be a SQL identifier.
    pub param_prefix: String,
    /// Escape `%`, `_` and `\` in `contains` and `keyword` values so they match
    /// literally. Off by default: client-supplied wildcards pass through.
    pub escape_like_wildcards: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            param_prefix: DEFAULT_PARAM_PREFIX.to_string(),
            escape_like_wildcards: false,
        }
    }
}

impl QueryConfig {
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidConfig`] when the parameter prefix is not an identifier.
    pub fn validate(&self) -> Result<(), QueryError> {
        if is_identifier(&self.param_prefix) {
            Ok(())
        } else {
            Err(QueryError::InvalidConfig {
                reason: format!(
                    "parameter prefix '{}' must match [A-Za-z_][A-Za-z0-9_]*",
                    self.param_prefix
                ),
            })
        }
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
