use serde_json::Value;

use super::{
    params::{ParamNamer, ParameterMap, child_prefix},
    search::{keyword_condition, like_comparison, substring_pattern},
};
use crate::{
    config::QueryConfig,
    errors::QueryError,
    models::{FilterNode, Group, KEYWORD_FIELD, Logic, Operator, Predicate},
    schema::EntitySchema,
};

/// A compiled predicate and the parameters it references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: ParameterMap,
}

impl Fragment {
    fn seed(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: ParameterMap::new(),
        }
    }

    /// True when the fragment contributes no constraint
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Compiles [`FilterNode`] trees into parameterized SQL predicates for one entity.
///
/// Compilation is pure: every call returns its own [`Fragment`], and children's
/// parameters are merged by their parent. Parameter names derive from the node's
/// position in the tree, so the same tree and prefix always yield the same SQL.
pub struct FilterCompiler<'a> {
    schema: &'a EntitySchema,
    config: &'a QueryConfig,
}

impl<'a> FilterCompiler<'a> {
    #[must_use]
    pub const fn new(schema: &'a EntitySchema, config: &'a QueryConfig) -> Self {
        Self { schema, config }
    }

    /// Compile from the configured root prefix
    ///
    /// # Errors
    ///
    /// See [`FilterCompiler::compile`].
    pub fn compile_root(&self, node: &FilterNode) -> Result<Fragment, QueryError> {
        self.compile(node, &self.config.param_prefix)
    }

    /// Compile `node`, naming its parameters under `prefix`.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Mapping`] for a field without a column
    /// - [`QueryError::InvalidOperator`] for an unknown operator or logic value
    /// - [`QueryError::InvalidValue`] for an operand the operator cannot use
    /// - [`QueryError::KeywordConfiguration`] for keyword search without keyword columns
    pub fn compile(&self, node: &FilterNode, prefix: &str) -> Result<Fragment, QueryError> {
        match node {
            FilterNode::Group(group) => self.compile_group(group, prefix),
            FilterNode::Predicate(predicate) => self.compile_predicate(predicate, prefix),
        }
    }

    fn compile_group(&self, group: &Group, prefix: &str) -> Result<Fragment, QueryError> {
        if let [only] = group.sub_filters.as_slice() {
            return self.compile(only, &child_prefix(prefix, 0));
        }

        let (seed, joiner) = match &group.logic {
            Logic::And => ("1=1", " AND ("),
            Logic::Or => ("1=0", " OR ("),
            Logic::Unknown(raw) => return Err(QueryError::invalid_operator(raw.as_str())),
        };

        let mut fragment = Fragment::seed(seed);
        let mut constrained = group.sub_filters.is_empty();
        for (index, child) in group.sub_filters.iter().enumerate() {
            let compiled = self.compile(child, &child_prefix(prefix, index))?;
            if compiled.is_empty() {
                continue;
            }
            constrained = true;

            fragment.sql.push_str(joiner);
            fragment.sql.push_str(&compiled.sql);
            fragment.sql.push(')');
            fragment.params.merge(compiled.params)?;
        }

        // children that all carry no constraint leave the whole group unconstrained
        if !constrained {
            return Ok(Fragment::default());
        }

        Ok(fragment)
    }

    fn compile_predicate(
        &self,
        predicate: &Predicate,
        prefix: &str,
    ) -> Result<Fragment, QueryError> {
        if predicate.value.is_null() {
            return Ok(Fragment::default());
        }

        let escape = self.config.escape_like_wildcards;
        let mut names = ParamNamer::new(prefix);
        let mut fragment = Fragment::default();

        if predicate.field == KEYWORD_FIELD {
            let param = names.next_name();
            fragment.sql = keyword_condition(self.schema, &param, escape)?;
            fragment
                .params
                .insert(param, substring_pattern(&predicate.value, escape));
            return Ok(fragment);
        }

        let column = self.schema.resolve(&predicate.field)?;
        let value = &predicate.value;

        let operator = predicate
            .operator
            .as_ref()
            .ok_or_else(|| QueryError::invalid_operator(""))?;

        match operator {
            Operator::Eq => {
                let param = names.next_name();
                fragment.sql = if value.is_array() {
                    format!("{column} IN (:{param})")
                } else {
                    format!("{column} = :{param}")
                };
                fragment.params.insert(param, value.clone());
            }
            Operator::Contains => {
                let param = names.next_name();
                if value.is_array() {
                    fragment.sql = format!("{column} IN (:{param})");
                    fragment.params.insert(param, value.clone());
                } else {
                    fragment.sql = like_comparison(column, &param, escape);
                    fragment.params.insert(param, substring_pattern(value, escape));
                }
            }
            Operator::Between => {
                let (from, to) = between_bounds(&predicate.field, value)?;
                match (from, to) {
                    (Some(from), Some(to)) => {
                        let low = names.next_name();
                        let high = names.next_name();
                        fragment.sql = format!("{column} BETWEEN :{low} AND :{high}");
                        fragment.params.insert(low, from.clone());
                        fragment.params.insert(high, to.clone());
                    }
                    (Some(bound), None) | (None, Some(bound)) => {
                        let symbol = if from.is_some() { ">=" } else { "<=" };
                        let param = names.next_name();
                        fragment.sql = format!("{column} {symbol} :{param}");
                        fragment.params.insert(param, bound.clone());
                    }
                    (None, None) => {}
                }
            }
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
                if value.is_array() || value.is_object() {
                    return Err(QueryError::invalid_value(
                        &predicate.field,
                        format!("'{}' expects a single value", operator.as_str()),
                    ));
                }
                let symbol = match operator {
                    Operator::Gt => ">",
                    Operator::Ge => ">=",
                    Operator::Lt => "<",
                    _ => "<=",
                };
                let param = names.next_name();
                fragment.sql = format!("{column} {symbol} :{param}");
                fragment.params.insert(param, value.clone());
            }
            Operator::Unknown(raw) => return Err(QueryError::invalid_operator(raw.as_str())),
        }

        Ok(fragment)
    }
}

/// Split a `between` operand `[from, to]` into its non-null bounds
fn between_bounds<'v>(
    field: &str,
    value: &'v Value,
) -> Result<(Option<&'v Value>, Option<&'v Value>), QueryError> {
    let bounds = value
        .as_array()
        .filter(|bounds| bounds.len() <= 2)
        .ok_or_else(|| QueryError::invalid_value(field, "'between' expects [from, to]"))?;

    let bound = |index: usize| bounds.get(index).filter(|value| !value.is_null());
    let (from, to) = (bound(0), bound(1));
    if [from, to]
        .into_iter()
        .flatten()
        .any(|bound| bound.is_array() || bound.is_object())
    {
        return Err(QueryError::invalid_value(
            field,
            "'between' bounds must be single values",
        ));
    }
    Ok((from, to))
}
