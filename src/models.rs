use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved predicate field that selects free-text search over the keyword columns
pub const KEYWORD_FIELD: &str = "keyword";

/// A page of rows requested by a client.
///
/// # JSON shape
///
/// ```json
/// {
///   "page": 0,
///   "size": 10,
///   "sort": [{"field": "createdAt", "dir": "desc"}],
///   "filter": {"field": "status", "operator": "eq", "value": "ACTIVE"}
/// }
/// ```
///
/// `sortProps` is accepted as an alias of `sort`. A `size` of 0 returns every row and
/// ignores `page`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page index, 0-based
    pub page: u64,
    /// Rows per page, 0 for no pagination
    pub size: u64,
    #[serde(alias = "sortProps")]
    pub sort: Vec<SortDescriptor>,
    pub filter: Option<FilterNode>,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, dir: SortDirection) -> Self {
        self.sort.push(SortDescriptor {
            field: field.into(),
            dir,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    #[serde(default)]
    pub dir: SortDirection,
}

/// Sort direction. Parsing is case-insensitive; anything else is kept as
/// [`SortDirection::Unknown`] and rejected when the query is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
    Unknown(String),
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Unknown(value)
        }
    }
}

impl From<SortDirection> for String {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => "asc".to_string(),
            SortDirection::Desc => "desc".to_string(),
            SortDirection::Unknown(raw) => raw,
        }
    }
}

/// Comparison operator of a [`Predicate`]. Names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Contains,
    Between,
    Gt,
    Ge,
    Lt,
    Le,
    Unknown(String),
}

impl Operator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Contains => "contains",
            Self::Between => "between",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Operator {
    fn from(value: String) -> Self {
        match value.as_str() {
            "eq" => Self::Eq,
            "contains" => Self::Contains,
            "between" => Self::Between,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for Operator {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Operator> for String {
    fn from(value: Operator) -> Self {
        value.as_str().to_string()
    }
}

/// Logic joining the children of a [`Group`]. Only `and` and `or` are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Logic {
    And,
    Or,
    Unknown(String),
}

impl Logic {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Logic {
    fn from(value: String) -> Self {
        match value.as_str() {
            "and" => Self::And,
            "or" => Self::Or,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Logic> for String {
    fn from(value: Logic) -> Self {
        value.as_str().to_string()
    }
}

/// One node of a client filter tree.
///
/// Predicates serialize as `{"field", "operator", "value"}` and groups as
/// `{"filter": {"logic", "subFilters"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterNode", into = "RawFilterNode")]
pub enum FilterNode {
    Group(Group),
    Predicate(Predicate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub logic: Logic,
    pub sub_filters: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    /// Ignored for the `keyword` field
    pub operator: Option<Operator>,
    /// `Value::Null` means the predicate carries no constraint
    pub value: Value,
}

impl FilterNode {
    pub fn and(sub_filters: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::Group(Group {
            logic: Logic::And,
            sub_filters: sub_filters.into_iter().collect(),
        })
    }

    pub fn or(sub_filters: impl IntoIterator<Item = FilterNode>) -> Self {
        Self::Group(Group {
            logic: Logic::Or,
            sub_filters: sub_filters.into_iter().collect(),
        })
    }

    pub fn predicate(
        field: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Predicate(Predicate {
            field: field.into(),
            operator: Some(operator.into()),
            value: value.into(),
        })
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Eq, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::predicate(field, Operator::Contains, value)
    }

    /// `between` with optional bounds; `None` leaves that side open
    pub fn between(field: impl Into<String>, from: Option<Value>, to: Option<Value>) -> Self {
        let bounds = vec![from.unwrap_or(Value::Null), to.unwrap_or(Value::Null)];
        Self::predicate(field, Operator::Between, Value::Array(bounds))
    }

    pub fn keyword(value: impl Into<Value>) -> Self {
        Self::Predicate(Predicate {
            field: KEYWORD_FIELD.to_string(),
            operator: None,
            value: value.into(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawFilterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<RawGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    logic: Logic,
    #[serde(default)]
    sub_filters: Vec<FilterNode>,
}

impl TryFrom<RawFilterNode> for FilterNode {
    type Error = String;

    fn try_from(raw: RawFilterNode) -> Result<Self, Self::Error> {
        if let Some(group) = raw.filter {
            return Ok(Self::Group(Group {
                logic: group.logic,
                sub_filters: group.sub_filters,
            }));
        }

        let field = raw
            .field
            .ok_or_else(|| "filter node needs either `filter` or `field`".to_string())?;

        Ok(Self::Predicate(Predicate {
            field,
            operator: raw.operator,
            value: raw.value,
        }))
    }
}

impl From<FilterNode> for RawFilterNode {
    fn from(node: FilterNode) -> Self {
        match node {
            FilterNode::Group(group) => Self {
                filter: Some(RawGroup {
                    logic: group.logic,
                    sub_filters: group.sub_filters,
                }),
                ..Self::default()
            },
            FilterNode::Predicate(predicate) => Self {
                field: Some(predicate.field),
                operator: predicate.operator,
                value: predicate.value,
                filter: None,
            },
        }
    }
}

/// Total row count plus the rows of the requested page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Matching rows ignoring pagination
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> PageResponse<T> {
    #[must_use]
    pub const fn new(total: u64, rows: Vec<T>) -> Self {
        Self { total, rows }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total: 0,
            rows: Vec::new(),
        }
    }

    /// Convert every row, keeping the total
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            total: self.total,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}
