use crate::errors::CrudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match on text columns.
    Like,
    In,
    NotIn,
}

impl FilterOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }

    pub(crate) const fn is_range(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" | "=" => Ok(Self::Eq),
            "ne" | "neq" | "!=" => Ok(Self::Ne),
            "gt" | ">" => Ok(Self::Gt),
            "gte" | ">=" => Ok(Self::Gte),
            "lt" | "<" => Ok(Self::Lt),
            "lte" | "<=" => Ok(Self::Lte),
            "like" => Ok(Self::Like),
            "in" => Ok(Self::In),
            "not_in" | "nin" => Ok(Self::NotIn),
            other => Err(CrudError::invalid_filter(format!("unknown operator '{other}'"))),
        }
    }
}

/// `field <op> value`. The value is JSON so criteria can arrive from any
/// serialized source; it is checked against the column type when the query
/// is planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOperator,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(CrudError::invalid_filter(format!(
                "unknown sort direction '{s}', expected asc or desc"
            )))
        }
    }
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// List criteria: AND-combined filters, one sort key, and either an offset or
/// a cursor, plus a limit.
///
/// ```rust,ignore
/// let query = ListQuery::new()
///     .filter("username", FilterOperator::Eq, "Ana")
///     .sort_by("created_at", SortDirection::Desc)
///     .limit(10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    pub sort: Option<SortSpec>,
    pub offset: Option<u64>,
    pub cursor: Option<String>,
    pub limit: Option<u64>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filters from a filter-by-example value.
    ///
    /// Every non-null field of the serialized value becomes `eq`, arrays
    /// become `in`. Fields that serialize to null are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` when `example` does not serialize to a JSON object.
    pub fn matching<T: Serialize + ?Sized>(example: &T) -> Result<Self, CrudError> {
        let value = serde_json::to_value(example)
            .map_err(|e| CrudError::invalid_filter(format!("unserializable example: {e}")))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(CrudError::invalid_filter(
                "filter example must serialize to an object",
            ));
        };
        let filters = fields
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(field, value)| {
                let op = if value.is_array() {
                    FilterOperator::In
                } else {
                    FilterOperator::Eq
                };
                FieldFilter { field, op, value }
            })
            .collect();
        Ok(Self {
            filters,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Continue after the page that produced `cursor`.
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Rows matching the filters, ignoring offset, cursor and limit.
    pub total_count: u64,
    pub has_more: bool,
    /// Token for the following page. Present exactly when `has_more` is.
    pub next_cursor: Option<String>,
}

impl<T> ListPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            has_more: self.has_more,
            next_cursor: self.next_cursor,
        }
    }
}
