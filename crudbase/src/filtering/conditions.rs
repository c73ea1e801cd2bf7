use super::query::{FieldFilter, FilterOperator};
use crate::errors::CrudError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    ColumnTrait, ColumnType, Condition, Value,
    sea_query::{BinOper, Expr, Func, SimpleExpr},
};
use uuid::Uuid;

const MAX_TEXT_VALUE_LENGTH: usize = 10_000;
const LIKE_ESCAPE: char = '\\';

/// How a filter value is interpreted for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTimeUtc,
    DateTime,
    Date,
    Time,
    Uuid,
    /// Json, binary and the like. Not filterable.
    Other,
}

impl FieldKind {
    #[must_use]
    pub fn of(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Char(_)
            | ColumnType::String(_)
            | ColumnType::Text
            | ColumnType::Enum { .. } => Self::Text,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => Self::Float,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::TimestampWithTimeZone => Self::DateTimeUtc,
            ColumnType::DateTime | ColumnType::Timestamp => Self::DateTime,
            ColumnType::Date => Self::Date,
            ColumnType::Time => Self::Time,
            ColumnType::Uuid => Self::Uuid,
            _ => Self::Other,
        }
    }

    pub fn of_column<C: ColumnTrait>(column: C) -> Self {
        Self::of(column.def().get_column_type())
    }

    const fn supports_range(self) -> bool {
        !matches!(self, Self::Boolean | Self::Uuid | Self::Other)
    }
}

fn mismatch(field: &str, kind: FieldKind, value: &serde_json::Value) -> CrudError {
    CrudError::invalid_filter(format!(
        "value {value} is not valid for field '{field}' of kind {kind:?}"
    ))
}

fn parse_temporal<T>(
    field: &str,
    kind: FieldKind,
    value: &serde_json::Value,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, CrudError> {
    value
        .as_str()
        .and_then(|s| parse(s.trim()))
        .ok_or_else(|| mismatch(field, kind, value))
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Converts a JSON filter value into a typed store value for a column of `kind`.
///
/// # Errors
///
/// `InvalidFilter` when the value does not fit the column type. JSON null is
/// rejected here; callers translate it to `IS NULL` where that makes sense.
pub fn json_to_value(
    field: &str,
    kind: FieldKind,
    value: &serde_json::Value,
) -> Result<Value, CrudError> {
    use serde_json::Value as Json;

    match (kind, value) {
        (FieldKind::Text, Json::String(s)) => {
            if s.len() > MAX_TEXT_VALUE_LENGTH {
                return Err(CrudError::invalid_filter(format!(
                    "value for field '{field}' is too long"
                )));
            }
            Ok(s.clone().into())
        }
        (FieldKind::Integer, Json::Number(n)) => {
            n.as_i64().map(Value::from).ok_or_else(|| mismatch(field, kind, value))
        }
        (FieldKind::Float, Json::Number(n)) => {
            n.as_f64().map(Value::from).ok_or_else(|| mismatch(field, kind, value))
        }
        (FieldKind::Boolean, Json::Bool(b)) => Ok((*b).into()),
        (FieldKind::DateTimeUtc, _) => parse_temporal(field, kind, value, |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
        .map(Value::from),
        (FieldKind::DateTime, _) => {
            parse_temporal(field, kind, value, parse_naive_datetime).map(Value::from)
        }
        (FieldKind::Date, _) => parse_temporal(field, kind, value, |s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        })
        .map(Value::from),
        (FieldKind::Time, _) => parse_temporal(field, kind, value, |s| {
            NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok()
        })
        .map(Value::from),
        (FieldKind::Uuid, Json::String(s)) => Uuid::parse_str(s.trim())
            .map(Value::from)
            .map_err(|_| mismatch(field, kind, value)),
        (FieldKind::Other, _) => Err(CrudError::invalid_filter(format!(
            "field '{field}' does not support filtering"
        ))),
        _ => Err(mismatch(field, kind, value)),
    }
}

/// Escapes `%`, `_` and the escape character itself so the input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn column_expr<C: ColumnTrait>(column: C) -> Expr {
    Expr::col((column.entity_name(), column))
}

fn build_like<C: ColumnTrait>(
    field: &str,
    kind: FieldKind,
    column: C,
    value: &serde_json::Value,
) -> Result<SimpleExpr, CrudError> {
    if kind != FieldKind::Text {
        return Err(CrudError::invalid_filter(format!(
            "operator 'like' requires a text field, '{field}' is {kind:?}"
        )));
    }
    let serde_json::Value::String(needle) = value else {
        return Err(mismatch(field, kind, value));
    };
    if needle.len() > MAX_TEXT_VALUE_LENGTH {
        return Err(CrudError::invalid_filter(format!(
            "value for field '{field}' is too long"
        )));
    }
    // Both sides fold with the backend's UPPER.
    let pattern = format!("%{}%", escape_like(needle));
    let pattern = SimpleExpr::Binary(
        Box::new(Func::upper(Expr::val(pattern)).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(LIKE_ESCAPE.into())),
    );
    Ok(Expr::expr(Func::upper(column_expr(column))).binary(BinOper::Like, pattern))
}

fn build_list<C: ColumnTrait>(
    filter: &FieldFilter,
    kind: FieldKind,
    column: C,
) -> Result<SimpleExpr, CrudError> {
    let serde_json::Value::Array(items) = &filter.value else {
        return Err(CrudError::invalid_filter(format!(
            "operator '{}' on field '{}' requires an array",
            filter.op, filter.field
        )));
    };
    let values = items
        .iter()
        .map(|item| json_to_value(&filter.field, kind, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if filter.op == FilterOperator::In {
        column.is_in(values)
    } else {
        column.is_not_in(values)
    })
}

/// Translates one filter into an expression on `column`.
///
/// # Errors
///
/// `InvalidFilter` on operator/type mismatches.
pub fn build_expr<C: ColumnTrait + Copy>(
    filter: &FieldFilter,
    column: C,
) -> Result<SimpleExpr, CrudError> {
    let kind = FieldKind::of_column(column);
    if kind == FieldKind::Other {
        return Err(CrudError::invalid_filter(format!(
            "field '{}' does not support filtering",
            filter.field
        )));
    }
    let field = filter.field.as_str();

    match filter.op {
        FilterOperator::Eq if filter.value.is_null() => Ok(column.is_null()),
        FilterOperator::Ne if filter.value.is_null() => Ok(column.is_not_null()),
        FilterOperator::Eq => Ok(column.eq(json_to_value(field, kind, &filter.value)?)),
        FilterOperator::Ne => Ok(column.ne(json_to_value(field, kind, &filter.value)?)),
        op if op.is_range() => {
            if !kind.supports_range() {
                return Err(CrudError::invalid_filter(format!(
                    "operator '{op}' is not supported on field '{field}' of kind {kind:?}"
                )));
            }
            let value = json_to_value(field, kind, &filter.value)?;
            Ok(match op {
                FilterOperator::Gt => column.gt(value),
                FilterOperator::Gte => column.gte(value),
                FilterOperator::Lt => column.lt(value),
                _ => column.lte(value),
            })
        }
        FilterOperator::Like => build_like(field, kind, column, &filter.value),
        _ => build_list(filter, kind, column),
    }
}

/// AND-combines `filters`, resolving each field against the filterable
/// column registry.
///
/// # Errors
///
/// `InvalidFilter` for unknown fields or incompatible operator/value pairs.
pub fn build_condition<C: ColumnTrait + Copy>(
    filters: &[FieldFilter],
    columns: &[(&'static str, C)],
) -> Result<Condition, CrudError> {
    filters.iter().try_fold(Condition::all(), |condition, filter| {
        let column = columns
            .iter()
            .find(|(name, _)| *name == filter.field)
            .map(|(_, column)| *column)
            .ok_or_else(|| {
                CrudError::invalid_filter(format!("unknown filter field '{}'", filter.field))
            })?;
        Ok(condition.add(build_expr(filter, column)?))
    })
}
