use super::conditions::{FieldKind, build_condition, json_to_value};
use super::pagination::{Cursor, effective_limit, value_to_json};
use super::query::{ListQuery, SortDirection};
use super::sort::resolve_sort;
use crate::core::traits::CrudResource;
use crate::errors::CrudError;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{ColumnTrait, Condition, ModelTrait, Order};

/// A validated `ListQuery`, resolved against one resource's columns.
#[derive(Debug, Clone)]
pub struct ListPlan<C> {
    /// Filters only. Used for the total count.
    pub condition: Condition,
    /// Position after the previous page, when continuing from a cursor.
    pub keyset: Option<Condition>,
    pub sort_field: &'static str,
    pub sort_column: C,
    pub direction: SortDirection,
    pub id_field: &'static str,
    pub id_column: C,
    pub offset: u64,
    pub limit: u64,
}

impl<C> ListPlan<C>
where
    C: ColumnTrait + Copy,
{
    /// # Errors
    ///
    /// `InvalidFilter` for unknown filter or sort fields, operator/type
    /// mismatches, an out-of-range limit, both offset and cursor set, or a
    /// malformed or mismatched cursor.
    pub fn build<R>(query: &ListQuery) -> Result<Self, CrudError>
    where
        R: CrudResource<ColumnType = C>,
    {
        let limit = effective_limit(query.limit)?;
        if query.offset.is_some() && query.cursor.is_some() {
            return Err(CrudError::invalid_filter(
                "offset and cursor cannot be combined",
            ));
        }

        let condition = build_condition(&query.filters, &R::filterable_columns())?;
        let (sort_field, sort_column, direction) = resolve_sort(
            query.sort.as_ref(),
            &R::sortable_columns(),
            (R::ID_FIELD, R::ID_COLUMN),
        )?;

        let keyset = match &query.cursor {
            Some(token) => {
                let cursor = Cursor::decode(token)?;
                cursor.check_sort(sort_field, direction)?;
                Some(keyset_condition(
                    (sort_field, sort_column),
                    (R::ID_FIELD, R::ID_COLUMN),
                    direction,
                    &cursor,
                )?)
            }
            None => None,
        };

        Ok(Self {
            condition,
            keyset,
            sort_field,
            sort_column,
            direction,
            id_field: R::ID_FIELD,
            id_column: R::ID_COLUMN,
            offset: query.offset.unwrap_or(0),
            limit,
        })
    }

    fn sorts_by_id(&self) -> bool {
        self.sort_field == self.id_field
    }

    /// Sort key first, then identity in the same direction. Nulls sort last
    /// in both directions on every backend, so the keyset can place them.
    #[must_use]
    pub fn order(&self) -> Vec<(C, Order, NullOrdering)> {
        let mut order = vec![(self.sort_column, self.direction.into(), NullOrdering::Last)];
        if !self.sorts_by_id() {
            order.push((self.id_column, self.direction.into(), NullOrdering::Last));
        }
        order
    }

    /// Filters plus the cursor position.
    #[must_use]
    pub fn page_condition(&self) -> Condition {
        match &self.keyset {
            Some(keyset) => self.condition.clone().add(keyset.clone()),
            None => self.condition.clone(),
        }
    }

    /// Cursor positioned after `last`. `None` only when a value has no JSON
    /// form; a null sort key is carried as null.
    pub fn next_cursor<R>(&self, last: &R::ModelType) -> Option<String>
    where
        R: CrudResource<ColumnType = C>,
    {
        let key = value_to_json(&last.get(self.sort_column))?;
        let id = value_to_json(&last.get(self.id_column))?;
        if id.is_null() {
            return None;
        }
        Some(
            Cursor {
                field: self.sort_field.to_string(),
                direction: self.direction,
                key,
                id,
            }
            .encode(),
        )
    }
}

/// `(key, id) > (k, i)` for ascending order, `<` for descending, written out
/// so it works on every backend. Nulls sort last, so every null key follows a
/// non-null cursor, and a null cursor is followed only by null keys with a
/// later identity.
fn keyset_condition<C>(
    (sort_field, sort_column): (&'static str, C),
    (id_field, id_column): (&'static str, C),
    direction: SortDirection,
    cursor: &Cursor,
) -> Result<Condition, CrudError>
where
    C: ColumnTrait + Copy,
{
    let id = json_to_value(id_field, FieldKind::of_column(id_column), &cursor.id)?;
    let after_id = match direction {
        SortDirection::Asc => id_column.gt(id),
        SortDirection::Desc => id_column.lt(id),
    };
    if sort_field == id_field {
        return Ok(Condition::all().add(after_id));
    }

    if cursor.key.is_null() {
        return Ok(Condition::all().add(sort_column.is_null()).add(after_id));
    }

    let key = json_to_value(sort_field, FieldKind::of_column(sort_column), &cursor.key)?;
    let past_key = match direction {
        SortDirection::Asc => sort_column.gt(key.clone()),
        SortDirection::Desc => sort_column.lt(key.clone()),
    };
    Ok(Condition::any()
        .add(past_key)
        .add(Condition::all().add(sort_column.eq(key)).add(after_id))
        .add(sort_column.is_null()))
}
