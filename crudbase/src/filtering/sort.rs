use super::query::{SortDirection, SortSpec};
use crate::errors::CrudError;
use sea_orm::ColumnTrait;

/// Find column by name
fn find_column<C>(column_name: &str, columns: &[(&'static str, C)]) -> Option<(&'static str, C)>
where
    C: ColumnTrait + Copy,
{
    columns
        .iter()
        .find(|&&(col_name, _)| col_name == column_name)
        .copied()
}

/// The column to order by and its direction. Without a sort spec the list
/// is ordered by `default` ascending.
///
/// # Errors
///
/// `InvalidFilter` when the requested field is not sortable.
pub fn resolve_sort<C>(
    sort: Option<&SortSpec>,
    columns: &[(&'static str, C)],
    default: (&'static str, C),
) -> Result<(&'static str, C, SortDirection), CrudError>
where
    C: ColumnTrait + Copy,
{
    let Some(spec) = sort else {
        return Ok((default.0, default.1, SortDirection::Asc));
    };
    if spec.field == default.0 {
        return Ok((default.0, default.1, spec.direction));
    }
    let (name, column) = find_column(&spec.field, columns).ok_or_else(|| {
        CrudError::invalid_filter(format!("unknown sort field '{}'", spec.field))
    })?;
    Ok((name, column, spec.direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_entity::Column;

    const COLUMNS: [(&str, Column); 2] = [("name", Column::Name), ("score", Column::Score)];

    #[test]
    fn test_default_sort_is_identity_ascending() {
        let (name, column, direction) = resolve_sort(None, &COLUMNS, ("id", Column::Id)).unwrap();
        assert_eq!(name, "id");
        assert!(matches!(column, Column::Id));
        assert_eq!(direction, SortDirection::Asc);
    }

    #[test]
    fn test_registered_column_is_resolved() {
        let spec = SortSpec {
            field: "score".into(),
            direction: SortDirection::Desc,
        };
        let (name, column, direction) =
            resolve_sort(Some(&spec), &COLUMNS, ("id", Column::Id)).unwrap();
        assert_eq!(name, "score");
        assert!(matches!(column, Column::Score));
        assert_eq!(direction, SortDirection::Desc);
    }

    #[test]
    fn test_identity_is_always_sortable() {
        let spec = SortSpec {
            field: "id".into(),
            direction: SortDirection::Desc,
        };
        let (name, _, direction) = resolve_sort(Some(&spec), &COLUMNS, ("id", Column::Id)).unwrap();
        assert_eq!(name, "id");
        assert_eq!(direction, SortDirection::Desc);
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let spec = SortSpec {
            field: "password".into(),
            direction: SortDirection::Asc,
        };
        let err = resolve_sort(Some(&spec), &COLUMNS, ("id", Column::Id)).unwrap_err();
        assert!(err.is_invalid_filter());
    }
}
