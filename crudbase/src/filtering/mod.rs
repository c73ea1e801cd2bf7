//! # List criteria
//!
//! Turns a [`ListQuery`] into a validated [`ListPlan`]: a Sea-ORM condition,
//! an ordering with an identity tie-break, and offset or keyset pagination.
//!
//! ```rust,ignore
//! use crudbase::{FilterOperator, ListQuery, SortDirection};
//!
//! // username = 'Ana' AND created_at >= '2024-01-01', newest first, 10 per page
//! let query = ListQuery::new()
//!     .filter("username", FilterOperator::Eq, "Ana")
//!     .filter("created_at", FilterOperator::Gte, "2024-01-01T00:00:00Z")
//!     .sort_by("created_at", SortDirection::Desc)
//!     .limit(10);
//!
//! let page = users.list(&query).await?;
//! if let Some(cursor) = page.next_cursor {
//!     let next = users.list(&query.clone().after(cursor)).await?;
//! }
//! ```
//!
//! ## Operators
//!
//! | operator | accepted on | value |
//! |----------|-------------|-------|
//! | `eq`, `ne` | every filterable field | scalar, or `null` for `IS [NOT] NULL` |
//! | `gt`, `gte`, `lt`, `lte` | text, numeric, temporal | scalar |
//! | `like` | text | string, matched case-insensitively as a substring |
//! | `in`, `not_in` | every filterable field | array of scalars |
//!
//! Fields must be registered in the resource's `filterable_columns()` /
//! `sortable_columns()`; anything else is rejected as an invalid filter.

pub mod conditions;
pub mod pagination;
pub mod plan;
pub mod query;
pub mod sort;

pub use conditions::{FieldKind, build_condition};
pub use pagination::{Cursor, DEFAULT_LIMIT, MAX_LIMIT};
pub use plan::ListPlan;
pub use query::{FieldFilter, FilterOperator, ListPage, ListQuery, SortDirection, SortSpec};
