//! # crudbase
//!
//! Generic create/read/update/delete over Sea-ORM entities, with one
//! transactional core and two ways to wait for it.
//!
//! A resource is described once by implementing [`CrudResource`] on its Read
//! schema. [`CrudBase`] holds the operations; [`AsyncCrud`] awaits them and
//! [`SyncCrud`] blocks on them from ordinary threads.
//!
//! ```rust,ignore
//! use crudbase::{AsyncCrud, DatabaseConfig, ListQuery, FilterOperator};
//!
//! let users: AsyncCrud<User> = AsyncCrud::connect(&DatabaseConfig::from_env()?).await?;
//! let ana = users.create(UserCreate { username: "Ana".into(), email: "a@x.com".into(), ..}).await?;
//! let page = users
//!     .list(&ListQuery::new().filter("username", FilterOperator::Eq, "Ana").limit(10))
//!     .await?;
//! ```
//!
//! ## Features
//!
//! - `sqlite` (default), `postgresql`, `mysql`: store drivers.
//! - `derive` (default): `ToCreateModel` / `ToUpdateModel`.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod adapters;
pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_entity;

pub use adapters::{AsyncCrud, BlockingConnection, SyncCrud};
pub use config::{ConfigError, DatabaseConfig};
pub use crate::core::{CrudBase, CrudResource, MergeIntoActiveModel};
pub use errors::CrudError;
pub use filtering::{
    Cursor, FieldFilter, FilterOperator, ListPage, ListPlan, ListQuery, SortDirection, SortSpec,
};
pub use validation::{Validatable, ValidationError, ValidationErrors, validators};

#[cfg(feature = "derive")]
pub use crudbase_derive::{ToCreateModel, ToUpdateModel};

// Generated `Update` structs name `crudbase::serde_with` in their serde attributes.
pub use serde_with;
