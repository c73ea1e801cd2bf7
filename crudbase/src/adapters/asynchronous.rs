use crate::config::DatabaseConfig;
use crate::core::{CrudBase, CrudResource};
use crate::errors::CrudError;
use crate::filtering::{ListPage, ListQuery};
use sea_orm::DatabaseConnection;
use std::marker::PhantomData;

/// Non-blocking CRUD for one resource over a pooled connection.
///
/// Each call takes its own connection and transaction from the pool, so
/// concurrent calls do not serialize on the handle. Dropping a call's future
/// before it completes rolls its transaction back.
pub struct AsyncCrud<R> {
    db: DatabaseConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for AsyncCrud<R> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<R> std::fmt::Debug for AsyncCrud<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncCrud")
            .field("resource", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R> AsyncCrud<R> {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _resource: PhantomData,
        }
    }

    /// # Errors
    ///
    /// `StoreUnavailable` when the pool cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, CrudError> {
        Ok(Self::new(config.connect().await?))
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<R: CrudResource> AsyncCrud<R> {
    /// See [`CrudBase::create`].
    ///
    /// # Errors
    ///
    /// As [`CrudBase::create`].
    pub async fn create(&self, input: R::CreateModel) -> Result<R, CrudError> {
        CrudBase::<R>::create(&self.db, input).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::get`].
    pub async fn get(&self, id: R::IdType) -> Result<Option<R>, CrudError> {
        CrudBase::<R>::get(&self.db, id).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::list`].
    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<R>, CrudError> {
        CrudBase::<R>::list(&self.db, query).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::count`].
    pub async fn count(&self, query: &ListQuery) -> Result<u64, CrudError> {
        CrudBase::<R>::count(&self.db, query).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::update`].
    pub async fn update(
        &self,
        id: R::IdType,
        patch: R::UpdateModel,
    ) -> Result<Option<R>, CrudError> {
        CrudBase::<R>::update(&self.db, id, patch).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::delete`].
    pub async fn delete(&self, id: R::IdType) -> Result<bool, CrudError> {
        CrudBase::<R>::delete(&self.db, id).await
    }

    /// # Errors
    ///
    /// As [`CrudBase::delete_many`].
    pub async fn delete_many(&self, ids: Vec<R::IdType>) -> Result<u64, CrudError> {
        CrudBase::<R>::delete_many(&self.db, ids).await
    }
}
