use crate::config::DatabaseConfig;
use crate::core::{CrudBase, CrudResource};
use crate::errors::CrudError;
use crate::filtering::{ListPage, ListQuery};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// A connection pool bound to a private current-thread runtime.
///
/// The pool is opened on that runtime, so its background tasks run whenever
/// a blocking call drives it. Must not be used from inside another Tokio
/// runtime; `block_on` panics there.
#[derive(Clone)]
pub struct BlockingConnection {
    runtime: Arc<Runtime>,
    db: DatabaseConnection,
}

impl std::fmt::Debug for BlockingConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingConnection").finish_non_exhaustive()
    }
}

fn build_runtime() -> Result<Runtime, CrudError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CrudError::Runtime)
}

impl BlockingConnection {
    /// # Errors
    ///
    /// `Runtime` when the runtime cannot start, `StoreUnavailable` when the
    /// store cannot be reached.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, CrudError> {
        let runtime = build_runtime()?;
        let db = runtime.block_on(config.connect())?;
        Ok(Self {
            runtime: Arc::new(runtime),
            db,
        })
    }

    /// Opens a pool from prepared options, e.g. for an in-memory database.
    ///
    /// # Errors
    ///
    /// As [`connect`](Self::connect).
    pub fn connect_with(options: sea_orm::ConnectOptions) -> Result<Self, CrudError> {
        let runtime = build_runtime()?;
        let db = runtime
            .block_on(sea_orm::Database::connect(options))
            .map_err(CrudError::StoreUnavailable)?;
        Ok(Self {
            runtime: Arc::new(runtime),
            db,
        })
    }

    /// Runs `f` against the pool on the private runtime, e.g. to apply
    /// migrations before handing the connection out.
    pub fn run<'a, F, Fut, T>(&'a self, f: F) -> T
    where
        F: FnOnce(&'a DatabaseConnection) -> Fut,
        Fut: Future<Output = T>,
    {
        self.runtime.block_on(f(&self.db))
    }

    fn block_on<T>(&self, future: impl Future<Output = T>) -> T {
        self.runtime.block_on(future)
    }
}

/// Blocking CRUD for one resource. Same contracts as [`AsyncCrud`](crate::AsyncCrud);
/// each call blocks the calling thread until its transaction has finished.
pub struct SyncCrud<R> {
    conn: BlockingConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for SyncCrud<R> {
    fn clone(&self) -> Self {
        Self::new(self.conn.clone())
    }
}

impl<R> std::fmt::Debug for SyncCrud<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCrud")
            .field("resource", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<R> SyncCrud<R> {
    #[must_use]
    pub const fn new(conn: BlockingConnection) -> Self {
        Self {
            conn,
            _resource: PhantomData,
        }
    }

    /// # Errors
    ///
    /// As [`BlockingConnection::connect`].
    pub fn connect(config: &DatabaseConfig) -> Result<Self, CrudError> {
        Ok(Self::new(BlockingConnection::connect(config)?))
    }

    #[must_use]
    pub const fn connection(&self) -> &BlockingConnection {
        &self.conn
    }
}

impl<R: CrudResource> SyncCrud<R> {
    /// # Errors
    ///
    /// As [`CrudBase::create`].
    pub fn create(&self, input: R::CreateModel) -> Result<R, CrudError> {
        self.conn.block_on(CrudBase::<R>::create(&self.conn.db, input))
    }

    /// # Errors
    ///
    /// As [`CrudBase::get`].
    pub fn get(&self, id: R::IdType) -> Result<Option<R>, CrudError> {
        self.conn.block_on(CrudBase::<R>::get(&self.conn.db, id))
    }

    /// # Errors
    ///
    /// As [`CrudBase::list`].
    pub fn list(&self, query: &ListQuery) -> Result<ListPage<R>, CrudError> {
        self.conn.block_on(CrudBase::<R>::list(&self.conn.db, query))
    }

    /// # Errors
    ///
    /// As [`CrudBase::count`].
    pub fn count(&self, query: &ListQuery) -> Result<u64, CrudError> {
        self.conn.block_on(CrudBase::<R>::count(&self.conn.db, query))
    }

    /// # Errors
    ///
    /// As [`CrudBase::update`].
    pub fn update(&self, id: R::IdType, patch: R::UpdateModel) -> Result<Option<R>, CrudError> {
        self.conn
            .block_on(CrudBase::<R>::update(&self.conn.db, id, patch))
    }

    /// # Errors
    ///
    /// As [`CrudBase::delete`].
    pub fn delete(&self, id: R::IdType) -> Result<bool, CrudError> {
        self.conn.block_on(CrudBase::<R>::delete(&self.conn.db, id))
    }

    /// # Errors
    ///
    /// As [`CrudBase::delete_many`].
    pub fn delete_many(&self, ids: Vec<R::IdType>) -> Result<u64, CrudError> {
        self.conn
            .block_on(CrudBase::<R>::delete_many(&self.conn.db, ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_entity::{Entity, Item, ItemCreate, ItemUpdate};
    use sea_orm::{ConnectOptions, ConnectionTrait, Schema};

    fn sync_items() -> SyncCrud<Item> {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let conn = BlockingConnection::connect_with(opt).unwrap();
        conn.run(|db| async move {
            let backend = db.get_database_backend();
            let stmt = Schema::new(backend).create_table_from_entity(Entity);
            db.execute(backend.build(&stmt)).await
        })
        .unwrap();
        SyncCrud::new(conn)
    }

    #[test]
    fn test_blocking_lifecycle() {
        let items = sync_items();
        let created = items
            .create(ItemCreate {
                name: "Ana".into(),
                score: Some(1),
            })
            .unwrap();
        assert_eq!(items.get(created.id).unwrap().as_ref(), Some(&created));

        let patch = ItemUpdate {
            score: Some(Some(2)),
            ..Default::default()
        };
        let updated = items.update(created.id, patch).unwrap().unwrap();
        assert_eq!(updated.score, Some(2));

        assert!(items.delete(created.id).unwrap());
        assert!(!items.delete(created.id).unwrap());
        assert!(items.get(created.id).unwrap().is_none());
    }

    #[test]
    fn test_blocking_calls_from_several_threads() {
        let items = sync_items();
        std::thread::scope(|scope| {
            for n in 0..4 {
                let items = items.clone();
                scope.spawn(move || {
                    items
                        .create(ItemCreate {
                            name: format!("t{n}"),
                            score: None,
                        })
                        .unwrap();
                });
            }
        });
        assert_eq!(items.count(&ListQuery::new()).unwrap(), 4);
    }
}
