//! Transactional CRUD over any [`CrudResource`].
//!
//! Every operation validates first, then runs in exactly one transaction:
//! commit on success, rollback on failure. Dropping a returned future before
//! it completes drops the open transaction, which rolls it back.

use super::traits::{CrudResource, MergeIntoActiveModel};
use crate::errors::CrudError;
use crate::filtering::{ListPage, ListPlan, ListQuery};
use crate::validation::Validatable;
use sea_orm::{DatabaseTransaction, IntoActiveModel, TransactionTrait};
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Stateless: the connection is passed to each call so the same logic runs
/// under both execution adapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrudBase<R> {
    _resource: PhantomData<fn() -> R>,
}

async fn begin<C: TransactionTrait>(db: &C) -> Result<DatabaseTransaction, CrudError> {
    Ok(db.begin().await?)
}

/// Commits on `Ok`, rolls back on `Err`. A failed rollback is logged and the
/// original error returned.
async fn finish<T>(
    txn: DatabaseTransaction,
    outcome: Result<T, CrudError>,
) -> Result<T, CrudError> {
    match outcome {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

impl<R: CrudResource> CrudBase<R> {
    /// Validates `input`, inserts it and returns the stored record including
    /// store-assigned identity and defaults.
    ///
    /// # Errors
    ///
    /// `Validation` before any write, `Conflict` on a uniqueness violation,
    /// store errors otherwise.
    pub async fn create<C>(db: &C, input: R::CreateModel) -> Result<R, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_SINGULAR;
        debug!(resource, "create");
        let result: Result<R::ModelType, CrudError> = async {
            input.validate()?;
            let txn = begin(db).await?;
            let outcome = R::insert_one(&txn, input.into())
                .await
                .map_err(CrudError::from);
            finish(txn, outcome).await
        }
        .await;

        match result {
            Ok(model) => {
                let created: R = model.into();
                info!(resource, "created");
                Ok(created)
            }
            Err(err) => {
                err.log(resource, "create");
                Err(err)
            }
        }
    }

    /// `Ok(None)` when no record has `id`.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn get<C>(db: &C, id: R::IdType) -> Result<Option<R>, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_SINGULAR;
        debug!(resource, id = ?id, "get");
        let result: Result<Option<R::ModelType>, CrudError> = async {
            let txn = begin(db).await?;
            let outcome = R::fetch_one(&txn, id.clone())
                .await
                .map_err(CrudError::from);
            finish(txn, outcome).await
        }
        .await;

        match result {
            Ok(Some(model)) => Ok(Some(model.into())),
            Ok(None) => {
                warn!(resource, id = ?id, "not found");
                Ok(None)
            }
            Err(err) => {
                err.log(resource, "get");
                Err(err)
            }
        }
    }

    /// Filtered, sorted page plus the total number of matching rows.
    ///
    /// Count and page are read in the same transaction.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` for malformed criteria, store errors otherwise.
    pub async fn list<C>(db: &C, query: &ListQuery) -> Result<ListPage<R>, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_PLURAL;
        debug!(resource, query = ?query, "list");
        let result: Result<ListPage<R>, CrudError> = async {
            let plan = ListPlan::build::<R>(query)?;
            let txn = begin(db).await?;
            let outcome: Result<_, CrudError> = async {
                let total_count = R::count_matching(&txn, plan.condition.clone()).await?;
                let mut rows = R::fetch_page(
                    &txn,
                    plan.page_condition(),
                    plan.order(),
                    plan.offset,
                    plan.limit + 1,
                )
                .await?;
                let limit = usize::try_from(plan.limit).unwrap_or(usize::MAX);
                let has_more = rows.len() > limit;
                rows.truncate(limit);
                Ok((total_count, has_more, rows))
            }
            .await;
            let (total_count, has_more, rows) = finish(txn, outcome).await?;
            let next_cursor = if has_more {
                rows.last().and_then(|last| plan.next_cursor::<R>(last))
            } else {
                None
            };
            Ok(ListPage {
                items: rows.into_iter().map(Into::into).collect(),
                total_count,
                has_more,
                next_cursor,
            })
        }
        .await;

        match result {
            Ok(page) => {
                info!(
                    resource,
                    returned = page.items.len(),
                    total = page.total_count,
                    "listed"
                );
                Ok(page)
            }
            Err(err) => {
                err.log(resource, "list");
                Err(err)
            }
        }
    }

    /// Number of rows matching the filters of `query`. Sort and pagination
    /// are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` for malformed criteria, store errors otherwise.
    pub async fn count<C>(db: &C, query: &ListQuery) -> Result<u64, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_PLURAL;
        debug!(resource, query = ?query, "count");
        let result: Result<u64, CrudError> = async {
            let plan = ListPlan::build::<R>(query)?;
            let txn = begin(db).await?;
            let outcome = R::count_matching(&txn, plan.condition)
                .await
                .map_err(CrudError::from);
            finish(txn, outcome).await
        }
        .await;

        result.inspect_err(|err| err.log(resource, "count"))
    }

    /// Applies the fields present in `patch`. An empty patch writes nothing
    /// and returns the current record.
    ///
    /// # Errors
    ///
    /// `Validation` when the patch fails validation or nulls a required
    /// field, `Conflict` on a uniqueness violation, store errors otherwise.
    pub async fn update<C>(
        db: &C,
        id: R::IdType,
        patch: R::UpdateModel,
    ) -> Result<Option<R>, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_SINGULAR;
        debug!(resource, id = ?id, "update");
        let result: Result<Option<R::ModelType>, CrudError> = async {
            patch.validate()?;
            let txn = begin(db).await?;
            let outcome: Result<Option<R::ModelType>, CrudError> = async {
                let Some(existing) = R::fetch_one(&txn, id.clone()).await? else {
                    return Ok(None);
                };
                if patch.is_empty() {
                    return Ok(Some(existing));
                }
                let merged = patch.merge_into_activemodel(existing.into_active_model())?;
                Ok(Some(R::update_one(&txn, merged).await?))
            }
            .await;
            finish(txn, outcome).await
        }
        .await;

        match result {
            Ok(Some(model)) => {
                info!(resource, id = ?id, "updated");
                Ok(Some(model.into()))
            }
            Ok(None) => {
                warn!(resource, id = ?id, "not found");
                Ok(None)
            }
            Err(err) => {
                err.log(resource, "update");
                Err(err)
            }
        }
    }

    /// `Ok(true)` when a row was removed, `Ok(false)` when none had `id`.
    ///
    /// # Errors
    ///
    /// `Conflict` when a foreign key still references the row, store errors
    /// otherwise.
    pub async fn delete<C>(db: &C, id: R::IdType) -> Result<bool, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_SINGULAR;
        debug!(resource, id = ?id, "delete");
        let result: Result<bool, CrudError> = async {
            let txn = begin(db).await?;
            let outcome = R::delete_one(&txn, id.clone())
                .await
                .map_err(CrudError::from);
            finish(txn, outcome).await
        }
        .await;

        match result {
            Ok(true) => {
                info!(resource, id = ?id, "deleted");
                Ok(true)
            }
            Ok(false) => {
                warn!(resource, id = ?id, "not found");
                Ok(false)
            }
            Err(err) => {
                err.log(resource, "delete");
                Err(err)
            }
        }
    }

    /// Deletes every row whose identity is in `ids`; returns how many went.
    ///
    /// # Errors
    ///
    /// Store errors only.
    pub async fn delete_many<C>(db: &C, ids: Vec<R::IdType>) -> Result<u64, CrudError>
    where
        C: TransactionTrait,
    {
        let resource = R::RESOURCE_NAME_PLURAL;
        debug!(resource, requested = ids.len(), "delete_many");
        let result: Result<u64, CrudError> = async {
            let txn = begin(db).await?;
            let outcome = R::delete_many(&txn, ids).await.map_err(CrudError::from);
            finish(txn, outcome).await
        }
        .await;

        result
            .inspect(|deleted| info!(resource, deleted, "deleted many"))
            .inspect_err(|err| err.log(resource, "delete_many"))
    }
}
