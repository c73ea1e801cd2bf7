use crate::validation::{Validatable, ValidationErrors};
use async_trait::async_trait;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, ModelTrait, Order, PaginatorTrait,
    PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect, Value,
};
use std::fmt::Debug;

/// Applies a partial patch to a loaded active model.
///
/// Generated by `#[derive(ToUpdateModel)]`; hand-written impls must leave
/// omitted fields `NotSet`.
pub trait MergeIntoActiveModel<ActiveModelType> {
    /// # Errors
    ///
    /// Returns `ValidationErrors` when the patch nulls a non-nullable field.
    fn merge_into_activemodel(
        self,
        existing: ActiveModelType,
    ) -> Result<ActiveModelType, ValidationErrors>;

    /// True when the patch carries no field at all.
    fn is_empty(&self) -> bool;
}

/// Binds a Read schema to its record model and its Create/Update schemas.
///
/// Implemented once per entity, on the Read schema. The provided async
/// methods are the single-statement building blocks; `CrudBase` wraps them in
/// validation, transactions and logging.
#[async_trait]
pub trait CrudResource: Sized + Send + Sync + 'static {
    type EntityType: EntityTrait<
            Model = Self::ModelType,
            ActiveModel = Self::ActiveModelType,
            Column = Self::ColumnType,
        > + Sync;
    type ModelType: ModelTrait<Entity = Self::EntityType>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModelType>
        + Into<Self>
        + Send
        + Sync
        + 'static;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>
        + ActiveModelBehavior
        + Send
        + Sync
        + 'static;
    type ColumnType: ColumnTrait + Copy + Debug + Send + Sync;
    type IdType: Into<<<Self::EntityType as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType>
        + Into<Value>
        + Clone
        + Debug
        + Send
        + Sync
        + 'static;
    type CreateModel: Into<Self::ActiveModelType> + Validatable + Send + Sync;
    type UpdateModel: MergeIntoActiveModel<Self::ActiveModelType> + Validatable + Send + Sync;

    const ID_COLUMN: Self::ColumnType;
    /// Name of the identity in filters, sorts and cursors.
    const ID_FIELD: &'static str = "id";
    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    async fn fetch_one<C>(db: &C, id: Self::IdType) -> Result<Option<Self::ModelType>, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::EntityType::find_by_id(id).one(db).await
    }

    /// Rows matching `condition`, ordered by each `(column, order, nulls)` in turn.
    async fn fetch_page<C>(
        db: &C,
        condition: Condition,
        order: Vec<(Self::ColumnType, Order, NullOrdering)>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self::ModelType>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = Self::EntityType::find().filter(condition);
        for (column, direction, nulls) in order {
            query = query.order_by_with_nulls(column, direction, nulls);
        }
        query.offset(offset).limit(limit).all(db).await
    }

    async fn count_matching<C>(db: &C, condition: Condition) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        PaginatorTrait::count(Self::EntityType::find().filter(condition), db).await
    }

    async fn insert_one<C>(db: &C, active: Self::ActiveModelType) -> Result<Self::ModelType, DbErr>
    where
        C: ConnectionTrait,
    {
        active.insert(db).await
    }

    async fn update_one<C>(db: &C, active: Self::ActiveModelType) -> Result<Self::ModelType, DbErr>
    where
        C: ConnectionTrait,
    {
        active.update(db).await
    }

    /// True when a row was removed.
    async fn delete_one<C>(db: &C, id: Self::IdType) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let res = Self::EntityType::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_many<C>(db: &C, ids: Vec<Self::IdType>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = Self::EntityType::delete_many()
            .filter(Self::ID_COLUMN.is_in(ids))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    /// Fields accepted in list filters. Anything else is an invalid filter.
    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![(Self::ID_FIELD, Self::ID_COLUMN)]
    }

    /// Fields accepted as a sort key.
    #[must_use]
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)> {
        vec![(Self::ID_FIELD, Self::ID_COLUMN)]
    }
}
