//! Small entity used by unit tests that render SQL or run against in-memory SQLite.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub score: Option<i32>,
    pub ratio: f64,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub token: Uuid,
    pub payload: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub score: Option<i32>,
    pub ratio: f64,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub token: Uuid,
}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            score: model.score,
            ratio: model.ratio,
            active: model.active,
            created_at: model.created_at,
            token: model.token,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ItemCreate {
    pub name: String,
    pub score: Option<i32>,
}

impl From<ItemCreate> for ActiveModel {
    fn from(create: ItemCreate) -> Self {
        Self {
            id: sea_orm::ActiveValue::NotSet,
            name: sea_orm::ActiveValue::Set(create.name),
            score: sea_orm::ActiveValue::Set(create.score),
            ratio: sea_orm::ActiveValue::Set(0.5),
            active: sea_orm::ActiveValue::Set(true),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now()),
            token: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            payload: sea_orm::ActiveValue::Set(None),
        }
    }
}

impl crate::Validatable for ItemCreate {
    fn validate(&self) -> Result<(), crate::ValidationErrors> {
        let mut errors = crate::ValidationErrors::new();
        errors.check(crate::validators::validate_required("name", &self.name));
        errors.result()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ItemUpdate {
    pub name: Option<Option<String>>,
    pub score: Option<Option<i32>>,
}

impl crate::MergeIntoActiveModel<ActiveModel> for ItemUpdate {
    fn merge_into_activemodel(
        self,
        mut model: ActiveModel,
    ) -> Result<ActiveModel, crate::ValidationErrors> {
        match self.name {
            Some(Some(name)) => model.name = sea_orm::ActiveValue::Set(name),
            Some(None) => {
                return Err(crate::ValidationError::new("name", "cannot be null").into());
            }
            None => {}
        }
        if let Some(score) = self.score {
            model.score = sea_orm::ActiveValue::Set(score);
        }
        Ok(model)
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.score.is_none()
    }
}

impl crate::Validatable for ItemUpdate {}

impl crate::CrudResource for Item {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;
    type ColumnType = Column;
    type IdType = i32;
    type CreateModel = ItemCreate;
    type UpdateModel = ItemUpdate;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "item";
    const RESOURCE_NAME_PLURAL: &'static str = "items";

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("score", Column::Score),
            ("ratio", Column::Ratio),
            ("active", Column::Active),
            ("created_at", Column::CreatedAt),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("score", Column::Score),
            ("created_at", Column::CreatedAt),
        ]
    }
}

/// Fresh in-memory database with the `items` table.
pub async fn setup() -> sea_orm::DatabaseConnection {
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, Schema};

    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(Entity);
    db.execute(backend.build(&stmt)).await.unwrap();
    db
}
