use chrono::{DateTime, Utc};
use crudbase::validators::{validate_email, validate_length, validate_required};
use crudbase::{CrudResource, ToCreateModel, ToUpdateModel, Validatable, ValidationErrors};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USERNAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A user as callers see it.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, ToCreateModel, ToUpdateModel,
)]
#[active_model = "ActiveModel"]
pub struct User {
    #[crudbase(create_model = false, update_model = false)]
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[crudbase(on_create = true)]
    pub is_active: bool,
    #[crudbase(create_model = false, update_model = false, on_create = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[crudbase(create_model = false, update_model = false, on_update = Utc::now())]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            bio: model.bio,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn check_username(errors: &mut ValidationErrors, username: &str) {
    errors.check(validate_required("username", username));
    errors.check(validate_length("username", username, ..=USERNAME_MAX_LEN));
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    errors.check(validate_email("email", email));
    errors.check(validate_length("email", email, ..=EMAIL_MAX_LEN));
}

impl Validatable for UserCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_username(&mut errors, &self.username);
        check_email(&mut errors, &self.email);
        errors.result()
    }
}

// Explicit nulls on required fields are rejected while merging.
impl Validatable for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(Some(username)) = &self.username {
            check_username(&mut errors, username);
        }
        if let Some(Some(email)) = &self.email {
            check_email(&mut errors, email);
        }
        errors.result()
    }
}

impl CrudResource for User {
    type EntityType = Entity;
    type ModelType = Model;
    type ActiveModelType = ActiveModel;
    type ColumnType = Column;
    type IdType = i32;
    type CreateModel = UserCreate;
    type UpdateModel = UserUpdate;

    const ID_COLUMN: Column = Column::Id;
    const RESOURCE_NAME_SINGULAR: &'static str = "user";
    const RESOURCE_NAME_PLURAL: &'static str = "users";

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("username", Column::Username),
            ("email", Column::Email),
            ("full_name", Column::FullName),
            ("bio", Column::Bio),
            ("is_active", Column::IsActive),
            ("created_at", Column::CreatedAt),
            ("updated_at", Column::UpdatedAt),
        ]
    }

    fn sortable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("username", Column::Username),
            ("email", Column::Email),
            ("full_name", Column::FullName),
            ("created_at", Column::CreatedAt),
            ("updated_at", Column::UpdatedAt),
        ]
    }
}
