use sea_orm::{
    entity::prelude::*, sea_query::Expr, DatabaseConnection, PaginatorTrait, QueryOrder, Set,
};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const NAME_MAX_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if !email.contains('@') { return Err(ModelError::Validation("invalid email".into())); }
    Ok(())
}

/// Same bounds as the request schema: 1..=100 characters, whitespace counts.
pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.chars().count() > NAME_MAX_CHARS { return Err(ModelError::Validation("name too long".into())); }
    Ok(())
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::CreatedAt).all(db).await?)
}

/// `page_idx` is 0-based.
pub async fn list_page(db: &DatabaseConnection, page_idx: u64, per_page: u64) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await?)
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn email_exists(db: &DatabaseConnection, email: &str) -> Result<bool, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).count(db).await? > 0)
}

pub async fn create(db: &DatabaseConnection, name: &str, email: &str, password_hash: &str) -> Result<Model, ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Returns `false` when no row has this id.
pub async fn update_profile(db: &DatabaseConnection, id: Uuid, name: &str, email: &str) -> Result<bool, ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    let res = Entity::update_many()
        .col_expr(Column::Name, Expr::value(name))
        .col_expr(Column::Email, Expr::value(email))
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Returns `false` when no row has this id.
pub async fn update_password(db: &DatabaseConnection, id: Uuid, password_hash: &str) -> Result<bool, ModelError> {
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let res = Entity::update_many()
        .col_expr(Column::PasswordHash, Expr::value(password_hash))
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Returns `false` when no row has this id.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
