use std::sync::Arc;

use configs::AppConfig;
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use models::user;

use crate::users::domain::User;
use crate::users::errors::UserError;
use crate::users::repository::UserRepository;
use crate::users::UserService;

/// SeaORM-backed repository implementation.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

impl UserService<SeaOrmUserRepository> {
    /// Connect using `[database]` and hash with `[password]`.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let db = models::db::connect_with_config(&cfg.database).await?;
        let svc = UserService::new(Arc::new(SeaOrmUserRepository::new(db)), &cfg.password)?;
        info!(memory_kib = cfg.password.memory_kib, iterations = cfg.password.iterations, "user service ready");
        Ok(svc)
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserError> {
        let rows = user::list(&self.db).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<Vec<User>, UserError> {
        let rows = user::list_page(&self.db, page_idx, per_page).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, UserError> {
        Ok(user::find(&self.db, id).await?.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(user::find_by_email(&self.db, email).await?.map(User::from))
    }

    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, UserError> {
        Ok(user::create(&self.db, name, email, password_hash).await?.into())
    }

    async fn change_password(&self, id: Uuid, password_hash: &str) -> Result<bool, UserError> {
        Ok(user::update_password(&self.db, id, password_hash).await?)
    }

    async fn update(&self, id: Uuid, name: &str, email: &str) -> Result<bool, UserError> {
        Ok(user::update_profile(&self.db, id, name, email).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserError> {
        Ok(user::delete(&self.db, id).await?)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        Ok(user::email_exists(&self.db, email).await?)
    }
}
