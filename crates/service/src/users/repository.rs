use async_trait::async_trait;
use uuid::Uuid;

use super::domain::User;
use super::errors::UserError;

/// Repository abstraction over the user store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, UserError>;
    /// `page_idx` is 0-based.
    async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<Vec<User>, UserError>;
    async fn get(&self, id: Uuid) -> Result<Option<User>, UserError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, UserError>;
    /// `false` when no user has this id.
    async fn change_password(&self, id: Uuid, password_hash: &str) -> Result<bool, UserError>;
    /// `false` when no user has this id.
    async fn update(&self, id: Uuid, name: &str, email: &str) -> Result<bool, UserError>;
    /// `false` when no user has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, UserError>;
    async fn email_exists(&self, email: &str) -> Result<bool, UserError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<User>>, // insertion order
        unavailable: AtomicBool,
    }

    impl MockUserRepository {
        /// Make every call fail as if the store were down.
        pub fn set_unavailable(&self, down: bool) {
            self.unavailable.store(down, Ordering::SeqCst);
        }

        /// Raw stored row, hash included.
        pub fn stored(&self, id: Uuid) -> Option<User> {
            self.users.lock().ok()?.iter().find(|u| u.id == id).cloned()
        }

        fn users(&self) -> Result<MutexGuard<'_, Vec<User>>, UserError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(UserError::Repository("store unavailable".into()));
            }
            self.users.lock().map_err(|_| UserError::Repository("store poisoned".into()))
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn list(&self) -> Result<Vec<User>, UserError> {
            Ok(self.users()?.clone())
        }

        async fn list_page(&self, page_idx: u64, per_page: u64) -> Result<Vec<User>, UserError> {
            let users = self.users()?;
            let skip = page_idx.saturating_mul(per_page) as usize;
            Ok(users.iter().skip(skip).take(per_page as usize).cloned().collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<User>, UserError> {
            Ok(self.users()?.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
            Ok(self.users()?.iter().find(|u| u.email == email).cloned())
        }

        async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User, UserError> {
            let mut users = self.users()?;
            if users.iter().any(|u| u.email == email) {
                return Err(UserError::EmailTaken);
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn change_password(&self, id: Uuid, password_hash: &str) -> Result<bool, UserError> {
            let mut users = self.users()?;
            match users.iter_mut().find(|u| u.id == id) {
                Some(u) => {
                    u.password_hash = password_hash.to_string();
                    u.updated_at = Utc::now();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn update(&self, id: Uuid, name: &str, email: &str) -> Result<bool, UserError> {
            let mut users = self.users()?;
            if users.iter().any(|u| u.email == email && u.id != id) {
                return Err(UserError::EmailTaken);
            }
            match users.iter_mut().find(|u| u.id == id) {
                Some(u) => {
                    u.name = name.to_string();
                    u.email = email.to_string();
                    u.updated_at = Utc::now();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: Uuid) -> Result<bool, UserError> {
            let mut users = self.users()?;
            let before = users.len();
            users.retain(|u| u.id != id);
            Ok(users.len() < before)
        }

        async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
            Ok(self.users()?.iter().any(|u| u.email == email))
        }
    }
}
