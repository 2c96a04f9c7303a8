use std::sync::Arc;

use argon2::Argon2;
use configs::PasswordConfig;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::pagination::Pagination;
use crate::password;

use super::domain::{ChangePasswordInput, CreateUserInput, PasswordChanged, UpdateUserInput, UserView};
use super::errors::UserError;
use super::repository::UserRepository;

pub const CONFIRM_MISMATCH: &str = "Confirm Password and Password not match.";
pub const NEW_CONFIRM_MISMATCH: &str = "Confirm Password and New Password not match.";

/// User-account business service independent of web framework
pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    argon: Argon2<'static>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>, cfg: &PasswordConfig) -> Result<Self, UserError> {
        Ok(Self { repo, argon: password::hasher(cfg)? })
    }

    /// List every user without password material.
    pub async fn get_users(&self) -> Result<Vec<UserView>, UserError> {
        let users = self.repo.list().await?;
        Ok(users.iter().map(UserView::from).collect())
    }

    /// One page of users, oldest first.
    pub async fn get_users_page(&self, page: Pagination) -> Result<Vec<UserView>, UserError> {
        let (page_idx, per_page) = page.normalize();
        let users = self.repo.list_page(page_idx, per_page).await?;
        Ok(users.iter().map(UserView::from).collect())
    }

    /// `None` when the user does not exist.
    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserView>, UserError> {
        Ok(self.repo.get(id).await?.as_ref().map(UserView::from))
    }

    /// Create an account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::users::{UserService, repository::mock::MockUserRepository};
    /// use service::users::domain::CreateUserInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let svc = UserService::new(repo, &configs::PasswordConfig::default()).unwrap();
    /// let input = CreateUserInput {
    ///     name: "Ada".into(),
    ///     email: "ada@example.com".into(),
    ///     password: "secret1".into(),
    ///     confirm_password: "secret1".into(),
    /// };
    /// let user = tokio_test::block_on(svc.create_user(input)).unwrap();
    /// assert_eq!(user.email, "ada@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<UserView, UserError> {
        if input.password != input.confirm_password {
            return Err(UserError::PasswordMismatch(CONFIRM_MISMATCH.into()));
        }
        if self.repo.email_exists(&input.email).await? {
            debug!("email already registered");
            return Err(UserError::EmailTaken);
        }

        let hash = password::hash_password(&self.argon, &input.password)?;
        let user = self.repo.create(&input.name, &input.email, &hash).await?;
        info!(user_id = %user.id, "user_created");
        Ok(UserView::from(&user))
    }

    /// Replace the password after checking the old one.
    ///
    /// Returns `None` when the user is missing or `old_password` does not
    /// match. The confirmation is only compared after the old password passed.
    #[instrument(skip(self, input), fields(user_id = %id))]
    pub async fn change_password(&self, id: Uuid, input: ChangePasswordInput) -> Result<Option<PasswordChanged>, UserError> {
        let Some(user) = self.repo.get(id).await? else {
            debug!("user not found");
            return Ok(None);
        };

        if !password::verify_password(&self.argon, &input.old_password, &user.password_hash) {
            warn!("old password mismatch");
            return Ok(None);
        }

        if input.new_password != input.confirm_password {
            return Err(UserError::PasswordMismatch(NEW_CONFIRM_MISMATCH.into()));
        }

        let hash = password::hash_password(&self.argon, &input.new_password)?;
        if !self.repo.change_password(id, &hash).await? {
            debug!("user vanished before password update");
            return Ok(None);
        }

        info!("password_changed");
        Ok(Some(PasswordChanged { email: user.email, id: user.id }))
    }

    /// Update name and email. `false` when the user does not exist.
    #[instrument(skip(self, input), fields(user_id = %id, email = %input.email))]
    pub async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> Result<bool, UserError> {
        if self.repo.get(id).await?.is_none() {
            debug!("user not found");
            return Ok(false);
        }

        if let Some(holder) = self.repo.find_by_email(&input.email).await? {
            if holder.id != id {
                debug!(holder_id = %holder.id, "email held by another user");
                return Err(UserError::EmailTaken);
            }
        }

        let updated = self.repo.update(id, &input.name, &input.email).await?;
        if updated {
            info!("user_updated");
        }
        Ok(updated)
    }

    /// `false` when the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, UserError> {
        if self.repo.get(id).await?.is_none() {
            debug!("user not found");
            return Ok(false);
        }
        let deleted = self.repo.delete(id).await?;
        if deleted {
            info!("user_deleted");
        }
        Ok(deleted)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        self.repo.email_exists(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repository::mock::MockUserRepository;

    fn cheap_config() -> PasswordConfig {
        PasswordConfig { memory_kib: 1024, iterations: 1, parallelism: 1 }
    }

    fn svc() -> (Arc<MockUserRepository>, UserService<MockUserRepository>) {
        let repo = Arc::new(MockUserRepository::default());
        let svc = UserService::new(repo.clone(), &cheap_config()).unwrap();
        (repo, svc)
    }

    fn create_input(email: &str, password: &str) -> CreateUserInput {
        CreateUserInput {
            name: "Ada".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    fn change_input(old: &str, new: &str, confirm: &str) -> ChangePasswordInput {
        ChangePasswordInput { old_password: old.into(), new_password: new.into(), confirm_password: confirm.into() }
    }

    #[tokio::test]
    async fn create_hashes_password_and_hides_it() {
        let (repo, svc) = svc();
        let view = svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        assert_eq!(view.name, "Ada");

        let stored = repo.stored(view.id).unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2id$"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn create_rejects_mismatched_confirmation() {
        let (_, svc) = svc();
        let mut input = create_input("ada@example.com", "secret1");
        input.confirm_password = "secret2".into();
        let err = svc.create_user(input).await.unwrap_err();
        assert!(matches!(err, UserError::PasswordMismatch(ref m) if m == CONFIRM_MISMATCH));
        assert!(!svc.email_exists("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let (_, svc) = svc();
        svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        let err = svc.create_user(create_input("ada@example.com", "secret9")).await.unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
        assert_eq!(svc.get_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirm_mismatch_is_reported_before_taken_email() {
        let (_, svc) = svc();
        svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        let mut input = create_input("ada@example.com", "secret1");
        input.confirm_password = "secret2".into();
        let err = svc.create_user(input).await.unwrap_err();
        assert!(matches!(err, UserError::PasswordMismatch(ref m) if m == CONFIRM_MISMATCH));
    }

    #[tokio::test]
    async fn get_user_and_list_project_views() {
        let (_, svc) = svc();
        let a = svc.create_user(create_input("a@example.com", "secret1")).await.unwrap();
        let b = svc.create_user(create_input("b@example.com", "secret1")).await.unwrap();

        assert_eq!(svc.get_user(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(svc.get_user(Uuid::new_v4()).await.unwrap(), None);
        assert_eq!(svc.get_users().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn paging_normalizes_input() {
        let (_, svc) = svc();
        for i in 0..5 {
            svc.create_user(create_input(&format!("u{i}@example.com"), "secret1")).await.unwrap();
        }
        let first = svc.get_users_page(Pagination::new(0, 2)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].email, "u0@example.com");
        let last = svc.get_users_page(Pagination::new(3, 2)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].email, "u4@example.com");
        let beyond = svc.get_users_page(Pagination::new(9, 2)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn change_password_happy_path() {
        let (repo, svc) = svc();
        let user = svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        let before = repo.stored(user.id).unwrap().password_hash;

        let changed = svc.change_password(user.id, change_input("secret1", "secret2", "secret2")).await.unwrap();
        assert_eq!(changed, Some(PasswordChanged { email: "ada@example.com".into(), id: user.id }));

        let after = repo.stored(user.id).unwrap().password_hash;
        assert_ne!(before, after);

        // old password no longer works, new one does
        let again = svc.change_password(user.id, change_input("secret1", "secret3", "secret3")).await.unwrap();
        assert_eq!(again, None);
        let again = svc.change_password(user.id, change_input("secret2", "secret3", "secret3")).await.unwrap();
        assert!(again.is_some());
    }

    #[tokio::test]
    async fn change_password_unknown_user_is_none() {
        let (_, svc) = svc();
        let res = svc.change_password(Uuid::new_v4(), change_input("secret1", "secret2", "secret2")).await.unwrap();
        assert_eq!(res, None);
    }

    #[tokio::test]
    async fn wrong_old_password_wins_over_confirm_mismatch() {
        let (repo, svc) = svc();
        let user = svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        let before = repo.stored(user.id).unwrap().password_hash;

        let res = svc.change_password(user.id, change_input("wrong-old", "secret2", "other")).await.unwrap();
        assert_eq!(res, None);
        assert_eq!(repo.stored(user.id).unwrap().password_hash, before);
    }

    #[tokio::test]
    async fn confirm_mismatch_after_old_password_is_error() {
        let (repo, svc) = svc();
        let user = svc.create_user(create_input("ada@example.com", "secret1")).await.unwrap();
        let before = repo.stored(user.id).unwrap().password_hash;

        let err = svc.change_password(user.id, change_input("secret1", "secret2", "secret3")).await.unwrap_err();
        assert!(matches!(err, UserError::PasswordMismatch(ref m) if m == NEW_CONFIRM_MISMATCH));
        assert_eq!(err.error_type(), "INVALID_PASSWORD");
        assert_eq!(repo.stored(user.id).unwrap().password_hash, before);
    }

    #[tokio::test]
    async fn update_user_flows() {
        let (_, svc) = svc();
        let a = svc.create_user(create_input("a@example.com", "secret1")).await.unwrap();
        let b = svc.create_user(create_input("b@example.com", "secret1")).await.unwrap();

        // unknown id
        let missing = svc.update_user(Uuid::new_v4(), UpdateUserInput { name: "X".into(), email: "x@example.com".into() }).await.unwrap();
        assert!(!missing);

        // keeping one's own email is fine
        assert!(svc.update_user(a.id, UpdateUserInput { name: "Alice".into(), email: "a@example.com".into() }).await.unwrap());
        assert_eq!(svc.get_user(a.id).await.unwrap().unwrap().name, "Alice");

        // taking someone else's is not
        let err = svc.update_user(a.id, UpdateUserInput { name: "Alice".into(), email: "b@example.com".into() }).await.unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));
        assert_eq!(svc.get_user(b.id).await.unwrap().unwrap().email, "b@example.com");

        assert!(svc.update_user(a.id, UpdateUserInput { name: "Alice".into(), email: "alice@example.com".into() }).await.unwrap());
        assert!(svc.email_exists("alice@example.com").await.unwrap());
        assert!(!svc.email_exists("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn delete_user_flows() {
        let (_, svc) = svc();
        let a = svc.create_user(create_input("a@example.com", "secret1")).await.unwrap();
        assert!(svc.delete_user(a.id).await.unwrap());
        assert!(svc.get_user(a.id).await.unwrap().is_none());
        assert!(!svc.delete_user(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn repository_failures_propagate() {
        let (repo, svc) = svc();
        let a = svc.create_user(create_input("a@example.com", "secret1")).await.unwrap();
        repo.set_unavailable(true);

        assert!(matches!(svc.get_users().await, Err(UserError::Repository(_))));
        assert!(matches!(svc.delete_user(a.id).await, Err(UserError::Repository(_))));
        let err = svc.create_user(create_input("b@example.com", "secret1")).await.unwrap_err();
        assert_eq!(err.code(), 1200);

        repo.set_unavailable(false);
        assert_eq!(svc.get_users().await.unwrap().len(), 1);
    }
}
