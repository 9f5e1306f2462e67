use crate::auth::rbac::Role;
use crate::error::ApiError;
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserRepository;
use crate::utils::crypto::{hash_password, verify_password};
use std::sync::Arc;
use uuid::Uuid;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Credential checks and account management on top of the user store.
pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { user_repo }
    }

    /// Verify a username/password pair. Unknown users and wrong passwords
    /// produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            tracing::info!(username = %username, "Login attempt for unknown user");
            return Err(ApiError::authentication(INVALID_CREDENTIALS));
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(username = %username, "Login attempt with wrong password");
            return Err(ApiError::authentication(INVALID_CREDENTIALS));
        }

        tracing::info!(username = %user.username, role = %user.role, "User logged in");
        Ok(user)
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        let user = self
            .user_repo
            .create(NewUser {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                role,
            })
            .await?;

        tracing::info!(username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Apply the given changes, hashing a new password if one is supplied.
    pub async fn update_user(
        &self,
        id: Uuid,
        username: Option<String>,
        password: Option<String>,
        role: Option<Role>,
    ) -> Result<Option<User>, ApiError> {
        let password_hash = password.as_deref().map(hash_password).transpose()?;

        self.user_repo
            .update(
                id,
                UserChanges {
                    username,
                    password_hash,
                    role,
                },
            )
            .await
    }

    /// Create the configured admin account unless a user of that name exists.
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, ApiError> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            tracing::debug!(username = %username, "Bootstrap admin already present");
            return Ok(false);
        }

        match self.create_user(username, password, Role::Admin).await {
            Ok(_) => {
                tracing::info!(username = %username, "Bootstrap admin created");
                Ok(true)
            }
            // Another instance won the race
            Err(ApiError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryUserRepository::new()))
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let auth = service();
        auth.create_user("b", "pw-b", Role::Nurse).await.unwrap();

        let user = auth.login("b", "pw-b").await.unwrap();
        assert_eq!(user.role, Role::Nurse);

        for (username, password) in [("b", "wrong"), ("nobody", "pw-b")] {
            let err = auth.login(username, password).await.unwrap_err();
            assert!(matches!(err, ApiError::Authentication(ref m) if m == INVALID_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn test_passwords_are_hashed() {
        let auth = service();
        let user = auth.create_user("a", "secret", Role::Admin).await.unwrap();
        assert_ne!(user.password_hash, "secret");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_update_password() {
        let auth = service();
        let user = auth.create_user("b", "old", Role::Nurse).await.unwrap();

        auth.update_user(user.id, None, Some("new".into()), None)
            .await
            .unwrap()
            .unwrap();

        assert!(auth.login("b", "old").await.is_err());
        assert!(auth.login("b", "new").await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let auth = service();
        assert!(auth.ensure_bootstrap_admin("root", "pw").await.unwrap());
        assert!(!auth.ensure_bootstrap_admin("root", "other").await.unwrap());

        let user = auth.login("root", "pw").await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }
}
