use chrono::Utc;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::validate::{FieldError, ValidationError, ValidationKind};
use crate::auth::{self, AuthError};
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, User};
use crate::database::UserStore;
use crate::middleware::CurrentUser;
use crate::services::ServiceError;

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

/// Hashed once per service and verified against when the username is unknown
const DUMMY_PASSWORD: &str = "tareas-unknown-user-placeholder";

/// Token returned by a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self { id: user.id, username: user.username.clone() }
    }
}

/// Registration, login and bearer token resolution
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    security: SecurityConfig,
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, security: SecurityConfig) -> Self {
        Self {
            store,
            security,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn registration_enabled(&self) -> bool {
        self.security.allow_registration
    }

    /// Public sign-up; honours `allow_registration`
    pub async fn register(&self, username: &str, password: &str) -> Result<UserSummary, ServiceError> {
        if !self.security.allow_registration {
            return Err(ServiceError::RegistrationDisabled);
        }
        let user = self.create_user(username, password).await?;
        Ok(UserSummary::from(&user))
    }

    /// Unconditional creation, used by the admin CLI
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        let username = check_credentials(username, password)?;

        let user = self
            .store
            .insert_user(NewUser {
                username,
                password_hash: self.hash(password).await?,
                created_at: Utc::now(),
            })
            .await?;

        info!("Registered user '{}' (id {})", user.username, user.id);
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, ServiceError> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            // Unknown users pay the same bcrypt cost as known ones
            let dummy = self.dummy_hash().await?;
            let _ = self.verify(password, dummy).await;
            warn!("Login failed for unknown user '{}'", username);
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.verify(password, user.password_hash.clone()).await? {
            warn!("Login failed for user '{}': bad password", user.username);
            return Err(ServiceError::InvalidCredentials);
        }

        self.grant(&user)
    }

    /// Issue a token without a password, used by the admin CLI
    pub async fn token_for(&self, username: &str) -> Result<LoginGrant, ServiceError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(ServiceError::NotFound)?;
        self.grant(&user)
    }

    /// Resolve a bearer token to a live user
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, ServiceError> {
        let claims = auth::decode_token(&self.security, token).map_err(|e| match e {
            AuthError::InvalidSecret => ServiceError::Auth(e),
            _ => ServiceError::Unauthenticated,
        })?;

        let user = self
            .store
            .find_user(claims.user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        Ok(CurrentUser { id: user.id, username: user.username })
    }

    /// Removes the user and, through the cascade, all of their tareas
    pub async fn delete_user(&self, username: &str) -> Result<(), ServiceError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if !self.store.delete_user(user.id).await? {
            return Err(ServiceError::NotFound);
        }
        info!("Deleted user '{}' (id {}) and their tareas", user.username, user.id);
        Ok(())
    }

    /// bcrypt is CPU bound; run it off the async workers
    async fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let password = password.to_string();
        let cost = self.security.password_hash_cost;
        let hashed = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;
        Ok(hashed)
    }

    async fn verify(&self, password: &str, stored: String) -> Result<bool, ServiceError> {
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;
        Ok(matches)
    }

    async fn dummy_hash(&self) -> Result<String, ServiceError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }
        let hash = self.hash(DUMMY_PASSWORD).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    fn grant(&self, user: &User) -> Result<LoginGrant, ServiceError> {
        let token = auth::issue_token(&self.security, user)?;
        Ok(LoginGrant {
            token,
            token_type: "Bearer",
            expires_in: self.security.jwt_expiry_hours * 3600,
            user: UserSummary::from(user),
        })
    }
}

fn check_credentials(username: &str, password: &str) -> Result<String, ValidationError> {
    let mut errors = Vec::new();
    let username = username.trim();

    if username.is_empty() {
        errors.push(FieldError::new("username", ValidationKind::EmptyField, "Este campo no puede estar vacío."));
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        errors.push(FieldError::new(
            "username",
            ValidationKind::TooLong,
            format!("Asegúrese de que este campo no tenga más de {} caracteres.", USERNAME_MAX_CHARS),
        ));
    } else if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        errors.push(FieldError::new(
            "username",
            ValidationKind::BadType,
            "Solo se permiten letras, números y los caracteres @/./+/-/_",
        ));
    }

    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password",
            ValidationKind::TooShort,
            format!("La contraseña debe tener al menos {} caracteres.", PASSWORD_MIN_CHARS),
        ));
    }

    if errors.is_empty() {
        Ok(username.to_string())
    } else {
        Err(ValidationError { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn service(allow_registration: bool) -> UserService {
        let mut security = AppConfig::development().security;
        security.allow_registration = allow_registration;
        security.password_hash_cost = 4;
        UserService::new(Arc::new(MemoryStore::new()), security)
    }

    #[tokio::test]
    async fn register_then_login_then_authenticate() {
        let users = service(true);
        let summary = users.register("ana", "password123").await.unwrap();
        assert_eq!(summary.username, "ana");

        let grant = users.login("ana", "password123").await.unwrap();
        assert_eq!(grant.token_type, "Bearer");
        assert_eq!(grant.user.id, summary.id);

        let current = users.authenticate(&grant.token).await.unwrap();
        assert_eq!(current, CurrentUser { id: summary.id, username: "ana".to_string() });
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_alike() {
        let users = service(true);
        users.register("ana", "password123").await.unwrap();

        let bad_password = users.login("ana", "nope-nope").await.unwrap_err();
        let unknown = users.login("zoe", "password123").await.unwrap_err();
        assert_eq!(bad_password.to_string(), unknown.to_string());
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn stored_password_is_a_bcrypt_hash() {
        let users = service(true);
        let user = users.create_user("ana", "password123").await.unwrap();
        assert!(user.password_hash.starts_with("$2b$04$"));
        assert!(!user.password_hash.contains("password123"));
    }

    #[tokio::test]
    async fn unknown_user_login_still_hashes() {
        let users = service(true);
        assert!(users.dummy_hash.get().is_none());

        let err = users.login("ghost", "password123").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));

        let dummy = users.dummy_hash.get().cloned().expect("dummy hash computed on the unknown-user path");
        assert!(auth::verify_password(DUMMY_PASSWORD, &dummy).unwrap());
    }

    #[tokio::test]
    async fn registration_can_be_disabled() {
        let users = service(false);
        assert!(matches!(
            users.register("ana", "password123").await,
            Err(ServiceError::RegistrationDisabled)
        ));
        // The admin path still works
        assert!(users.create_user("ana", "password123").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_bad_credentials_shape() {
        let users = service(true);
        let err = users.register("not valid!", "short").await.unwrap_err();
        match err {
            ServiceError::Validation(v) => {
                assert_eq!(v.kind_of("username"), Some(ValidationKind::BadType));
                assert!(v.kind_of("password").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_of_deleted_user_is_rejected() {
        let users = service(true);
        users.register("ana", "password123").await.unwrap();
        let grant = users.login("ana", "password123").await.unwrap();

        users.delete_user("ana").await.unwrap();
        assert!(matches!(users.authenticate(&grant.token).await, Err(ServiceError::Unauthenticated)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let users = service(true);
        assert!(matches!(users.authenticate("not-a-jwt").await, Err(ServiceError::Unauthenticated)));
    }
}
