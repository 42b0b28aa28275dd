//! User registration, authentication, and profile service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use hydromed_common::{AppError, AppResult, IdGenerator};
use hydromed_db::{
    entities::{dehydration_request::RequestStatus, user},
    repositories::{RequestRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User service for registration, login, and profiles.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    request_repo: RequestRepository,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 64))]
    pub login: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    /// Honored at registration; the moderator login flow can also
    /// promote an existing account.
    #[serde(default)]
    pub is_moderator: bool,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsInput {
    #[validate(length(min = 1, max = 64))]
    pub login: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Profile view: the user plus request counters.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub login: String,
    pub is_moderator: bool,
    /// Requests awaiting moderator action.
    pub formed_count: u64,
    /// Requests resolved with a completed verdict.
    pub completed_count: u64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, request_repo: RequestRepository) -> Self {
        Self {
            user_repo,
            request_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_login(&input.login).await?.is_some() {
            return Err(AppError::Conflict("login already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            login: Set(input.login),
            password_hash: Set(password_hash),
            is_moderator: Set(input.is_moderator),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Verify credentials, returning the user on success.
    ///
    /// Returns the same `Unauthorized` for an unknown login and a wrong
    /// password so the response does not reveal which logins exist.
    pub async fn authenticate(&self, input: CredentialsInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_login(&input.login)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Convenience moderator login: verifies credentials and promotes the
    /// account, or registers a fresh moderator account when the login is
    /// unknown.
    pub async fn login_moderator(&self, input: CredentialsInput) -> AppResult<user::Model> {
        input.validate()?;

        match self.user_repo.find_by_login(&input.login).await? {
            Some(user) => {
                if !verify_password(&input.password, &user.password_hash)? {
                    return Err(AppError::Unauthorized);
                }
                if user.is_moderator {
                    Ok(user)
                } else {
                    self.promote(&user.id).await
                }
            }
            None => {
                self.register(RegisterInput {
                    login: input.login,
                    password: input.password,
                    is_moderator: true,
                })
                .await
            }
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Change the login name. Duplicate logins surface as `Conflict`.
    pub async fn update_login(&self, id: &str, new_login: &str) -> AppResult<user::Model> {
        if new_login.len() < 3 || new_login.len() > 64 {
            return Err(AppError::Validation(
                "login must be between 3 and 64 characters".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();
        active.login = Set(new_login.to_string());
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Grant the moderator flag to a user.
    pub async fn promote(&self, id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();
        active.is_moderator = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await
    }

    /// Profile view with request counters.
    pub async fn profile(&self, id: &str) -> AppResult<ProfileView> {
        let user = self.user_repo.get_by_id(id).await?;

        let formed_count = self
            .request_repo
            .count_by_user_and_status(&user.id, RequestStatus::Formed)
            .await?;
        let completed_count = self
            .request_repo
            .count_by_user_and_status(&user.id, RequestStatus::Completed)
            .await?;

        Ok(ProfileView {
            id: user.id,
            login: user.login,
            is_moderator: user.is_moderator,
            formed_count,
            completed_count,
        })
    }
}

/// Hash a password with Argon2 and a random salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, login: &str, password: &str, is_moderator: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            login: login.to_string(),
            password_hash: hash_password(password).unwrap(),
            is_moderator,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(
        user_db: Arc<sea_orm::DatabaseConnection>,
        request_db: Arc<sea_orm::DatabaseConnection>,
    ) -> UserService {
        UserService::new(
            UserRepository::new(user_db),
            RequestRepository::new(request_db),
        )
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(verify_password("test_password_123", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_short_login() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let request_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, request_db);

        let result = service
            .register(RegisterInput {
                login: "ab".to_string(),
                password: "password123".to_string(),
                is_moderator: false,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_login() {
        let existing = create_test_user("u1", "alice", "secret123", false);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let request_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, request_db);

        let result = service
            .register(RegisterInput {
                login: "alice".to_string(),
                password: "password123".to_string(),
                is_moderator: false,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_login() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let request_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, request_db);

        let result = service
            .authenticate(CredentialsInput {
                login: "ghost".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let existing = create_test_user("u1", "alice", "secret123", false);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let request_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, request_db);

        let result = service
            .authenticate(CredentialsInput {
                login: "alice".to_string(),
                password: "not-the-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let existing = create_test_user("u1", "alice", "secret123", true);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let request_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, request_db);

        let user = service
            .authenticate(CredentialsInput {
                login: "alice".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, "u1");
        assert!(user.is_moderator);
    }

    #[tokio::test]
    async fn test_profile_counts() {
        let existing = create_test_user("u1", "alice", "secret123", false);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let request_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(5))
                }]])
                .into_connection(),
        );
        let service = create_test_service(user_db, request_db);

        let profile = service.profile("u1").await.unwrap();

        assert_eq!(profile.login, "alice");
        assert_eq!(profile.formed_count, 2);
        assert_eq!(profile.completed_count, 5);
    }
}
