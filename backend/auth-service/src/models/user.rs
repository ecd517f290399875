use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// System-wide user roles, carried in access-token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

/// Lifecycle status of an account. Blocked accounts must never receive tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "account_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Blocked,
}

/// How the account authenticates: local password or a federated provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "auth_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Local,
    Google,
}

/// User model - core identity entity.
///
/// Invariant: a local account carries a password hash and no provider
/// subject; a federated account carries a provider subject and no password
/// hash. The constructors below are the only places a `User` is built.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub status: AccountStatus,
    pub provider: AuthProvider,
    pub provider_subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a locally-authenticated account from an already-hashed password.
    pub fn new_local(email: &str, password_hash: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
            role: UserRole::User,
            status: AccountStatus::Active,
            provider: AuthProvider::Local,
            provider_subject: None,
            created_at: Utc::now(),
        }
    }

    /// Build a federated account from a verified Google identity.
    pub fn new_google(email: &str, provider_subject: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: None,
            role: UserRole::User,
            status: AccountStatus::Active,
            provider: AuthProvider::Google,
            provider_subject: Some(provider_subject.to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn is_local(&self) -> bool {
        self.provider == AuthProvider::Local
    }
}

/// User registration request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// User login request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Federated login request carrying the provider-issued ID token
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct GoogleAuthRequest {
    #[validate(length(min = 1))]
    pub id_token: String,
}

/// Token refresh request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Password reset initiation request.
///
/// Deliberately not validated: a malformed email gets the same generic
/// success response as an unknown one.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Password reset completion request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_account_has_password_and_no_subject() {
        let user = User::new_local("a@example.com", "$argon2id$stub");
        assert!(user.password_hash.is_some());
        assert!(user.provider_subject.is_none());
        assert_eq!(user.provider, AuthProvider::Local);
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active());
    }

    #[test]
    fn google_account_has_subject_and_no_password() {
        let user = User::new_google("a@example.com", "google-sub-123");
        assert!(user.password_hash.is_none());
        assert_eq!(user.provider_subject.as_deref(), Some("google-sub-123"));
        assert_eq!(user.provider, AuthProvider::Google);
        assert!(!user.is_local());
    }
}
