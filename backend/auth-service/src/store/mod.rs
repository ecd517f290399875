//! Persistence contract for users, refresh tokens, and reset tokens.
//!
//! The core holds no long-lived state; everything durable lives behind this
//! trait. `consume_refresh_token` is the one operation with a hard atomicity
//! requirement: the read-check-delete of a refresh token must be serializable
//! per token value, so that of two concurrent refresh calls presenting the
//! same value exactly one obtains the record and the other observes it as
//! already gone.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{PasswordResetTokenRecord, RefreshTokenRecord, User};

pub use postgres::PgCredentialStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ===== Users =====

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up a federated account by its provider-assigned subject id.
    async fn find_user_by_provider_subject(&self, subject: &str) -> Result<Option<User>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Insert a new user. A concurrent duplicate email must surface as
    /// `EmailTaken`, not as a generic database error.
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    // ===== Refresh tokens =====

    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<()>;

    /// Atomically remove and return the record for this token hash.
    /// At most one concurrent caller gets `Some`; the rest get `None`.
    async fn consume_refresh_token(&self, token_hash: &str)
        -> Result<Option<RefreshTokenRecord>>;

    /// Best-effort delete; deleting an absent token is not an error.
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<()>;

    /// Session-wide revocation. Returns the number of records removed.
    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64>;

    // ===== Password reset tokens =====

    async fn insert_reset_token(&self, record: &PasswordResetTokenRecord) -> Result<()>;

    async fn find_reset_token(&self, token_hash: &str)
        -> Result<Option<PasswordResetTokenRecord>>;

    /// Flip `used` to true. The record is retained as an audit trail.
    async fn mark_reset_token_used(&self, token_hash: &str) -> Result<()>;

    async fn delete_reset_token(&self, token_hash: &str) -> Result<()>;

    /// Invalidate prior reset requests so only the newest token is live.
    async fn delete_reset_tokens_for_user(&self, user_id: Uuid) -> Result<u64>;

    // ===== Maintenance =====

    /// Remove expired refresh tokens and expired-or-consumed reset tokens.
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64>;
}
