//! Authentication orchestration: registration, login, federated login,
//! refresh rotation, and logout.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{RefreshTokenRecord, User};
use crate::security::{opaque, policy, verify_password, TokenCodec};
use crate::services::google::IdentityVerifier;
use crate::store::CredentialStore;

/// Access + refresh token pair returned by every successful auth flow.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn IdentityVerifier>,
    codec: TokenCodec,
    refresh_ttl: Duration,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn IdentityVerifier>,
        codec: TokenCodec,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            store,
            verifier,
            codec,
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    /// Create a local account and issue a first token pair.
    pub async fn register(&self, email: &str, password: &str) -> Result<TokenPair> {
        if self.store.email_exists(email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = crate::security::hash_password(password)?;
        let user = User::new_local(email, &password_hash);

        // A racing duplicate insert surfaces as EmailTaken via the store's
        // unique constraint.
        self.store.insert_user(&user).await?;

        info!(user_id = %user.id, "User registered");

        self.issue_tokens(&user).await
    }

    /// Password login. An unknown email and a wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        policy::can_login_with_password(&user)?;
        policy::can_authenticate(&user)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            debug!(user_id = %user.id, "Password mismatch on login");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");

        self.issue_tokens(&user).await
    }

    /// Federated login with a Google ID token. Creates the account on first
    /// login; an email already owned by another account is a conflict, never
    /// an implicit link.
    pub async fn login_with_google(&self, id_token: &str) -> Result<TokenPair> {
        let identity = self.verifier.verify(id_token).await?;

        if let Some(user) = self
            .store
            .find_user_by_provider_subject(&identity.subject)
            .await?
        {
            policy::can_authenticate(&user)?;
            info!(user_id = %user.id, "Federated user logged in");
            return self.issue_tokens(&user).await;
        }

        // One email = one account: an existing account under a different
        // provider must not be shadowed by a federated sign-in.
        if self.store.email_exists(&identity.email).await? {
            return Err(AuthError::EmailTaken);
        }

        let user = User::new_google(&identity.email, &identity.subject);
        self.store.insert_user(&user).await?;

        info!(user_id = %user.id, "Federated user registered");

        self.issue_tokens(&user).await
    }

    /// Rotate a refresh token: consume the presented value, then issue a new
    /// pair. The consume is atomic per token value, so of two concurrent
    /// calls with the same value exactly one succeeds and the other sees the
    /// record as already gone.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let token_hash = opaque::hash_token(refresh_token);

        let record = self
            .store
            .consume_refresh_token(&token_hash)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if record.is_expired(Utc::now()) {
            debug!(user_id = %record.user_id, "Expired refresh token presented");
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        policy::can_authenticate(&user)?;

        self.issue_tokens(&user).await
    }

    /// Delete the presented refresh token. Absence is not an error; the
    /// response must not reveal whether the token was valid.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let token_hash = opaque::hash_token(refresh_token);
        self.store.delete_refresh_token(&token_hash).await
    }

    /// Revoke every session of the user.
    pub async fn logout_all(&self, user_id: Uuid) -> Result<()> {
        let revoked = self.store.delete_refresh_tokens_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "All sessions revoked");
        Ok(())
    }

    /// Issue one access token and one fresh opaque refresh token, persisting
    /// the refresh record before returning the pair.
    async fn issue_tokens(&self, user: &User) -> Result<TokenPair> {
        let access_token = self.codec.issue(user.id, user.role, &user.email)?;

        let refresh_token = opaque::generate_token();
        let record = RefreshTokenRecord::new(
            opaque::hash_token(&refresh_token),
            user.id,
            self.refresh_ttl,
        );
        self.store.insert_refresh_token(&record).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.codec.ttl_secs(),
        })
    }
}
