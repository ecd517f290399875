//! Shared test fixtures: an in-memory credential store and stub
//! collaborators, wired into the real services through the same constructor
//! seams the production binary uses.

// Not every test binary exercises every fixture helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use auth_service::error::{AuthError, Result};
use auth_service::models::{AccountStatus, PasswordResetTokenRecord, RefreshTokenRecord, User};
use auth_service::security::TokenCodec;
use auth_service::services::{
    Authenticator, IdentityVerifier, NotificationSink, PasswordResetFlow, VerifiedIdentity,
};
use auth_service::store::CredentialStore;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const ACCESS_TTL_SECS: i64 = 900;
pub const REFRESH_TTL_DAYS: i64 = 30;

/// In-memory credential store. Mutex-guarded maps give the same per-token
/// atomicity the Postgres implementation gets from single-statement deletes.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<Uuid, User>>,
    refresh_tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
    reset_tokens: Mutex<HashMap<String, PasswordResetTokenRecord>>,
}

impl MemoryCredentialStore {
    /// Test hook: flip an account's status directly.
    pub fn set_status(&self, user_id: Uuid, status: AccountStatus) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.status = status;
        }
    }

    /// Test hook: remove a user entirely.
    pub fn remove_user(&self, user_id: Uuid) {
        self.users.lock().unwrap().remove(&user_id);
    }

    pub fn refresh_token_count(&self, user_id: Uuid) -> usize {
        self.refresh_tokens
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_provider_subject(&self, subject: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.provider_subject.as_deref() == Some(subject))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.email == email))
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.password_hash = Some(password_hash.to_string());
        }
        Ok(())
    }

    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<()> {
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn consume_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>> {
        // remove() under the lock: exactly one caller can win the record.
        Ok(self.refresh_tokens.lock().unwrap().remove(token_hash))
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<()> {
        self.refresh_tokens.lock().unwrap().remove(token_hash);
        Ok(())
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, r| r.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn insert_reset_token(&self, record: &PasswordResetTokenRecord) -> Result<()> {
        self.reset_tokens
            .lock()
            .unwrap()
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetTokenRecord>> {
        Ok(self.reset_tokens.lock().unwrap().get(token_hash).cloned())
    }

    async fn mark_reset_token_used(&self, token_hash: &str) -> Result<()> {
        let mut tokens = self.reset_tokens.lock().unwrap();
        if let Some(record) = tokens.get_mut(token_hash) {
            record.used = true;
        }
        Ok(())
    }

    async fn delete_reset_token(&self, token_hash: &str) -> Result<()> {
        self.reset_tokens.lock().unwrap().remove(token_hash);
        Ok(())
    }

    async fn delete_reset_tokens_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut tokens = self.reset_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, r| r.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut purged = 0u64;

        let mut refresh = self.refresh_tokens.lock().unwrap();
        let before = refresh.len();
        refresh.retain(|_, r| r.expires_at >= now);
        purged += (before - refresh.len()) as u64;

        let mut resets = self.reset_tokens.lock().unwrap();
        let before = resets.len();
        resets.retain(|_, r| r.expires_at >= now);
        purged += (before - resets.len()) as u64;

        Ok(purged)
    }
}

/// Identity verifier stub returning a configured identity for any token.
#[derive(Default)]
pub struct StaticVerifier {
    identity: Mutex<Option<VerifiedIdentity>>,
}

impl StaticVerifier {
    pub fn set_identity(&self, subject: &str, email: &str) {
        *self.identity.lock().unwrap() = Some(VerifiedIdentity {
            subject: subject.to_string(),
            email: email.to_string(),
        });
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, _id_token: &str) -> Result<VerifiedIdentity> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or(AuthError::TokenInvalid)
    }
}

/// Notification sink that records every (recipient, token) pair instead of
/// sending mail. Tests read the token the way a user would read their inbox.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_token(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, t)| t.clone())
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send_password_reset(&self, recipient: &str, token: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), token.to_string()));
        Ok(())
    }
}

/// Fully wired service stack over the in-memory store.
pub struct TestBackend {
    pub store: Arc<MemoryCredentialStore>,
    pub verifier: Arc<StaticVerifier>,
    pub notifier: Arc<RecordingNotifier>,
    pub authenticator: Arc<Authenticator>,
    pub reset_flow: Arc<PasswordResetFlow>,
    pub codec: TokenCodec,
}

pub fn test_backend() -> TestBackend {
    let store = Arc::new(MemoryCredentialStore::default());
    let verifier = Arc::new(StaticVerifier::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let codec = TokenCodec::new(TEST_JWT_SECRET, ACCESS_TTL_SECS);

    let authenticator = Arc::new(Authenticator::new(
        store.clone(),
        verifier.clone(),
        codec.clone(),
        REFRESH_TTL_DAYS,
    ));
    let reset_flow = Arc::new(PasswordResetFlow::new(store.clone(), notifier.clone()));

    TestBackend {
        store,
        verifier,
        notifier,
        authenticator,
        reset_flow,
        codec,
    }
}
