//! Single-use password reset workflow.
//!
//! The request side is deliberately silent about account existence: unknown
//! emails, federated accounts, and delivery failures all produce the same
//! successful response as the genuine path.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{AuthError, Result};
use crate::models::PasswordResetTokenRecord;
use crate::security::{hash_password, opaque, policy};
use crate::services::email::NotificationSink;
use crate::store::CredentialStore;
use crate::validators;

const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub struct PasswordResetFlow {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl PasswordResetFlow {
    pub fn new(store: Arc<dyn CredentialStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    /// Start a reset: invalidate prior tokens, persist a fresh one, and hand
    /// (email, raw token) to the notification sink. Returns success for
    /// ineligible emails without any visible difference.
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        if !validators::validate_email(email) {
            debug!("Password reset requested for syntactically invalid email");
            return Ok(());
        }

        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                debug!("Password reset requested for unknown email");
                return Ok(());
            }
        };

        if policy::can_reset_password(&user).is_err() {
            debug!(user_id = %user.id, "Password reset requested for federated account");
            return Ok(());
        }

        // Only the newest token may be live.
        self.store.delete_reset_tokens_for_user(user.id).await?;

        let raw_token = opaque::generate_token();
        let record = PasswordResetTokenRecord::new(
            opaque::hash_token(&raw_token),
            user.id,
            Duration::hours(RESET_TOKEN_TTL_HOURS),
        );
        self.store.insert_reset_token(&record).await?;

        // A delivery failure must not change the response the caller sees.
        if let Err(e) = self.notifier.send_password_reset(email, &raw_token).await {
            error!(user_id = %user.id, error = %e, "Failed to deliver password reset notification");
        } else {
            info!(user_id = %user.id, "Password reset notification sent");
        }

        Ok(())
    }

    /// Complete a reset: consume the token exactly once, update the password
    /// hash, and revoke every existing session of the user.
    pub async fn complete_reset(&self, token: &str, new_password: &str) -> Result<()> {
        let token_hash = opaque::hash_token(token);

        let record = self
            .store
            .find_reset_token(&token_hash)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if record.used {
            debug!(user_id = %record.user_id, "Consumed reset token presented again");
            return Err(AuthError::TokenUsed);
        }

        if record.is_expired(Utc::now()) {
            self.store.delete_reset_token(&token_hash).await?;
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .store
            .find_user_by_id(record.user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        policy::can_reset_password(&user)?;

        let password_hash = hash_password(new_password)?;
        self.store
            .update_password_hash(user.id, &password_hash)
            .await?;

        // The record survives as an audit trail of consumption.
        self.store.mark_reset_token_used(&token_hash).await?;

        // A password reset invalidates every existing session.
        let revoked = self.store.delete_refresh_tokens_for_user(user.id).await?;
        info!(user_id = %user.id, revoked, "Password reset completed");

        Ok(())
    }
}
