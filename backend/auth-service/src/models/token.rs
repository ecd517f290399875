use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One active session grant. Only the SHA-256 hash of the opaque value is
/// stored; the raw value exists solely in the response to the client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(token_hash: String, user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            user_id,
            expires_at: now + ttl,
            issued_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Single-use password reset grant. Consumed records flip `used` and stay in
/// the store until the maintenance sweep removes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordResetTokenRecord {
    pub fn new(token_hash: String, user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_hash,
            user_id,
            expires_at: now + ttl,
            issued_at: now,
            used: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_refresh_record_is_not_expired() {
        let record = RefreshTokenRecord::new("hash".into(), Uuid::new_v4(), Duration::days(30));
        assert!(!record.is_expired(Utc::now()));
    }

    #[test]
    fn reset_record_expires_after_ttl() {
        let record =
            PasswordResetTokenRecord::new("hash".into(), Uuid::new_v4(), Duration::hours(1));
        assert!(!record.is_expired(Utc::now()));
        assert!(record.is_expired(Utc::now() + Duration::hours(2)));
        assert!(!record.used);
    }
}
