//! Signed access-token codec.
//!
//! Access tokens are short-lived HS256 JWTs carrying identity and role. They
//! are never stored server-side; validity is entirely signature + expiry at
//! verification time.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::UserRole;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Role at issuance time
    pub role: UserRole,
    /// Email address
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }
}

/// Signs and verifies access tokens with a single symmetric secret, loaded
/// once at process start.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Encode and sign claims for the given identity.
    pub fn issue(&self, user_id: Uuid, role: UserRole, email: &str) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.ttl_secs);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AuthError::Internal(format!("Failed to sign access token: {}", e))
        })
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Purely cryptographic + temporal; no store lookup. Bad signature,
    /// malformed structure, and past expiry all collapse to `TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {}", e);
                AuthError::TokenInvalid
            })
    }

    /// Access-token lifetime in seconds, surfaced to clients as `expires_in`.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
