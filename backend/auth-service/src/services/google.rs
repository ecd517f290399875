//! Google ID-token verification.
//!
//! Validates the provider-signed identity assertion cryptographically:
//! RS256 signature against Google's published JWKS, issuer, audience, and
//! expiry. The assertion's `email_verified` claim must additionally be true
//! before the identity is accepted.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, error};

use crate::error::{AuthError, Result};

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
const JWKS_CACHE_TTL_SECS: i64 = 3600; // 1 hour
const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;

/// A verified federated identity: the provider-assigned subject id and the
/// verified email address.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: String,
}

/// Validates a third-party identity assertion and extracts the identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity>;
}

/// Cached Google JWKS (public keys)
#[derive(Default)]
struct JwksCache {
    keys: HashMap<String, Jwk>,
    fetched_at: Option<DateTime<Utc>>,
}

impl JwksCache {
    fn is_expired(&self) -> bool {
        match self.fetched_at {
            Some(t) => Utc::now() - t > Duration::seconds(JWKS_CACHE_TTL_SECS),
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Individual JWK from Google's key set
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    /// Key ID - matched against the JWT header
    kid: String,
    /// Key type (always "RSA" for Google) - included for completeness
    #[allow(dead_code)]
    kty: String,
    /// RSA public key modulus (Base64URL encoded)
    n: String,
    /// RSA public key exponent (Base64URL encoded)
    e: String,
}

#[derive(Debug, Deserialize)]
struct GoogleIdTokenClaims {
    /// Subject - unique user identifier from Google
    sub: String,
    /// User's email
    email: Option<String>,
    /// Whether Google has verified the email
    #[serde(default)]
    email_verified: bool,
    /// Issuer - validated by the jsonwebtoken library
    #[serde(default)]
    #[allow(dead_code)]
    iss: String,
    /// Expiration time - validated by the jsonwebtoken library
    #[serde(default)]
    #[allow(dead_code)]
    exp: i64,
}

/// Verifies Google ID tokens against Google's JWKS, with a TTL cache for the
/// key set.
pub struct GoogleIdTokenVerifier {
    http: Client,
    client_id: String,
    jwks_cache: RwLock<JwksCache>,
}

impl GoogleIdTokenVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            http: Client::new(),
            client_id,
            jwks_cache: RwLock::new(JwksCache::default()),
        }
    }

    async fn fetch_jwks(&self) -> Result<Vec<Jwk>> {
        debug!("Fetching Google JWKS from {}", GOOGLE_JWKS_URL);

        let response = self
            .http
            .get(GOOGLE_JWKS_URL)
            .timeout(std::time::Duration::from_secs(JWKS_FETCH_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Google JWKS request failed with status: {}", status);
            return Err(AuthError::Internal(format!(
                "Google JWKS request failed: {}",
                status
            )));
        }

        let jwks: JwksResponse = response.json().await?;
        Ok(jwks.keys)
    }

    /// Get Google's public key by key ID, using the cache when possible.
    async fn public_key(&self, kid: &str) -> Result<Jwk> {
        {
            let cache = self
                .jwks_cache
                .read()
                .expect("JWKS cache lock poisoned");
            if !cache.is_expired() {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        let keys = self.fetch_jwks().await?;

        let mut cache = self
            .jwks_cache
            .write()
            .expect("JWKS cache lock poisoned");
        cache.keys.clear();
        for key in keys {
            cache.keys.insert(key.kid.clone(), key);
        }
        cache.fetched_at = Some(Utc::now());

        cache.keys.get(kid).cloned().ok_or_else(|| {
            debug!("Google public key not found for kid={}", kid);
            AuthError::TokenInvalid
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity> {
        // 1. Decode JWT header to get the signing key id
        let header = decode_header(id_token).map_err(|e| {
            debug!("Failed to decode Google ID-token header: {}", e);
            AuthError::TokenInvalid
        })?;

        if header.alg != Algorithm::RS256 {
            debug!("Google ID token using unexpected algorithm: {:?}", header.alg);
            return Err(AuthError::TokenInvalid);
        }

        let kid = header.kid.ok_or(AuthError::TokenInvalid)?;

        // 2. Resolve Google's public key for this kid
        let jwk = self.public_key(&kid).await?;

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| {
            error!("Failed to build decoding key from Google JWK: {}", e);
            AuthError::TokenInvalid
        })?;

        // 3. Verify signature, issuer, audience, and expiration
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[&self.client_id]);
        validation.validate_exp = true;

        let token_data = decode::<GoogleIdTokenClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| {
                debug!("Google ID-token verification failed: {}", e);
                AuthError::TokenInvalid
            })?;

        identity_from_claims(token_data.claims)
    }
}

/// Accept the identity only when the provider attests the email is verified.
fn identity_from_claims(claims: GoogleIdTokenClaims) -> Result<VerifiedIdentity> {
    if !claims.email_verified {
        return Err(AuthError::UnverifiedEmail);
    }

    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or(AuthError::TokenInvalid)?;

    Ok(VerifiedIdentity {
        subject: claims.sub,
        email,
    })
}
