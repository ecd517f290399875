/// Security primitives for the authentication core
///
/// - Access-token codec (HS256 signed claims)
/// - Password hashing and verification (Argon2id)
/// - Account policy (pure decision rules)
/// - Opaque credential generation and at-rest hashing
pub mod jwt;
pub mod opaque;
pub mod password;
pub mod policy;

pub use jwt::{AccessTokenClaims, TokenCodec};
pub use password::{hash_password, verify_password};
