/// Service layer: business logic and outbound integrations
///
/// - Authentication orchestration (register, login, refresh, logout)
/// - Password reset workflow
/// - Google ID-token verification
/// - Email delivery (SMTP for password reset)
pub mod auth;
pub mod email;
pub mod google;
pub mod password_reset;

pub use auth::{Authenticator, TokenPair};
pub use email::{EmailService, NotificationSink};
pub use google::{GoogleIdTokenVerifier, IdentityVerifier, VerifiedIdentity};
pub use password_reset::PasswordResetFlow;
