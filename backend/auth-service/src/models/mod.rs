/// Data models for identity and authentication
pub mod token;
pub mod user;

pub use token::{PasswordResetTokenRecord, RefreshTokenRecord};
pub use user::{AccountStatus, AuthProvider, User, UserRole};
