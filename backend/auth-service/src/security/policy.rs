//! Pure decision rules over account state. No I/O, no side effects; every
//! flow consults these before touching tokens.

use crate::error::{AuthError, Result};
use crate::models::User;

/// Blocked accounts must not receive tokens through any flow.
pub fn can_authenticate(user: &User) -> Result<()> {
    if !user.is_active() {
        return Err(AuthError::AccountBlocked);
    }
    Ok(())
}

/// Federated accounts cannot log in with a password; they must use their
/// provider's flow.
pub fn can_login_with_password(user: &User) -> Result<()> {
    if !user.is_local() {
        return Err(AuthError::ProviderMismatch);
    }
    Ok(())
}

/// Only locally-authenticated accounts have a password to reset.
pub fn can_reset_password(user: &User) -> Result<()> {
    if !user.is_local() {
        return Err(AuthError::ProviderMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountStatus;

    fn local_user() -> User {
        User::new_local("a@example.com", "$argon2id$stub")
    }

    fn google_user() -> User {
        User::new_google("g@example.com", "google-sub")
    }

    #[test]
    fn active_local_user_passes_all_checks() {
        let user = local_user();
        assert!(can_authenticate(&user).is_ok());
        assert!(can_login_with_password(&user).is_ok());
        assert!(can_reset_password(&user).is_ok());
    }

    #[test]
    fn blocked_user_cannot_authenticate() {
        let mut user = local_user();
        user.status = AccountStatus::Blocked;
        assert!(matches!(
            can_authenticate(&user),
            Err(AuthError::AccountBlocked)
        ));
    }

    #[test]
    fn google_user_cannot_use_password_flows() {
        let user = google_user();
        assert!(can_authenticate(&user).is_ok());
        assert!(matches!(
            can_login_with_password(&user),
            Err(AuthError::ProviderMismatch)
        ));
        assert!(matches!(
            can_reset_password(&user),
            Err(AuthError::ProviderMismatch)
        ));
    }
}
