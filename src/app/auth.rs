use crate::config::PASSPHRASE_ENV;

/// Shared-passphrase gate for the gallery.
///
/// Constructed once at startup and passed through the application state; a
/// missing passphrase is a configuration error and every login attempt is
/// rejected.
#[derive(Debug, Clone)]
pub struct AuthService {
    passphrase: Option<String>,
}

impl AuthService {
    pub fn from_env() -> Self {
        Self::new(std::env::var(PASSPHRASE_ENV).ok())
    }

    pub fn new(passphrase: Option<String>) -> Self {
        let passphrase = passphrase
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if passphrase.is_none() {
            tracing::error!("{PASSPHRASE_ENV} is not set; every login will fail");
        }
        Self { passphrase }
    }

    /// Whitespace-trimmed, case-insensitive comparison against the configured
    /// passphrase.
    pub fn verify(&self, input: &str) -> bool {
        let Some(expected) = self.passphrase.as_deref() else {
            tracing::error!("passphrase is not configured; rejecting login");
            return false;
        };
        input.trim().to_lowercase() == expected.to_lowercase()
    }
}
