use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use couchctl_core::{Error, Result};

/// Admin credentials take precedence; both absent is a startup error.
pub const ADMIN_AUTH_ENV: &str = "COUCHCTL_ADMIN_AUTH";
pub const AUTH_ENV: &str = "COUCHCTL_AUTH";

/// A ready-to-send `Authorization` header value. Resolved once at
/// startup and handed to the client explicitly; nothing reads the
/// environment after this point.
#[derive(Debug, Clone)]
pub struct Credentials(String);

impl Credentials {
    /// Resolve from the environment: the admin variable wins, the regular
    /// variable is the fallback, neither is fatal before any network call.
    pub fn from_env() -> Result<Self> {
        for var in [ADMIN_AUTH_ENV, AUTH_ENV] {
            match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => return Ok(Self(value)),
                _ => {}
            }
        }
        Err(Error::Config(format!(
            "no credentials: set {} (admin) or {} to an Authorization header value",
            ADMIN_AUTH_ENV, AUTH_ENV
        )))
    }

    /// Basic auth from an account/password pair, for commands that prompt
    /// instead of reading the environment.
    pub fn basic(user: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{}:{}", user, password));
        Self(format!("Basic {}", token))
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_encodes_user_and_password() {
        let creds = Credentials::basic("acme", "s3cret");
        // base64("acme:s3cret")
        assert_eq!(creds.header_value(), "Basic YWNtZTpzM2NyZXQ=");
    }

    #[test]
    fn test_missing_env_is_config_error() {
        // Serialize access to the two variables within this test binary
        static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        let _guard = LOCK.lock().unwrap();

        let saved: Vec<_> = [ADMIN_AUTH_ENV, AUTH_ENV]
            .iter()
            .map(|v| (*v, std::env::var(v).ok()))
            .collect();
        unsafe {
            std::env::remove_var(ADMIN_AUTH_ENV);
            std::env::remove_var(AUTH_ENV);
        }

        let result = Credentials::from_env();

        for (var, value) in saved {
            if let Some(value) = value {
                unsafe { std::env::set_var(var, value) };
            }
        }
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
