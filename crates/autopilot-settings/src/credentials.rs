use secrecy::SecretString;

use crate::errors::{Result, SettingsError};

pub const LINEAR_TOKEN_ENV: &str = "LINEAR_TOKEN";
pub const WEBHOOK_SECRET_ENV: &str = "LINEAR_WEBHOOK_SECRET";

/// Secrets read from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    /// Bearer token for the Linear API.
    pub linear_token: SecretString,
    /// Shared secret for webhook signatures; `None` disables verification.
    pub webhook_secret: Option<SecretString>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("linear_token", &"[REDACTED]")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// A missing `LINEAR_TOKEN` is the one unrecoverable startup error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(crate::loader::env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let linear_token = read(LINEAR_TOKEN_ENV)
            .map(SecretString::from)
            .ok_or(SettingsError::MissingEnv(LINEAR_TOKEN_ENV))?;
        let webhook_secret = read(WEBHOOK_SECRET_ENV).map(SecretString::from);
        Ok(Self {
            linear_token,
            webhook_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn token_is_required() {
        let result = Credentials::from_lookup(|_| None);
        assert!(matches!(result, Err(SettingsError::MissingEnv(LINEAR_TOKEN_ENV))));
    }

    #[test]
    fn empty_token_is_missing() {
        let result = Credentials::from_lookup(|_| Some(String::new()));
        assert!(result.is_err());
    }

    #[test]
    fn reads_token_and_secret() {
        let creds = Credentials::from_lookup(|name| match name {
            LINEAR_TOKEN_ENV => Some("lin_api_123".into()),
            WEBHOOK_SECRET_ENV => Some("whsec".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.linear_token.expose_secret(), "lin_api_123");
        assert_eq!(creds.webhook_secret.unwrap().expose_secret(), "whsec");
    }

    #[test]
    fn debug_redacts() {
        let creds = Credentials::from_lookup(|name| {
            (name == LINEAR_TOKEN_ENV).then(|| "lin_api_123".to_string())
        })
        .unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("lin_api_123"));
        assert!(debug.contains("REDACTED"));
    }
}
