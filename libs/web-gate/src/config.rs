use crate::{config_error::ConfigError, secret::GateSecret};
use serde::{Deserialize, Serialize};

/// Cookie consulted when no name is configured
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Path prefix protected when none is configured
pub const DEFAULT_PROTECTED_PREFIX: &str = "/config";

/// What the gate does while no secret is configured.
///
/// `Allow` is the zero-config default: an empty secret lets every request
/// through. Deployments that must never run unprotected select `Deny`, which
/// rejects every request until a secret is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySecretPolicy {
    #[default]
    Allow,
    Deny,
}

/// Gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Shared secret; empty disables authentication
    #[serde(default)]
    pub secret: GateSecret,

    /// Name of the cookie carrying the credential
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Behavior while `secret` is empty
    #[serde(default)]
    pub empty_secret: EmptySecretPolicy,

    /// Request path prefixes that require credentials
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_owned()
}

fn default_protected_prefixes() -> Vec<String> {
    vec![DEFAULT_PROTECTED_PREFIX.to_owned()]
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            secret: GateSecret::default(),
            cookie_name: default_cookie_name(),
            empty_secret: EmptySecretPolicy::default(),
            protected_prefixes: default_protected_prefixes(),
        }
    }
}

impl GateConfig {
    /// Default configuration protected by `secret`
    #[must_use]
    pub fn with_secret(secret: impl Into<GateSecret>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration for consistency
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the cookie name could never appear in a
    /// `Cookie` header or a protected prefix is not an absolute path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.cookie_name;
        if name.is_empty() || name.contains(|c: char| c == ';' || c == '=' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidCookieName(name.clone()));
        }

        if let Some(prefix) = self
            .protected_prefixes
            .iter()
            .find(|prefix| !prefix.starts_with('/'))
        {
            return Err(ConfigError::InvalidPrefix(prefix.clone()));
        }

        Ok(())
    }
}
