use serde::Serialize;

use crate::config::{EmptySecretPolicy, GateConfig, DEFAULT_COOKIE_NAME};
use crate::config_error::ConfigError;
use crate::request::CredentialRequest;
use crate::secret::GateSecret;
use crate::sources::{self, CredentialSource};

/// Outcome of evaluating a request against the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "source", rename_all = "snake_case")]
pub enum AuthDecision {
    /// No secret configured and the policy allows it
    Disabled,
    /// A candidate from this source equals the secret
    Granted(CredentialSource),
    /// No candidate matched
    Denied,
}

impl AuthDecision {
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Disabled | Self::Granted(_))
    }

    /// Source that matched, if any
    #[must_use]
    pub const fn source(self) -> Option<CredentialSource> {
        match self {
            Self::Granted(source) => Some(source),
            Self::Disabled | Self::Denied => None,
        }
    }
}

/// Decides whether a request may reach a protected handler.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CredentialGate {
    secret: GateSecret,
    cookie_name: String,
    empty_secret: EmptySecretPolicy,
}

impl CredentialGate {
    /// Gate with the default cookie name and the fail-open empty-secret policy.
    #[must_use]
    pub fn new(secret: impl Into<GateSecret>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            empty_secret: EmptySecretPolicy::default(),
        }
    }

    /// Build a gate from validated configuration.
    ///
    /// Logs a warning when the resulting gate lets every request through.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let gate = Self {
            secret: config.secret.clone(),
            cookie_name: config.cookie_name.clone(),
            empty_secret: config.empty_secret,
        };

        match (gate.secret.is_empty(), gate.empty_secret) {
            (true, EmptySecretPolicy::Allow) => tracing::warn!(
                "No gate secret configured; protected paths are open to every request"
            ),
            (true, EmptySecretPolicy::Deny) => tracing::warn!(
                "No gate secret configured; protected paths reject every request"
            ),
            (false, _) => tracing::info!(
                cookie_name = %gate.cookie_name,
                "Credential gate initialized"
            ),
        }

        Ok(gate)
    }

    #[must_use]
    pub fn with_empty_secret_policy(mut self, policy: EmptySecretPolicy) -> Self {
        self.empty_secret = policy;
        self
    }

    /// `true` when a secret is configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Evaluate the request's credential sources against the secret.
    ///
    /// Sources are tried in precedence order and the first candidate equal
    /// to the secret wins. A mismatch in one source never stops later
    /// sources from matching.
    #[must_use]
    pub fn evaluate(&self, request: &CredentialRequest) -> AuthDecision {
        if self.secret.is_empty() {
            return match self.empty_secret {
                EmptySecretPolicy::Allow => AuthDecision::Disabled,
                EmptySecretPolicy::Deny => AuthDecision::Denied,
            };
        }

        let decision = sources::candidates(request, &self.cookie_name)
            .find(|candidate| self.secret.matches(&candidate.value))
            .map_or(AuthDecision::Denied, |candidate| {
                AuthDecision::Granted(candidate.source)
            });

        tracing::trace!(?decision, "Credential gate evaluated");
        decision
    }

    /// `true` if the request may proceed.
    #[must_use]
    pub fn authorize(&self, request: &CredentialRequest) -> bool {
        self.evaluate(request).is_authorized()
    }
}
