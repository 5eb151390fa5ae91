use thiserror::Error;

/// Errors detected while validating a [`GateConfig`](crate::GateConfig)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid cookie name '{0}': must be non-empty and contain no whitespace, ';' or '='")]
    InvalidCookieName(String),

    #[error("invalid protected path prefix '{0}': must start with '/'")]
    InvalidPrefix(String),
}
