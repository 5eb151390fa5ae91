//! Credential gate for the plugin web surface.
//!
//! A [`CredentialGate`] decides whether a request may reach a protected
//! handler. Candidates are taken, in order, from the `token` query parameter,
//! the `Authorization` header (or `X-Auth-Token` when `Authorization` is
//! absent), and a named cookie. The first candidate equal to the configured
//! secret authorizes the request.
//!
//! An empty secret disables the gate (fail-open) unless the configuration
//! selects [`EmptySecretPolicy::Deny`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod config_error;
pub mod cookie;
pub mod errors;
pub mod gate;
pub mod metrics;
pub mod request;
pub mod secret;
pub mod sources;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use config::{EmptySecretPolicy, GateConfig};
pub use config_error::ConfigError;
pub use errors::GateRejection;
pub use gate::{AuthDecision, CredentialGate};
pub use metrics::{GateEvent, GateMetricLabels, GateMetrics, LoggingMetrics, NoOpMetrics};
pub use request::CredentialRequest;
pub use secret::GateSecret;
pub use sources::CredentialSource;
