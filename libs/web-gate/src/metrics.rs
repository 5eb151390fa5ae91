//! Metrics hooks for gate decisions
//!
//! Backends implement [`GateMetrics`]; the middleware reports one event per
//! evaluated request.

use crate::gate::AuthDecision;
use crate::sources::CredentialSource;

/// Gate event types for metrics tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// A credential matched the secret
    Granted,

    /// No credential matched
    Denied,

    /// The gate is disabled and let the request through
    Disabled,
}

impl GateEvent {
    /// Get the metric name for this event
    #[must_use]
    pub fn metric_name(self) -> &'static str {
        match self {
            GateEvent::Granted => "gate.granted",
            GateEvent::Denied => "gate.denied",
            GateEvent::Disabled => "gate.disabled",
        }
    }
}

impl From<AuthDecision> for GateEvent {
    fn from(decision: AuthDecision) -> Self {
        match decision {
            AuthDecision::Granted(_) => GateEvent::Granted,
            AuthDecision::Denied => GateEvent::Denied,
            AuthDecision::Disabled => GateEvent::Disabled,
        }
    }
}

/// Labels for gate metrics
#[derive(Default, Debug, Clone)]
pub struct GateMetricLabels {
    /// Source that matched, for granted requests
    pub source: Option<CredentialSource>,

    /// Request path
    pub path: Option<String>,
}

impl GateMetricLabels {
    #[must_use]
    pub fn with_source(mut self, source: Option<CredentialSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Trait for metrics backends
pub trait GateMetrics: Send + Sync {
    /// Record a gate event
    fn record_event(&self, event: GateEvent, labels: &GateMetricLabels);
}

/// No-op metrics implementation (default)
#[derive(Debug, Clone, Copy)]
pub struct NoOpMetrics;

impl GateMetrics for NoOpMetrics {
    fn record_event(&self, _event: GateEvent, _labels: &GateMetricLabels) {
        // No-op
    }
}

/// Logging-based metrics implementation
#[derive(Debug, Clone, Copy)]
pub struct LoggingMetrics;

impl GateMetrics for LoggingMetrics {
    fn record_event(&self, event: GateEvent, labels: &GateMetricLabels) {
        tracing::debug!(
            metric = event.metric_name(),
            source = ?labels.source,
            path = ?labels.path,
            "Gate event recorded"
        );
    }
}
