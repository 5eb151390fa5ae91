//! Axum middleware and extractor for the credential gate

use crate::{
    config::{GateConfig, DEFAULT_PROTECTED_PREFIX},
    config_error::ConfigError,
    errors::GateRejection,
    gate::{AuthDecision, CredentialGate},
    metrics::{GateEvent, GateMetricLabels, GateMetrics, NoOpMetrics},
    request::CredentialRequest,
};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;

/// Extractor for the decision the gate middleware attached to the request
#[derive(Debug, Clone, Copy)]
pub struct GateDecision(pub AuthDecision);

impl<S> FromRequestParts<S> for GateDecision
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthDecision>()
            .copied()
            .map(GateDecision)
            .ok_or(GateRejection::MissingDecision)
    }
}

/// `Option<GateDecision>` is `None` on paths the middleware does not protect.
impl<S> OptionalFromRequestParts<S> for GateDecision
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthDecision>().copied().map(GateDecision))
    }
}

/// Path prefixes that require credentials.
///
/// Matching is a plain string prefix test, so `/config` also covers
/// `/config/messages` and `/configuration`.
#[derive(Debug, Clone)]
pub struct ProtectedPaths {
    prefixes: Arc<[String]>,
}

impl ProtectedPaths {
    #[must_use]
    pub fn new<I, P>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for ProtectedPaths {
    fn default() -> Self {
        Self::new([DEFAULT_PROTECTED_PREFIX])
    }
}

#[derive(Clone)]
pub struct GateState {
    gate: Arc<CredentialGate>,
    paths: ProtectedPaths,
    metrics: Arc<dyn GateMetrics>,
}

impl GateState {
    #[must_use]
    pub fn new(gate: Arc<CredentialGate>, paths: ProtectedPaths) -> Self {
        Self {
            gate,
            paths,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Build the middleware state from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
        let gate = CredentialGate::from_config(config)?;
        Ok(Self::new(
            Arc::new(gate),
            ProtectedPaths::new(config.protected_prefixes.iter().cloned()),
        ))
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GateMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }

    #[must_use]
    pub fn paths(&self) -> &ProtectedPaths {
        &self.paths
    }
}

/// Credential gate middleware
///
/// This middleware:
/// 1. Skips the gate for CORS preflight requests
/// 2. Passes requests for unprotected paths through untouched
/// 3. For protected paths: evaluates the gate, inserts the `AuthDecision`
///    into request extensions on success, responds 401 otherwise
pub async fn require_credentials(
    State(GateState {
        gate,
        paths,
        metrics,
    }): State<GateState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let path = request.uri().path();
    if !paths.is_protected(path) {
        return next.run(request).await;
    }

    let credentials = CredentialRequest::from_http(request.uri(), request.headers());
    let decision = gate.evaluate(&credentials);

    let labels = GateMetricLabels::default()
        .with_source(decision.source())
        .with_path(path);
    metrics.record_event(GateEvent::from(decision), &labels);

    if !decision.is_authorized() {
        return GateRejection::Unauthorized.into_response();
    }

    request.extensions_mut().insert(decision);
    next.run(request).await
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_prefix_matching() {
        let paths = ProtectedPaths::default();
        assert!(paths.is_protected("/config"));
        assert!(paths.is_protected("/config/messages"));
        assert!(paths.is_protected("/configuration"));
        assert!(!paths.is_protected("/messages"));
        assert!(!paths.is_protected("/"));
    }

    #[test]
    fn test_empty_prefix_list_protects_nothing() {
        let paths = ProtectedPaths::new(Vec::<String>::new());
        assert!(!paths.is_protected("/config"));
    }

    #[test]
    fn test_from_config_copies_prefixes() {
        let config = GateConfig {
            protected_prefixes: vec!["/admin".to_owned(), "/config".to_owned()],
            ..GateConfig::with_secret("s")
        };
        let state = GateState::from_config(&config).unwrap();
        assert_eq!(state.paths().prefixes(), ["/admin", "/config"]);
        assert!(state.gate().is_enabled());
    }

    #[test]
    fn test_preflight_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_preflight_request(&Method::OPTIONS, &headers));

        headers.insert("origin", HeaderValue::from_static("https://example.com"));
        headers.insert(
            "access-control-request-method",
            HeaderValue::from_static("GET"),
        );
        assert!(is_preflight_request(&Method::OPTIONS, &headers));
        assert!(!is_preflight_request(&Method::GET, &headers));
    }
}
