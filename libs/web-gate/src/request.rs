use std::collections::HashMap;

use http::{header, HeaderMap, HeaderName, HeaderValue, Uri};

/// Query parameter carrying the credential
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Custom header consulted when `Authorization` is absent
pub const X_AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// Headers retained by [`CredentialRequest::from_http`]
const CREDENTIAL_HEADERS: [HeaderName; 3] = [header::AUTHORIZATION, X_AUTH_TOKEN, header::COOKIE];

/// Credential-bearing parts of an inbound request.
///
/// Holds the parsed query string and a case-insensitive header map. Every
/// part is optional; a request with neither is simply a request without
/// candidates.
#[derive(Debug, Clone, Default)]
pub struct CredentialRequest {
    query: HashMap<String, String>,
    headers: HeaderMap,
}

impl CredentialRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the credential-bearing parts of an HTTP request.
    ///
    /// Only `Authorization`, `X-Auth-Token` and `Cookie` are copied. A query
    /// string that does not parse yields no query parameters; when a key
    /// repeats, its first occurrence is kept.
    #[must_use]
    pub fn from_http(uri: &Uri, headers: &HeaderMap) -> Self {
        let query = uri.query().map(parse_query).unwrap_or_default();

        let mut retained = HeaderMap::new();
        for name in &CREDENTIAL_HEADERS {
            for value in headers.get_all(name) {
                retained.append(name.clone(), value.clone());
            }
        }

        Self {
            query,
            headers: retained,
        }
    }

    /// Replace the query parameters
    #[must_use]
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Append a header; names are case-insensitive.
    ///
    /// A name or value that is not valid in HTTP is dropped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::debug!(header = name, "ignoring malformed credential header"),
        }
        self
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// `true` if the header is present, even with an unreadable value.
    #[must_use]
    pub fn has_header(&self, name: &HeaderName) -> bool {
        self.headers.contains_key(name)
    }

    /// First value of a header as text; non-visible-ASCII values read as absent.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All `Cookie` header lines joined with `"; "`.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let lines: Vec<&str> = self
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("; "))
        }
    }
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(raw) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unparseable query string");
            return HashMap::new();
        }
    };

    let mut query = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        query.entry(name).or_insert(value);
    }
    query
}
