//! Credential sources and their extractors.
//!
//! Each source yields at most one candidate per request. Sources are tried in
//! a fixed order; the header source consults `X-Auth-Token` only when
//! `Authorization` is absent, never when it is present but wrong.

use std::borrow::Cow;
use std::fmt;

use http::header;
use serde::Serialize;

use crate::cookie;
use crate::request::{CredentialRequest, TOKEN_QUERY_PARAM, X_AUTH_TOKEN};

/// Channel a credential was presented through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// `token` query parameter
    Query,
    /// Last whitespace-delimited segment of `Authorization`
    Authorization,
    /// Last whitespace-delimited segment of `X-Auth-Token`
    AuthTokenHeader,
    /// Percent-decoded value of the configured cookie
    Cookie,
}

impl CredentialSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Authorization => "authorization",
            Self::AuthTokenHeader => "auth_token_header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential value taken from one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'r> {
    pub source: CredentialSource,
    pub value: Cow<'r, str>,
}

type Extractor = for<'r> fn(&'r CredentialRequest, &str) -> Option<Candidate<'r>>;

/// Extractors in precedence order
static EXTRACTORS: [Extractor; 3] = [query_token, header_token, cookie_token];

/// Candidates of a request in precedence order, skipping empty values.
pub fn candidates<'r>(
    request: &'r CredentialRequest,
    cookie_name: &'r str,
) -> impl Iterator<Item = Candidate<'r>> + 'r {
    EXTRACTORS
        .iter()
        .filter_map(move |extract| extract(request, cookie_name))
        .filter(|candidate| !candidate.value.is_empty())
}

/// Last whitespace-delimited segment of a header value.
///
/// A value without whitespace is its own last segment; a trailing delimiter
/// yields an empty segment.
#[must_use]
pub fn last_token(value: &str) -> &str {
    value.rsplit(char::is_whitespace).next().unwrap_or(value)
}

fn query_token<'r>(request: &'r CredentialRequest, _cookie_name: &str) -> Option<Candidate<'r>> {
    request.query_param(TOKEN_QUERY_PARAM).map(|value| Candidate {
        source: CredentialSource::Query,
        value: Cow::Borrowed(value),
    })
}

fn header_token<'r>(request: &'r CredentialRequest, _cookie_name: &str) -> Option<Candidate<'r>> {
    let (source, name) = if request.has_header(&header::AUTHORIZATION) {
        (CredentialSource::Authorization, header::AUTHORIZATION)
    } else {
        (CredentialSource::AuthTokenHeader, X_AUTH_TOKEN)
    };

    request.header(&name).map(|value| Candidate {
        source,
        value: Cow::Borrowed(last_token(value)),
    })
}

fn cookie_token<'r>(request: &'r CredentialRequest, cookie_name: &str) -> Option<Candidate<'r>> {
    let raw = request.cookie_header()?;
    cookie::cookie_value(&raw, cookie_name).map(|value| Candidate {
        source: CredentialSource::Cookie,
        value: Cow::Owned(value),
    })
}
