use thiserror::Error;

/// Rejections produced by the gate middleware
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    #[error("Unauthorized: missing or invalid credentials")]
    Unauthorized,

    #[error("Internal error: gate decision not found - gate middleware not configured")]
    MissingDecision,
}

impl GateRejection {
    #[must_use]
    pub fn status(self) -> http::StatusCode {
        match self {
            GateRejection::Unauthorized => http::StatusCode::UNAUTHORIZED,
            GateRejection::MissingDecision => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for GateRejection {
    fn into_response(self) -> axum::response::Response {
        use axum::response::Json;
        use serde_json::json;

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
