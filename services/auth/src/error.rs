use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("external id, email and provider are required")]
    MissingClaims,
    #[error("no identity evidence on request")]
    Unauthenticated,
    #[error("persistence failure")]
    PersistenceFailure(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingClaims => "MISSING_CLAIMS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingClaims => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PersistenceFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and TraceLayer already records their status.
        match &self {
            Self::PersistenceFailure(e) | Self::Internal(e) => {
                tracing::error!(error = format!("{e:#}"), kind = self.kind(), "request failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
