use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::feed::FetchError;
use crate::relay::RelayError;
use crate::util::UrlValidationError;

/// Errors a relay request can end in.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed target or query. Raised before any network I/O.
    #[error("{0}")]
    BadRequest(String),

    /// The source feed could not be fetched or parsed
    #[error("Upstream feed error: {0}")]
    Upstream(#[from] FetchError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Fetch(e) => ApiError::Upstream(e),
            RelayError::Emit(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UrlValidationError> for ApiError {
    fn from(e: UrlValidationError) -> Self {
        ApiError::BadRequest(format!("Bad feed URL: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                msg,
            )
                .into_response(),
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "Feed fetch failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "Server error",
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_bad_request_is_plain_text() {
        let response = ApiError::BadRequest("items_cap must be positive".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(response).await, b"items_cap must be positive");
    }

    #[tokio::test]
    async fn test_upstream_has_empty_body() {
        let response = ApiError::from(RelayError::Fetch(FetchError::Timeout)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let response = ApiError::Internal("writer exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, b"Server error");
    }
}
