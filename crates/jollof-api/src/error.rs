use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jollof_session::SessionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(ref reason) => {
                tracing::debug!("Rejected credentials: {}", reason);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Session(ref e) => session_status(e),
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

fn session_status(err: &SessionError) -> (StatusCode, String) {
    let status = match err {
        SessionError::NoActiveSession(_) | SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::Invalid(_) => StatusCode::BAD_REQUEST,
        SessionError::Conflict(_) => StatusCode::CONFLICT,
        SessionError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
        SessionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Session error: {}", err);
    } else {
        tracing::debug!("Session error: {}", err);
    }

    (status, err.user_message())
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_statuses() {
        let cases = [
            (SessionError::NoActiveSession("u:r".into()), StatusCode::NOT_FOUND),
            (SessionError::Invalid("recipeName is required".into()), StatusCode::BAD_REQUEST),
            (SessionError::Conflict("u:r".into()), StatusCode::CONFLICT),
            (SessionError::GenerationFailed("boom".into()), StatusCode::BAD_GATEWAY),
            (SessionError::Unavailable("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_hides_reason() {
        let response = ApiError::Unauthorized("ExpiredSignature".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
