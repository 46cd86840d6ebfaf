/// Error types for Story Service
///
/// Errors are converted to HTTP responses for API clients. Playback errors
/// keep their own taxonomy and are mapped to status codes here.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use story_engine::PlaybackError;
use thiserror::Error;

/// Result type for story-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Validation failed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Story playback or action rejected
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Playback(err) => match err {
                PlaybackError::ProfileNotFound(_) | PlaybackError::NoActiveStories => {
                    StatusCode::NOT_FOUND
                }
                PlaybackError::AuthRequired => StatusCode::UNAUTHORIZED,
                PlaybackError::SelfRepostForbidden | PlaybackError::SelfReplyForbidden => {
                    StatusCode::FORBIDDEN
                }
                PlaybackError::RepostInFlight => StatusCode::CONFLICT,
                PlaybackError::InvalidReply(_) => StatusCode::BAD_REQUEST,
                PlaybackError::SessionClosed => StatusCode::GONE,
                PlaybackError::FetchFailed(_)
                | PlaybackError::RepostWriteFailed(_)
                | PlaybackError::ReplyWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_errors_map_to_statuses() {
        let cases = [
            (PlaybackError::NoActiveStories, StatusCode::NOT_FOUND),
            (PlaybackError::AuthRequired, StatusCode::UNAUTHORIZED),
            (PlaybackError::SelfRepostForbidden, StatusCode::FORBIDDEN),
            (PlaybackError::RepostInFlight, StatusCode::CONFLICT),
            (
                PlaybackError::RepostWriteFailed("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn playback_message_is_passed_through() {
        let err = AppError::from(PlaybackError::SelfRepostForbidden);
        assert_eq!(err.to_string(), "you cannot repost your own story");
    }
}
