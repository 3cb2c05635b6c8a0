use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inference::SegmentError;
use schema::SegmentResponse;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No session: upload an image first")]
    NoSession,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload {0} was replaced before its results were ready")]
    Superseded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Pipeline failures are replies, not transport errors.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error("Upload stream failed: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("segmentation task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Segment(e) => {
                return Json(SegmentResponse::failure(e.to_string())).into_response();
            }
            ApiError::NoSession => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Superseded(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiError::Io(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NoSession.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(
            ApiError::from(missing).into_response().status(),
            StatusCode::NOT_FOUND
        );
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        assert_eq!(
            ApiError::from(denied).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_segment_errors_are_ok_replies() {
        let err = ApiError::from(SegmentError::InvalidRequest("unknown network".into()));
        assert_eq!(err.into_response().status(), StatusCode::OK);

        let err = ApiError::from(SegmentError::Resource("disk full".into()));
        assert_eq!(err.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_superseded_is_conflict() {
        assert_eq!(
            ApiError::Superseded("first".into()).into_response().status(),
            StatusCode::CONFLICT
        );
    }
}
