use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use tracing::warn;

pub const USER_REQUIRED: &str = "user is required";
pub const TOKEN_REQUIRED: &str = "token is required";
pub const INVALID_USER_TOKEN: &str = "invalid user token";
pub const FEED_UNAVAILABLE: &str = "failure to get feed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    /// Missing or mismatched credentials.
    Auth(&'static str),
    /// The cached feed could not be read or is empty.
    Storage,
}

#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub request_id: String,
}

impl AppError {
    pub fn with_request_id(self, request_id: &str) -> ApiError {
        ApiError {
            error: self,
            request_id: request_id.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::FORBIDDEN,
            AppError::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AppError::Auth(msg) => *msg,
            AppError::Storage => FEED_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        warn!(
            request_id = %self.request_id,
            status = self.error.status().as_u16(),
            reason = self.error.message(),
            "feed request rejected"
        );
        (
            self.error.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.error.message(),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
