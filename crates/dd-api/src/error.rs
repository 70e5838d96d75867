//! Maps `AppError` onto HTTP. Every failure leaves as `{"message": "..."}`.

use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use dd_core::error::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// `AppError` wearing an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ApiError {
    /// What the client is told. Store failures stay in the log.
    pub fn user_message(&self) -> String {
        match &self.0 {
            AppError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::UnknownUser
            | AppError::Authentication(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidCredential
            | AppError::StaleIdentity => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            AppError::Store(detail) => log::error!("request failed: {detail}"),
            AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidCredential
            | AppError::StaleIdentity
            | AppError::Forbidden(_) => log::info!("rejected: {}", self.0),
            _ => log::debug!("client error: {}", self.0),
        }
        HttpResponse::build(self.status_code()).json(MessageBody::new(self.user_message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (AppError::Validation("x".into()), 400),
            (AppError::Conflict("x".into()), 400),
            (AppError::UnknownUser, 400),
            (AppError::Authentication("Incorrect password".into()), 400),
            (AppError::MissingCredential, 401),
            (AppError::MalformedCredential, 401),
            (AppError::InvalidCredential, 401),
            (AppError::StaleIdentity, 401),
            (AppError::Forbidden("x".into()), 403),
            (AppError::not_found("Post"), 404),
            (AppError::store("disk on fire"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code().as_u16(), status);
        }
    }

    #[test]
    fn store_details_are_not_shown_to_clients() {
        let err = ApiError(AppError::store("UNIQUE constraint failed: users.email"));
        assert_eq!(err.user_message(), "Internal server error");
        assert_eq!(ApiError(AppError::not_found("Post")).user_message(), "Post not found");
        assert_eq!(ApiError(AppError::UnknownUser).user_message(), "Incorrect username");
    }
}
