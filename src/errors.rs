use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::handlers::api::ApiErrorResponse;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Token(jsonwebtoken::errors::Error),
    Hash(String),
    Internal(String),
    /// The named record ("Form", "Question", ...) does not exist.
    NotFound(&'static str),
    Unauthenticated(String),
    AccessDenied(String),
    FormClosed,
    /// Carries the title of the first unanswered required question.
    MissingRequiredAnswer(String),
    Validation(Vec<String>),
    TooManyAttempts,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn access_denied() -> Self {
        AppError::AccessDenied("Access denied".to_string())
    }

    fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Db(_) | AppError::Token(_) | AppError::Hash(_) | AppError::Internal(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Token(e) => write!(f, "Token error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Internal(e) => write!(f, "Internal error: {e}"),
            AppError::NotFound(what) => write!(f, "{what} not found"),
            AppError::Unauthenticated(msg) => write!(f, "{msg}"),
            AppError::AccessDenied(msg) => write!(f, "{msg}"),
            AppError::FormClosed => write!(f, "This form is not accepting responses"),
            AppError::MissingRequiredAnswer(title) => write!(f, "Question \"{title}\" is required"),
            AppError::Validation(_) => write!(f, "Validation error"),
            AppError::TooManyAttempts => {
                write!(f, "Too many failed login attempts. Please try again later.")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) | AppError::FormClosed => StatusCode::FORBIDDEN,
            AppError::MissingRequiredAnswer(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = if self.is_server_error() {
            log::error!("{self}");
            ApiErrorResponse::new("Server error")
        } else if let AppError::Validation(details) = self {
            ApiErrorResponse::with_details(self.to_string(), details.clone())
        } else {
            ApiErrorResponse::new(self.to_string())
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Token(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_message_names_question() {
        let err = AppError::MissingRequiredAnswer("Agama".to_string());
        assert_eq!(err.to_string(), "Question \"Agama\" is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::FormClosed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Form").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::access_denied().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Unauthenticated("Authentication token required".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
