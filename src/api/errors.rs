use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{
    analytics::AnalyticsError,
    auth::{token::TokenError, AuthError},
    db::{self, DbError},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or incomplete request body.
    #[error("{0}")]
    BadRequest(String),
    /// Uniqueness violation. Reported as 400 to match the registration contract.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "Request failed");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if db::is_invalid_text(&e) {
            return Self::BadRequest("text fields must not contain NUL characters".to_owned());
        }
        Self::Internal(e.into())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UsernameTaken => Self::Conflict(e.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized(e.to_string()),
            AuthError::Db(DbError::Sqlx(e)) => e.into(),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<AnalyticsError> for AppError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::NoReadings => Self::NotFound(e.to_string()),
            AnalyticsError::MissingMeasurement(_) => Self::Unprocessable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_expected_status() {
        assert_eq!(AppError::from(AuthError::UsernameTaken).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::Hashing("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_are_unauthorized() {
        assert_eq!(AppError::from(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(TokenError::BadSignature).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn analytics_errors_map_to_404_and_422() {
        assert_eq!(AppError::from(AnalyticsError::NoReadings).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(AnalyticsError::MissingMeasurement("humidity")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
