use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::errors::AppError;
use crate::auth::{token::Claims, CredentialService};

/// Claims of a caller that presented a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    CredentialService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_owned()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid Authorization header".to_owned()))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("expected a Bearer token".to_owned()))?;

        let claims = CredentialService::from_ref(state).validate_token(token.trim())?;
        Ok(Self(claims))
    }
}
