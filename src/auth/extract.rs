//! Request extractors for bearer-token identity.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use super::token::{Claims, TokenService};
use crate::errors::AppError;
use crate::models::user::Role;

/// Raw token from `Authorization: Bearer <token>`, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn tokens(req: &HttpRequest) -> Result<&TokenService, AppError> {
    req.app_data::<web::Data<TokenService>>()
        .map(|d| d.get_ref())
        .ok_or_else(|| AppError::Internal("TokenService not configured".to_string()))
}

/// Caller with a valid token. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(c: Claims) -> Self {
        AuthUser { id: c.sub, email: c.email, role: c.role }
    }
}

impl AuthUser {
    fn from_request_sync(req: &HttpRequest) -> Result<Self, AppError> {
        let token = bearer_token(req)
            .ok_or_else(|| AppError::Unauthenticated("Authentication token required".to_string()))?;
        tokens(req)?
            .verify(token)
            .map(AuthUser::from)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AuthUser::from_request_sync(req))
    }
}

/// Authenticated caller holding the `ADMIN` role. 403 for other roles.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl AdminUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = AuthUser::from_request_sync(req).and_then(|user| {
            if user.role == Role::Admin {
                Ok(AdminUser(user))
            } else {
                Err(AppError::AccessDenied("Admin access required".to_string()))
            }
        });
        ready(result)
    }
}

/// Identity if a valid token is present; `None` for a missing or bad token.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(AuthUser::from_request_sync(req).ok())))
    }
}

/// Raw bearer token, unverified. Verification is left to the caller.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(BearerToken(bearer_token(req).map(String::from))))
    }
}
