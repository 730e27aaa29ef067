use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::auth::extract::AuthUser;
use crate::auth::rate_limit::LoginThrottle;
use crate::auth::token::TokenService;
use crate::auth::{password, validate};
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::handlers::api::ApiResponse;
use crate::models::user::{NewUser, Role, UserProfile};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    catalog: web::Data<dyn FormCatalog>,
    tokens: web::Data<TokenService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let errors: Vec<String> = [
        validate::validate_email(&body.email),
        validate::validate_password(&body.password),
        validate::validate_required(&body.name, "Name", 100),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let new_user = NewUser {
        email: body.email.trim().to_string(),
        name: body.name.trim().to_string(),
        password_hash: password::hash_password(&body.password)?,
        role: body.role.unwrap_or(Role::User),
    };
    let user = catalog.create_user(new_user).await?;
    let token = tokens.issue(&user)?;
    log::info!("Registered user {} ({})", user.email, user.role.as_str());

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "User registered successfully",
        AuthPayload { user: user.into(), token },
    )))
}

/// POST /api/auth/login
pub async fn login(
    req: HttpRequest,
    catalog: web::Data<dyn FormCatalog>,
    tokens: web::Data<TokenService>,
    throttle: web::Data<LoginThrottle>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if throttle.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failures");
        return Err(AppError::TooManyAttempts);
    }

    let found = catalog.find_user_by_email(body.email.trim()).await?;
    let verified = match &found {
        Some(user) => password::verify_password(&body.password, &user.password_hash)?,
        None => false,
    };

    match found {
        Some(user) if verified => {
            throttle.clear(ip);
            let token = tokens.issue(&user)?;
            Ok(HttpResponse::Ok().json(ApiResponse::with_message(
                "Login successful",
                AuthPayload { user: user.into(), token },
            )))
        }
        _ => {
            throttle.record_failure(ip);
            log::warn!("Failed login for {} from {ip}", body.email.trim());
            Err(AppError::Unauthenticated("Invalid email or password".to_string()))
        }
    }
}

/// GET /api/auth/me
pub async fn me(
    catalog: web::Data<dyn FormCatalog>,
    user: AuthUser,
) -> Result<HttpResponse, AppError> {
    let found = catalog
        .find_user(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(UserProfile::from(found))))
}
