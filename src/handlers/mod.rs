pub mod api;
pub mod auth_handlers;
pub mod export_handlers;
pub mod form_handlers;
pub mod question_handlers;
pub mod response_handlers;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
    web,
};
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::models::form::Form;
use api::ApiErrorResponse;

/// Rejects POST/PUT/PATCH requests without `Content-Type: application/json`.
/// Browsers cannot send cross-origin JSON through a plain form post, so this
/// doubles as a CSRF guard. Reads and deletes carry no body and are exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == Method::POST || method == Method::PUT || method == Method::PATCH {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = ApiErrorResponse::new("Content-Type must be application/json");
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Malformed JSON bodies become `400 Validation error` envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| AppError::validation(err.to_string()).into())
}

/// Form owned by `admin`; a missing form and a foreign form both read as
/// "Access denied".
pub async fn require_form_access(
    catalog: &dyn FormCatalog,
    admin: &AdminUser,
    form_id: Uuid,
) -> Result<Form, AppError> {
    match catalog.find_form(form_id).await? {
        Some(form) if form.is_owned_by(admin.id()) => Ok(form),
        _ => Err(AppError::access_denied()),
    }
}

/// Form owned by `admin`; 404 when missing, 403 when foreign.
pub async fn require_owned_form(
    catalog: &dyn FormCatalog,
    admin: &AdminUser,
    form_id: Uuid,
) -> Result<Form, AppError> {
    let form = catalog.find_form(form_id).await?.ok_or(AppError::NotFound("Form"))?;
    if !form.is_owned_by(admin.id()) {
        return Err(AppError::access_denied());
    }
    Ok(form)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Form Builder API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Configure `/api` routes. Expects `web::Data<dyn FormCatalog>`,
/// `web::Data<TokenService>` and `web::Data<LoginThrottle>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth_handlers::register))
                    .route("/login", web::post().to(auth_handlers::login))
                    .route("/me", web::get().to(auth_handlers::me)),
            )
            .service(
                web::scope("/forms")
                    .route("", web::post().to(form_handlers::create))
                    .route("", web::get().to(form_handlers::list))
                    .route("/{id}", web::get().to(form_handlers::read))
                    .route("/{id}", web::put().to(form_handlers::update))
                    .route("/{id}", web::delete().to(form_handlers::delete))
                    .route("/{id}/publish", web::patch().to(form_handlers::publish)),
            )
            // /reorder BEFORE /{id} to avoid routing conflict
            .service(
                web::scope("/questions")
                    .route("", web::post().to(question_handlers::create))
                    .route("/reorder", web::patch().to(question_handlers::reorder))
                    .route("/form/{form_id}", web::get().to(question_handlers::list_for_form))
                    .route("/{id}", web::put().to(question_handlers::update))
                    .route("/{id}", web::delete().to(question_handlers::delete)),
            )
            .service(
                web::scope("/responses")
                    .route("", web::post().to(response_handlers::submit))
                    .route("/form/{form_id}", web::get().to(response_handlers::list_for_form))
                    .route("/form/{form_id}/stats", web::get().to(response_handlers::stats))
                    .route("/{id}", web::get().to(response_handlers::read))
                    .route("/{id}", web::delete().to(response_handlers::delete)),
            )
            .service(
                web::scope("/export")
                    .route("/table/{form_id}", web::get().to(export_handlers::table))
                    .route("/csv/{form_id}", web::get().to(export_handlers::csv))
                    .route("/html/{form_id}", web::get().to(export_handlers::html)),
            ),
    );
}
