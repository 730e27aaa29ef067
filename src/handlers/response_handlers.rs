use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::extract::{AdminUser, BearerToken};
use crate::auth::token::TokenService;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::handlers::api::ApiResponse;
use crate::handlers::{require_form_access, require_owned_form};
use crate::models::response::ResponseDetail;
use crate::stats;
use crate::submission::{self, Submission};

/// POST /api/responses - Public submission to a published form.
/// A bearer token, when valid, links the response to its user.
pub async fn submit(
    catalog: web::Data<dyn FormCatalog>,
    tokens: web::Data<TokenService>,
    bearer: BearerToken,
    body: web::Json<Submission>,
) -> Result<HttpResponse, AppError> {
    let accepted = submission::validate_submission(
        catalog.get_ref(),
        tokens.get_ref(),
        body.into_inner(),
        bearer.as_deref(),
    )
    .await?;

    let response = catalog.create_response(accepted.into()).await?;
    log::info!(
        "Response {} recorded for form {} ({} answers)",
        response.response.id,
        response.response.form_id,
        response.answers.len()
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "Response submitted successfully",
        response,
    )))
}

/// GET /api/responses/form/{form_id} - Newest first
pub async fn list_for_form(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let form = require_form_access(catalog.get_ref(), &admin, path.into_inner()).await?;
    let responses = catalog.list_responses(form.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(responses)))
}

/// Load a response and check the caller owns its form. 404 when missing.
async fn owned_response(
    catalog: &dyn FormCatalog,
    admin: &AdminUser,
    id: Uuid,
) -> Result<ResponseDetail, AppError> {
    let response = catalog.find_response(id).await?.ok_or(AppError::NotFound("Response"))?;
    require_owned_form(catalog, admin, response.response.form_id).await?;
    Ok(response)
}

/// GET /api/responses/{id}
pub async fn read(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let response = owned_response(catalog.get_ref(), &admin, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(response)))
}

/// DELETE /api/responses/{id}
pub async fn delete(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    owned_response(catalog.get_ref(), &admin, id).await?;
    catalog.delete_response(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Response deleted successfully")))
}

/// GET /api/responses/form/{form_id}/stats - Owner-only tallies
pub async fn stats(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let form = require_form_access(catalog.get_ref(), &admin, path.into_inner()).await?;
    let statistics = stats::form_statistics(catalog.get_ref(), form.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(statistics)))
}
