use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::{AdminUser, MaybeUser};
use crate::auth::validate;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::handlers::api::ApiResponse;
use crate::handlers::require_owned_form;
use crate::models::form::{FormPatch, NewForm};

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 5000;
const URL_MAX: usize = 2048;

fn validate_theme(
    header_image: Option<&str>,
    logo_url: Option<&str>,
    theme_color: Option<&str>,
) -> Vec<String> {
    [
        validate::validate_optional(header_image, "Header image", URL_MAX),
        validate::validate_optional(logo_url, "Logo URL", URL_MAX),
        validate::validate_theme_color(theme_color),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// POST /api/forms - Create a form owned by the caller
pub async fn create(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    body: web::Json<NewForm>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let mut errors: Vec<String> = validate::validate_required(&body.title, "Title", TITLE_MAX)
        .into_iter()
        .collect();
    errors.extend(validate::validate_optional(body.description.as_deref(), "Description", DESCRIPTION_MAX));
    errors.extend(validate_theme(
        body.header_image.as_deref(),
        body.logo_url.as_deref(),
        body.theme_color.as_deref(),
    ));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let form = catalog.create_form(admin.id(), body).await?;
    log::info!("Form {} created by {}", form.id, admin.0.email);
    let detail = catalog.find_form_detail(form.id).await?.ok_or(AppError::NotFound("Form"))?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message("Form created successfully", detail)))
}

/// GET /api/forms - Forms owned by the caller, newest first
pub async fn list(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let forms = catalog.list_forms_by_owner(admin.id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(forms)))
}

/// GET /api/forms/{id} - Public when published, owner-only otherwise
pub async fn read(
    catalog: web::Data<dyn FormCatalog>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let detail = catalog
        .find_form_detail(path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Form"))?;

    if !detail.form.is_published {
        match viewer.0 {
            None => return Err(AppError::AccessDenied("This form is not published".to_string())),
            Some(user) if !detail.form.is_owned_by(user.id) => return Err(AppError::access_denied()),
            Some(_) => {}
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::data(detail)))
}

/// PUT /api/forms/{id} - Partial update by the owner
pub async fn update(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<FormPatch>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    let patch = body.into_inner();

    let mut errors: Vec<String> = patch
        .title
        .as_deref()
        .and_then(|t| validate::validate_required(t, "Title", TITLE_MAX))
        .into_iter()
        .collect();
    errors.extend(validate::validate_optional(patch.description.as_deref(), "Description", DESCRIPTION_MAX));
    errors.extend(validate_theme(
        patch.header_image.as_deref(),
        patch.logo_url.as_deref(),
        patch.theme_color.as_deref(),
    ));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    require_owned_form(catalog.get_ref(), &admin, form_id).await?;
    catalog.update_form(form_id, &patch).await?;
    let detail = catalog.find_form_detail(form_id).await?.ok_or(AppError::NotFound("Form"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message("Form updated successfully", detail)))
}

/// DELETE /api/forms/{id} - Removes questions and responses with it
pub async fn delete(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    require_owned_form(catalog.get_ref(), &admin, form_id).await?;
    catalog.delete_form(form_id).await?;
    log::info!("Form {form_id} deleted by {}", admin.0.email);
    Ok(HttpResponse::Ok().json(ApiResponse::message("Form deleted successfully")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// PATCH /api/forms/{id}/publish - Set the flag, or toggle it when absent
pub async fn publish(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<PublishRequest>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    let form = require_owned_form(catalog.get_ref(), &admin, form_id).await?;

    let target = body.is_published.unwrap_or(!form.is_published);
    let updated = catalog.update_form(form_id, &FormPatch::publish(target)).await?;
    let message = if updated.is_published {
        "Form published successfully"
    } else {
        "Form unpublished successfully"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(message, updated)))
}
