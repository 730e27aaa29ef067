use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::export::{self, ExportTable};
use crate::handlers::api::ApiResponse;
use crate::handlers::require_form_access;
use crate::models::form::Form;

async fn load_table(
    catalog: &dyn FormCatalog,
    admin: &AdminUser,
    form_id: Uuid,
) -> Result<(Form, ExportTable), AppError> {
    let form = require_form_access(catalog, admin, form_id).await?;
    let questions = catalog.list_questions(form.id).await?;
    let responses = catalog.list_responses(form.id).await?;
    let table = export::build_table(&form, &questions, &responses);
    Ok((form, table))
}

/// GET /api/export/table/{form_id} - Tabular export as JSON
pub async fn table(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (_, table) = load_table(catalog.get_ref(), &admin, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(table)))
}

/// GET /api/export/csv/{form_id} - Spreadsheet-friendly CSV download
pub async fn csv(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (form, table) = load_table(catalog.get_ref(), &admin, path.into_inner()).await?;
    let disposition = format!(
        "attachment; filename=\"{}_responses.csv\"",
        export::file_stem(&form.title)
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(export::render_csv(&table)))
}

/// GET /api/export/html/{form_id} - Print-friendly HTML download
pub async fn html(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (form, table) = load_table(catalog.get_ref(), &admin, path.into_inner()).await?;
    let body = export::render_html(&table, form.theme_color.as_deref());
    let disposition = format!(
        "attachment; filename=\"{}_responses.html\"",
        export::file_stem(&form.title)
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(body))
}
