use std::collections::HashSet;

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extract::AdminUser;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::handlers::api::ApiResponse;
use crate::handlers::{require_form_access, require_owned_form};
use crate::models::question::validate::validate_definition;
use crate::models::question::{NewQuestion, Question, QuestionOrder, QuestionPatch};

/// Load a question and check the caller owns its form. 404 when missing.
async fn owned_question(
    catalog: &dyn FormCatalog,
    admin: &AdminUser,
    id: Uuid,
) -> Result<Question, AppError> {
    let question = catalog.find_question(id).await?.ok_or(AppError::NotFound("Question"))?;
    require_owned_form(catalog, admin, question.form_id).await?;
    Ok(question)
}

/// POST /api/questions
pub async fn create(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    body: web::Json<NewQuestion>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let errors = validate_definition(&body.title, body.question_type, body.order, &body.options);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    require_form_access(catalog.get_ref(), &admin, body.form_id).await?;
    let question = catalog.create_question(body).await?;

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        "Question created successfully",
        question,
    )))
}

/// GET /api/questions/form/{form_id} - Questions in display order
pub async fn list_for_form(
    catalog: web::Data<dyn FormCatalog>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let questions = catalog.list_questions(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::data(questions)))
}

/// PUT /api/questions/{id}
pub async fn update(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<QuestionPatch>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = body.into_inner();

    let current = owned_question(catalog.get_ref(), &admin, id).await?;

    // Validate the question as it would look after the patch.
    let mut preview = current.clone();
    patch.apply(&mut preview);
    let errors = validate_definition(&preview.title, preview.question_type, preview.order, &preview.options);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let question = catalog.update_question(id, &patch).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        "Question updated successfully",
        question,
    )))
}

/// DELETE /api/questions/{id}
pub async fn delete(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    owned_question(catalog.get_ref(), &admin, id).await?;
    catalog.delete_question(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Question deleted successfully")))
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub questions: Vec<QuestionOrder>,
}

/// PATCH /api/questions/reorder - Apply all new orders atomically
pub async fn reorder(
    catalog: web::Data<dyn FormCatalog>,
    admin: AdminUser,
    body: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let orders = body.into_inner().questions;

    if orders.iter().any(|o| o.order < 0) {
        return Err(AppError::validation("Order must be zero or greater"));
    }
    let mut seen = HashSet::new();
    if !orders.iter().all(|o| seen.insert(o.id)) {
        return Err(AppError::validation("Each question may appear only once"));
    }

    for entry in &orders {
        owned_question(catalog.get_ref(), &admin, entry.id).await?;
    }
    catalog.reorder_questions(&orders).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Questions reordered successfully")))
}
