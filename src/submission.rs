//! Acceptance check for a submitted answer set.
//!
//! A submission is accepted when the form exists, is published, and every
//! required answerable question has a non-empty answer. Everything else
//! about the answers is taken as given: unknown question ids and value
//! shapes that do not match the question type pass through untouched.

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::auth::token::TokenService;
use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::models::question::Question;
use crate::models::response::{NewResponse, SubmittedAnswer};

/// Submit-response request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub responder_name: Option<String>,
}

/// A submission that passed validation, answers unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedSubmission {
    pub form_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
    pub responder_id: Option<Uuid>,
    pub responder_name: Option<String>,
}

impl From<AcceptedSubmission> for NewResponse {
    fn from(a: AcceptedSubmission) -> Self {
        NewResponse {
            form_id: a.form_id,
            responder_id: a.responder_id,
            responder_name: a.responder_name,
            answers: a.answers,
        }
    }
}

/// Fail with the first required question (lowest `order`) that has no
/// non-empty answer. Section headers are never required.
pub fn check_required(questions: &[Question], answers: &[SubmittedAnswer]) -> Result<(), AppError> {
    let answered: HashSet<Uuid> = answers
        .iter()
        .filter(|a| !a.value.is_empty())
        .map(|a| a.question_id)
        .collect();

    let mut required: Vec<&Question> = questions
        .iter()
        .filter(|q| q.is_required && q.question_type.is_answerable())
        .collect();
    required.sort_by_key(|q| q.order);

    match required.into_iter().find(|q| !answered.contains(&q.id)) {
        Some(missing) => Err(AppError::MissingRequiredAnswer(missing.title.clone())),
        None => Ok(()),
    }
}

/// Resolve the responder from an optional token. Anything short of a valid
/// token for an existing user yields an anonymous response, never an error.
async fn resolve_responder(
    catalog: &dyn FormCatalog,
    tokens: &TokenService,
    token: Option<&str>,
) -> Option<Uuid> {
    let claims = tokens.verify(token?).ok()?;
    match catalog.find_user(claims.sub).await {
        Ok(Some(user)) => Some(user.id),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Responder lookup failed, recording anonymously: {e}");
            None
        }
    }
}

/// Validate `submission` against its form.
pub async fn validate_submission(
    catalog: &dyn FormCatalog,
    tokens: &TokenService,
    submission: Submission,
    token: Option<&str>,
) -> Result<AcceptedSubmission, AppError> {
    let form = catalog
        .find_form(submission.form_id)
        .await?
        .ok_or(AppError::NotFound("Form"))?;

    if !form.is_published {
        return Err(AppError::FormClosed);
    }

    let questions = catalog.list_questions(form.id).await?;
    check_required(&questions, &submission.answers)?;

    let responder_id = resolve_responder(catalog, tokens, token).await;

    Ok(AcceptedSubmission {
        form_id: form.id,
        answers: submission.answers,
        responder_id,
        responder_name: submission.responder_name,
    })
}
