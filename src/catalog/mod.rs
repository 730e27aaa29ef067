//! Persistence boundary for forms, questions, responses and users.
//!
//! Handlers, the submission validator and the statistics aggregator only see
//! `dyn FormCatalog`. Production runs on [`postgres::PgCatalog`]; tests and
//! `FORMULIR_IN_MEMORY=1` dev runs use [`memory::MemoryCatalog`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::form::{Form, FormDetail, FormPatch, NewForm};
use crate::models::question::{NewQuestion, Question, QuestionOrder, QuestionPatch};
use crate::models::response::{NewResponse, ResponseDetail};
use crate::models::user::{NewUser, User};

pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;

#[async_trait]
pub trait FormCatalog: Send + Sync {
    // Users

    /// Fails with a validation error when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    // Forms

    async fn create_form(&self, owner_id: Uuid, new_form: NewForm) -> Result<Form, AppError>;
    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError>;
    /// Forms owned by `owner_id`, newest first, with questions and counts.
    async fn list_forms_by_owner(&self, owner_id: Uuid) -> Result<Vec<FormDetail>, AppError>;
    async fn update_form(&self, id: Uuid, patch: &FormPatch) -> Result<Form, AppError>;
    /// Cascades to questions, responses and answers.
    async fn delete_form(&self, id: Uuid) -> Result<(), AppError>;

    // Questions

    /// Questions of a form in ascending `order`.
    async fn list_questions(&self, form_id: Uuid) -> Result<Vec<Question>, AppError>;
    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError>;
    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError>;
    async fn update_question(&self, id: Uuid, patch: &QuestionPatch) -> Result<Question, AppError>;
    async fn delete_question(&self, id: Uuid) -> Result<(), AppError>;
    /// Applies every new order or none of them.
    async fn reorder_questions(&self, orders: &[QuestionOrder]) -> Result<(), AppError>;

    // Responses

    /// Writes the response and all its answers as one unit.
    async fn create_response(&self, new_response: NewResponse) -> Result<ResponseDetail, AppError>;
    /// Responses of a form, newest first.
    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<ResponseDetail>, AppError>;
    async fn find_response(&self, id: Uuid) -> Result<Option<ResponseDetail>, AppError>;
    async fn delete_response(&self, id: Uuid) -> Result<(), AppError>;
    async fn count_responses(&self, form_id: Uuid) -> Result<i64, AppError>;

    /// Form with its ordered questions and response count.
    async fn find_form_detail(&self, id: Uuid) -> Result<Option<FormDetail>, AppError> {
        let Some(form) = self.find_form(id).await? else {
            return Ok(None);
        };
        let questions = self.list_questions(id).await?;
        let response_count = self.count_responses(id).await?;
        Ok(Some(FormDetail { form, questions, response_count }))
    }
}

pub(crate) fn duplicate_order(order: i32) -> AppError {
    AppError::validation(format!("Question order {order} is already used in this form"))
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::validation("Email is already registered")
}
