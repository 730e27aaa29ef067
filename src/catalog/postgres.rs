use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::{FormCatalog, duplicate_email, duplicate_order};
use crate::errors::AppError;
use crate::models::form::{Form, FormDetail, FormPatch, NewForm, non_empty};
use crate::models::question::{NewQuestion, Question, QuestionOrder, QuestionPatch, QuestionType};
use crate::models::response::{
    AnswerDetail, AnswerValue, NewResponse, QuestionSummary, ResponderSummary, Response,
    ResponseDetail,
};
use crate::models::user::{NewUser, Role, User};

const SELECT_FORM: &str = "\
    SELECT id, title, description, is_published, header_image, logo_url, theme_color, \
           created_by_id, created_at, updated_at \
    FROM forms";

const SELECT_QUESTION: &str = "\
    SELECT id, form_id, title, description, question_type, is_required, sort_order, options, \
           created_at, updated_at \
    FROM questions";

const SELECT_RESPONSE: &str = "\
    SELECT r.id, r.form_id, r.responder_id, r.responder_name, r.created_at, \
           u.name AS user_name, u.email AS user_email \
    FROM responses r \
    LEFT JOIN users u ON u.id = r.responder_id";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| AppError::Internal(format!("unknown role '{}'", row.role)))?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    is_published: bool,
    header_image: Option<String>,
    logo_url: Option<String>,
    theme_color: Option<String>,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Form {
            id: row.id,
            title: row.title,
            description: row.description,
            is_published: row.is_published,
            header_image: row.header_image,
            logo_url: row.logo_url,
            theme_color: row.theme_color,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    form_id: Uuid,
    title: String,
    description: Option<String>,
    question_type: String,
    is_required: bool,
    sort_order: i32,
    options: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_question_type(value: &str) -> Result<QuestionType, AppError> {
    QuestionType::parse(value)
        .ok_or_else(|| AppError::Internal(format!("unknown question type '{value}'")))
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: row.id,
            form_id: row.form_id,
            title: row.title,
            description: row.description,
            question_type: parse_question_type(&row.question_type)?,
            is_required: row.is_required,
            order: row.sort_order,
            options: row.options,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: Uuid,
    form_id: Uuid,
    responder_id: Option<Uuid>,
    responder_name: Option<String>,
    created_at: DateTime<Utc>,
    user_name: Option<String>,
    user_email: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: Uuid,
    response_id: Uuid,
    question_id: Uuid,
    value: Json<AnswerValue>,
    question_title: String,
    question_type: String,
    question_order: i32,
}

/// Map a unique-constraint violation to a friendlier error.
fn on_unique_violation(err: sqlx::Error, mapped: AppError) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => mapped,
        _ => AppError::Db(err),
    }
}

/// PostgreSQL-backed catalog.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach responder info and answers to a batch of response rows,
    /// keeping the batch order.
    async fn hydrate(&self, rows: Vec<ResponseRow>) -> Result<Vec<ResponseDetail>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let answer_rows = sqlx::query_as::<_, AnswerRow>(
            "SELECT a.id, a.response_id, a.question_id, a.value, \
                    q.title AS question_title, q.question_type, q.sort_order AS question_order \
             FROM answers a \
             JOIN questions q ON q.id = a.question_id \
             WHERE a.response_id = ANY($1) \
             ORDER BY a.response_id, a.position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_response: HashMap<Uuid, Vec<AnswerDetail>> = HashMap::new();
        for row in answer_rows {
            let detail = AnswerDetail {
                id: row.id,
                response_id: row.response_id,
                question_id: row.question_id,
                value: row.value.0,
                question: QuestionSummary {
                    id: row.question_id,
                    title: row.question_title,
                    question_type: parse_question_type(&row.question_type)?,
                    order: row.question_order,
                },
            };
            by_response.entry(row.response_id).or_default().push(detail);
        }

        let details = rows
            .into_iter()
            .map(|row| {
                let responder = match (row.responder_id, row.user_name, row.user_email) {
                    (Some(id), Some(name), Some(email)) => Some(ResponderSummary { id, name, email }),
                    _ => None,
                };
                ResponseDetail {
                    answers: by_response.remove(&row.id).unwrap_or_default(),
                    responder,
                    response: Response {
                        id: row.id,
                        form_id: row.form_id,
                        responder_id: row.responder_id,
                        responder_name: row.responder_name,
                        created_at: row.created_at,
                    },
                }
            })
            .collect();
        Ok(details)
    }
}

#[async_trait]
impl FormCatalog for PgCatalog {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, name, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, email, name, password_hash, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, duplicate_email()))?;
        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at \
             FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn create_form(&self, owner_id: Uuid, new_form: NewForm) -> Result<Form, AppError> {
        let row = sqlx::query_as::<_, FormRow>(
            "INSERT INTO forms (id, title, description, is_published, header_image, logo_url, \
                                theme_color, created_by_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, title, description, is_published, header_image, logo_url, theme_color, \
                       created_by_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_form.title)
        .bind(new_form.description.as_deref().and_then(non_empty))
        .bind(new_form.is_published)
        .bind(new_form.header_image.as_deref().and_then(non_empty))
        .bind(new_form.logo_url.as_deref().and_then(non_empty))
        .bind(new_form.theme_color.as_deref().and_then(non_empty))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<_, FormRow>(&format!("{SELECT_FORM} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Form::from))
    }

    async fn list_forms_by_owner(&self, owner_id: Uuid) -> Result<Vec<FormDetail>, AppError> {
        let rows = sqlx::query_as::<_, FormRow>(&format!(
            "{SELECT_FORM} WHERE created_by_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut forms = Vec::with_capacity(rows.len());
        for row in rows {
            let form = Form::from(row);
            let questions = self.list_questions(form.id).await?;
            let response_count = self.count_responses(form.id).await?;
            forms.push(FormDetail { form, questions, response_count });
        }
        Ok(forms)
    }

    async fn update_form(&self, id: Uuid, patch: &FormPatch) -> Result<Form, AppError> {
        // The row lock serializes concurrent patches of the same form.
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, FormRow>(&format!("{SELECT_FORM} WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut form = row.map(Form::from).ok_or(AppError::NotFound("Form"))?;
        patch.apply(&mut form);

        let row = sqlx::query_as::<_, FormRow>(
            "UPDATE forms SET title = $1, description = $2, is_published = $3, \
                    header_image = $4, logo_url = $5, theme_color = $6, updated_at = NOW() \
             WHERE id = $7 \
             RETURNING id, title, description, is_published, header_image, logo_url, theme_color, \
                       created_by_id, created_at, updated_at",
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.is_published)
        .bind(&form.header_image)
        .bind(&form.logo_url)
        .bind(&form.theme_color)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_form(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Form"));
        }
        Ok(())
    }

    async fn list_questions(&self, form_id: Uuid) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_QUESTION} WHERE form_id = $1 ORDER BY sort_order ASC"
        ))
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Question::try_from).collect()
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!("{SELECT_QUESTION} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Question::try_from).transpose()
    }

    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError> {
        let order = new_question.order;
        let row = sqlx::query_as::<_, QuestionRow>(
            "INSERT INTO questions (id, form_id, title, description, question_type, is_required, \
                                    sort_order, options) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, form_id, title, description, question_type, is_required, sort_order, \
                       options, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_question.form_id)
        .bind(&new_question.title)
        .bind(new_question.description.as_deref().and_then(non_empty))
        .bind(new_question.question_type.as_str())
        .bind(new_question.is_required)
        .bind(order)
        .bind(&new_question.options)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| on_unique_violation(e, duplicate_order(order)))?;
        row.try_into()
    }

    async fn update_question(&self, id: Uuid, patch: &QuestionPatch) -> Result<Question, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "{SELECT_QUESTION} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut question = row
            .map(Question::try_from)
            .transpose()?
            .ok_or(AppError::NotFound("Question"))?;
        patch.apply(&mut question);

        let row = sqlx::query_as::<_, QuestionRow>(
            "UPDATE questions SET title = $1, description = $2, question_type = $3, \
                    is_required = $4, sort_order = $5, options = $6, updated_at = NOW() \
             WHERE id = $7 \
             RETURNING id, form_id, title, description, question_type, is_required, sort_order, \
                       options, created_at, updated_at",
        )
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.question_type.as_str())
        .bind(question.is_required)
        .bind(question.order)
        .bind(&question.options)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        // The order constraint is deferred, so a collision surfaces at commit.
        tx.commit()
            .await
            .map_err(|e| on_unique_violation(e, duplicate_order(question.order)))?;
        row.try_into()
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Question"));
        }
        Ok(())
    }

    async fn reorder_questions(&self, orders: &[QuestionOrder]) -> Result<(), AppError> {
        // The (form_id, sort_order) constraint is deferred, so swaps settle at commit.
        let mut tx = self.pool.begin().await?;
        for entry in orders {
            let result = sqlx::query(
                "UPDATE questions SET sort_order = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(entry.order)
            .bind(entry.id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Question"));
            }
        }
        tx.commit().await.map_err(|e| {
            on_unique_violation(e, AppError::validation("Question orders must be unique per form"))
        })?;
        Ok(())
    }

    async fn create_response(&self, new_response: NewResponse) -> Result<ResponseDetail, AppError> {
        let response_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO responses (id, form_id, responder_id, responder_name) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(response_id)
        .bind(new_response.form_id)
        .bind(new_response.responder_id)
        .bind(new_response.responder_name.as_deref().and_then(non_empty))
        .execute(&mut *tx)
        .await?;

        // The SELECT only yields a row when the question belongs to this form.
        for (position, answer) in new_response.answers.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO answers (id, response_id, question_id, position, value) \
                 SELECT $1, $2, q.id, $4, $5 FROM questions q \
                 WHERE q.id = $3 AND q.form_id = $6",
            )
            .bind(Uuid::new_v4())
            .bind(response_id)
            .bind(answer.question_id)
            .bind(position as i32)
            .bind(Json(&answer.value))
            .bind(new_response.form_id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back the response row.
                return Err(AppError::Internal(format!(
                    "answer references question {} outside form {}",
                    answer.question_id, new_response.form_id
                )));
            }
        }

        tx.commit().await?;

        self.find_response(response_id)
            .await?
            .ok_or_else(|| AppError::Internal("response vanished after insert".to_string()))
    }

    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<ResponseDetail>, AppError> {
        let rows = sqlx::query_as::<_, ResponseRow>(&format!(
            "{SELECT_RESPONSE} WHERE r.form_id = $1 ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn find_response(&self, id: Uuid) -> Result<Option<ResponseDetail>, AppError> {
        let row = sqlx::query_as::<_, ResponseRow>(&format!("{SELECT_RESPONSE} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.into_iter().next())
    }

    async fn delete_response(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM responses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Response"));
        }
        Ok(())
    }

    async fn count_responses(&self, form_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE form_id = $1")
            .bind(form_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
