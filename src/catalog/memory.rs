use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{FormCatalog, duplicate_email, duplicate_order};
use crate::errors::AppError;
use crate::models::form::{Form, FormDetail, FormPatch, NewForm, non_empty};
use crate::models::question::{NewQuestion, Question, QuestionOrder, QuestionPatch};
use crate::models::response::{
    AnswerDetail, NewResponse, QuestionSummary, ResponderSummary, Response, ResponseDetail,
    SubmittedAnswer,
};
use crate::models::user::{NewUser, User};

struct StoredResponse {
    seq: u64,
    response: Response,
    answers: Vec<(Uuid, SubmittedAnswer)>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    forms: HashMap<Uuid, Form>,
    questions: HashMap<Uuid, Question>,
    responses: Vec<StoredResponse>,
    next_seq: u64,
}

impl State {
    fn order_taken(&self, form_id: Uuid, order: i32, except: Option<Uuid>) -> bool {
        self.questions
            .values()
            .any(|q| q.form_id == form_id && q.order == order && Some(q.id) != except)
    }

    fn questions_of(&self, form_id: Uuid) -> Vec<Question> {
        let mut questions: Vec<Question> = self
            .questions
            .values()
            .filter(|q| q.form_id == form_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.order);
        questions
    }

    fn response_count(&self, form_id: Uuid) -> i64 {
        self.responses.iter().filter(|r| r.response.form_id == form_id).count() as i64
    }

    fn detail(&self, stored: &StoredResponse) -> ResponseDetail {
        let responder = stored
            .response
            .responder_id
            .and_then(|id| self.users.get(&id))
            .map(|u| ResponderSummary { id: u.id, name: u.name.clone(), email: u.email.clone() });

        // Answers whose question was deleted go with it.
        let answers = stored
            .answers
            .iter()
            .filter_map(|(answer_id, answer)| {
                let question = self.questions.get(&answer.question_id)?;
                Some(AnswerDetail {
                    id: *answer_id,
                    response_id: stored.response.id,
                    question_id: answer.question_id,
                    value: answer.value.clone(),
                    question: QuestionSummary::from(question),
                })
            })
            .collect();

        ResponseDetail { response: stored.response.clone(), responder, answers }
    }
}

/// Catalog held entirely in process memory. One lock guards all tables, so
/// a response and its answers always land together.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FormCatalog for MemoryCatalog {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut state = self.lock();
        if state.users.values().any(|u| u.email.eq_ignore_ascii_case(&new_user.email)) {
            return Err(duplicate_email());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_form(&self, owner_id: Uuid, new_form: NewForm) -> Result<Form, AppError> {
        let mut state = self.lock();
        if !state.users.contains_key(&owner_id) {
            return Err(AppError::NotFound("User"));
        }
        let now = Utc::now();
        let form = Form {
            id: Uuid::new_v4(),
            title: new_form.title,
            description: new_form.description.as_deref().and_then(non_empty),
            is_published: new_form.is_published,
            header_image: new_form.header_image.as_deref().and_then(non_empty),
            logo_url: new_form.logo_url.as_deref().and_then(non_empty),
            theme_color: new_form.theme_color.as_deref().and_then(non_empty),
            created_by_id: owner_id,
            created_at: now,
            updated_at: now,
        };
        state.forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        Ok(self.lock().forms.get(&id).cloned())
    }

    async fn list_forms_by_owner(&self, owner_id: Uuid) -> Result<Vec<FormDetail>, AppError> {
        let state = self.lock();
        let mut forms: Vec<FormDetail> = state
            .forms
            .values()
            .filter(|f| f.created_by_id == owner_id)
            .map(|f| FormDetail {
                form: f.clone(),
                questions: state.questions_of(f.id),
                response_count: state.response_count(f.id),
            })
            .collect();
        forms.sort_by(|a, b| b.form.created_at.cmp(&a.form.created_at));
        Ok(forms)
    }

    async fn update_form(&self, id: Uuid, patch: &FormPatch) -> Result<Form, AppError> {
        let mut state = self.lock();
        let form = state.forms.get_mut(&id).ok_or(AppError::NotFound("Form"))?;
        patch.apply(form);
        Ok(form.clone())
    }

    async fn delete_form(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.lock();
        if state.forms.remove(&id).is_none() {
            return Err(AppError::NotFound("Form"));
        }
        state.questions.retain(|_, q| q.form_id != id);
        state.responses.retain(|r| r.response.form_id != id);
        Ok(())
    }

    async fn list_questions(&self, form_id: Uuid) -> Result<Vec<Question>, AppError> {
        Ok(self.lock().questions_of(form_id))
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, AppError> {
        Ok(self.lock().questions.get(&id).cloned())
    }

    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, AppError> {
        let mut state = self.lock();
        if !state.forms.contains_key(&new_question.form_id) {
            return Err(AppError::NotFound("Form"));
        }
        if state.order_taken(new_question.form_id, new_question.order, None) {
            return Err(duplicate_order(new_question.order));
        }
        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            form_id: new_question.form_id,
            title: new_question.title,
            description: new_question.description.as_deref().and_then(non_empty),
            question_type: new_question.question_type,
            is_required: new_question.is_required,
            order: new_question.order,
            options: new_question.options,
            created_at: now,
            updated_at: now,
        };
        state.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn update_question(&self, id: Uuid, patch: &QuestionPatch) -> Result<Question, AppError> {
        let mut state = self.lock();
        let current = state.questions.get(&id).ok_or(AppError::NotFound("Question"))?;
        if let Some(order) = patch.order {
            if state.order_taken(current.form_id, order, Some(id)) {
                return Err(duplicate_order(order));
            }
        }
        let question = state.questions.get_mut(&id).ok_or(AppError::NotFound("Question"))?;
        patch.apply(question);
        Ok(question.clone())
    }

    async fn delete_question(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.lock();
        if state.questions.remove(&id).is_none() {
            return Err(AppError::NotFound("Question"));
        }
        for stored in &mut state.responses {
            stored.answers.retain(|(_, a)| a.question_id != id);
        }
        Ok(())
    }

    async fn reorder_questions(&self, orders: &[QuestionOrder]) -> Result<(), AppError> {
        let mut state = self.lock();

        // Stage the result first; nothing is written unless all of it holds.
        let mut staged: HashMap<Uuid, i32> =
            state.questions.values().map(|q| (q.id, q.order)).collect();
        for entry in orders {
            let slot = staged.get_mut(&entry.id).ok_or(AppError::NotFound("Question"))?;
            *slot = entry.order;
        }
        let mut seen: HashMap<(Uuid, i32), Uuid> = HashMap::new();
        for (id, order) in &staged {
            let form_id = state.questions[id].form_id;
            if seen.insert((form_id, *order), *id).is_some() {
                return Err(duplicate_order(*order));
            }
        }

        let now = Utc::now();
        for entry in orders {
            if let Some(q) = state.questions.get_mut(&entry.id) {
                q.order = entry.order;
                q.updated_at = now;
            }
        }
        Ok(())
    }

    async fn create_response(&self, new_response: NewResponse) -> Result<ResponseDetail, AppError> {
        let mut state = self.lock();
        if !state.forms.contains_key(&new_response.form_id) {
            return Err(AppError::NotFound("Form"));
        }
        // Every answer must point at a question of this same form.
        if let Some(stray) = new_response.answers.iter().find(|a| {
            state
                .questions
                .get(&a.question_id)
                .is_none_or(|q| q.form_id != new_response.form_id)
        }) {
            return Err(AppError::Internal(format!(
                "answer references question {} outside form {}",
                stray.question_id, new_response.form_id
            )));
        }
        let responder_id = new_response.responder_id.filter(|id| state.users.contains_key(id));

        let seq = state.next_seq;
        state.next_seq += 1;
        let stored = StoredResponse {
            seq,
            response: Response {
                id: Uuid::new_v4(),
                form_id: new_response.form_id,
                responder_id,
                responder_name: new_response.responder_name.as_deref().and_then(non_empty),
                created_at: Utc::now(),
            },
            answers: new_response.answers.into_iter().map(|a| (Uuid::new_v4(), a)).collect(),
        };
        let detail = state.detail(&stored);
        state.responses.push(stored);
        Ok(detail)
    }

    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<ResponseDetail>, AppError> {
        let state = self.lock();
        let mut matching: Vec<&StoredResponse> = state
            .responses
            .iter()
            .filter(|r| r.response.form_id == form_id)
            .collect();
        matching.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(matching.into_iter().map(|r| state.detail(r)).collect())
    }

    async fn find_response(&self, id: Uuid) -> Result<Option<ResponseDetail>, AppError> {
        let state = self.lock();
        Ok(state
            .responses
            .iter()
            .find(|r| r.response.id == id)
            .map(|r| state.detail(r)))
    }

    async fn delete_response(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.lock();
        let before = state.responses.len();
        state.responses.retain(|r| r.response.id != id);
        if state.responses.len() == before {
            return Err(AppError::NotFound("Response"));
        }
        Ok(())
    }

    async fn count_responses(&self, form_id: Uuid) -> Result<i64, AppError> {
        Ok(self.lock().response_count(form_id))
    }
}
