use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{Question, QuestionType};

/// Value of one answer: a single string (text, choice, scale) or a list
/// of strings (checkbox). Untagged on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Scalar(String),
    MultiSelect(Vec<String>),
}

impl AnswerValue {
    /// An empty string or an empty list counts as "not answered".
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Scalar(s) => s.is_empty(),
            AnswerValue::MultiSelect(items) => items.is_empty(),
        }
    }

    /// Every individual value string carried by this answer.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerValue::Scalar(s) => vec![s.as_str()],
            AnswerValue::MultiSelect(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Flat rendering for exports; lists are joined with ", ".
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Scalar(s) => s.clone(),
            AnswerValue::MultiSelect(items) => items.join(", "),
        }
    }
}

/// One `{questionId, value}` pair of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub value: AnswerValue,
}

/// Response row without its answers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: Uuid,
    pub form_id: Uuid,
    pub responder_id: Option<Uuid>,
    pub responder_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Question metadata attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub order: i32,
}

impl From<&Question> for QuestionSummary {
    fn from(q: &Question) -> Self {
        QuestionSummary {
            id: q.id,
            title: q.title.clone(),
            question_type: q.question_type,
            order: q.order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub id: Uuid,
    pub response_id: Uuid,
    pub question_id: Uuid,
    pub value: AnswerValue,
    pub question: QuestionSummary,
}

/// Registered user who submitted a response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponderSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Response with responder info and answers in submission order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetail {
    #[serde(flatten)]
    pub response: Response,
    pub responder: Option<ResponderSummary>,
    pub answers: Vec<AnswerDetail>,
}

impl ResponseDetail {
    pub fn answer_for(&self, question_id: Uuid) -> Option<&AnswerDetail> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }
}

/// Accepted submission ready to be written as one unit.
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub form_id: Uuid,
    pub responder_id: Option<Uuid>,
    pub responder_name: Option<String>,
    pub answers: Vec<SubmittedAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_value_wire_shape() {
        let scalar: AnswerValue = serde_json::from_str("\"Islam\"").unwrap();
        assert_eq!(scalar, AnswerValue::Scalar("Islam".to_string()));

        let multi: AnswerValue = serde_json::from_str("[\"A\",\"B\"]").unwrap();
        assert_eq!(multi, AnswerValue::MultiSelect(vec!["A".to_string(), "B".to_string()]));

        assert!(serde_json::from_str::<AnswerValue>("42").is_err());
    }

    #[test]
    fn test_empty_values_count_as_unanswered() {
        assert!(AnswerValue::Scalar(String::new()).is_empty());
        assert!(AnswerValue::MultiSelect(vec![]).is_empty());
        assert!(!AnswerValue::Scalar(" ".to_string()).is_empty());
    }

    #[test]
    fn test_display_joins_lists() {
        let v = AnswerValue::MultiSelect(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(v.display(), "A, B");
        assert_eq!(v.values(), vec!["A", "B"]);
    }
}
