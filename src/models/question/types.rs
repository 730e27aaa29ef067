use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    ShortText,
    LongText,
    MultipleChoice,
    Checkbox,
    LinearScale,
    SectionHeader,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortText => "SHORT_TEXT",
            QuestionType::LongText => "LONG_TEXT",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::Checkbox => "CHECKBOX",
            QuestionType::LinearScale => "LINEAR_SCALE",
            QuestionType::SectionHeader => "SECTION_HEADER",
        }
    }

    pub fn parse(value: &str) -> Option<QuestionType> {
        match value {
            "SHORT_TEXT" => Some(QuestionType::ShortText),
            "LONG_TEXT" => Some(QuestionType::LongText),
            "MULTIPLE_CHOICE" => Some(QuestionType::MultipleChoice),
            "CHECKBOX" => Some(QuestionType::Checkbox),
            "LINEAR_SCALE" => Some(QuestionType::LinearScale),
            "SECTION_HEADER" => Some(QuestionType::SectionHeader),
            _ => None,
        }
    }

    /// Section headers hold no value; every other type can be answered.
    pub fn is_answerable(&self) -> bool {
        !matches!(self, QuestionType::SectionHeader)
    }

    pub fn uses_choices(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::Checkbox)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub form_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create-question request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub form_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub is_required: bool,
    pub order: i32,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub is_required: Option<bool>,
    pub order: Option<i32>,
    pub options: Option<Vec<String>>,
}

impl QuestionPatch {
    pub fn apply(&self, question: &mut Question) {
        if let Some(title) = &self.title {
            question.title = title.clone();
        }
        if let Some(v) = &self.description {
            question.description = crate::models::form::non_empty(v);
        }
        if let Some(v) = self.question_type {
            question.question_type = v;
        }
        if let Some(v) = self.is_required {
            question.is_required = v;
        }
        if let Some(v) = self.order {
            question.order = v;
        }
        if let Some(v) = &self.options {
            question.options = v.clone();
        }
        question.updated_at = Utc::now();
    }
}

/// One entry of a bulk reorder request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuestionOrder {
    pub id: Uuid,
    pub order: i32,
}

/// Decoded linear-scale options: `[minValue, maxValue, minLabel, maxLabel]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleBounds {
    pub min: i64,
    pub max: i64,
    pub min_label: String,
    pub max_label: String,
}

impl ScaleBounds {
    pub fn from_options(options: &[String]) -> Option<ScaleBounds> {
        match options {
            [min, max, min_label, max_label] => Some(ScaleBounds {
                min: min.trim().parse().ok()?,
                max: max.trim().parse().ok()?,
                min_label: min_label.clone(),
                max_label: max_label.clone(),
            }),
            _ => None,
        }
    }
}
