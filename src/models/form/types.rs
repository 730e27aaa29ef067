use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::Question;

/// A form row without its questions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub header_image: Option<String>,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by_id == user_id
    }
}

/// Form with its questions (ascending `order`) and response count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDetail {
    #[serde(flatten)]
    pub form: Form,
    pub questions: Vec<Question>,
    pub response_count: i64,
}

/// Create-form request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub theme_color: Option<String>,
}

/// Partial update. Absent fields are left unchanged; an empty string
/// clears an optional text field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub header_image: Option<String>,
    pub logo_url: Option<String>,
    pub theme_color: Option<String>,
}

impl FormPatch {
    pub fn publish(is_published: bool) -> Self {
        FormPatch { is_published: Some(is_published), ..Default::default() }
    }

    /// Apply the patch to an in-memory form.
    pub fn apply(&self, form: &mut Form) {
        if let Some(title) = &self.title {
            form.title = title.clone();
        }
        if let Some(v) = &self.description {
            form.description = non_empty(v);
        }
        if let Some(v) = self.is_published {
            form.is_published = v;
        }
        if let Some(v) = &self.header_image {
            form.header_image = non_empty(v);
        }
        if let Some(v) = &self.logo_url {
            form.logo_url = non_empty(v);
        }
        if let Some(v) = &self.theme_color {
            form.theme_color = non_empty(v);
        }
        form.updated_at = Utc::now();
    }
}

/// Normalise an optional text field: blank means "not set".
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
