//! Per-question answer tallies for the admin dashboard.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::FormCatalog;
use crate::errors::AppError;
use crate::models::question::QuestionType;
use crate::models::response::ResponseDetail;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStat {
    pub question_id: Uuid,
    pub question_title: String,
    pub question_type: QuestionType,
    /// Number of answer records, not number of distinct values.
    pub total_answers: u64,
    pub answers: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatistics {
    pub total_responses: u64,
    pub question_stats: Vec<QuestionStat>,
}

/// Tally every answer of `responses`.
///
/// Entries appear in the order their question is first met while scanning,
/// and questions nobody answered are left out. Checkbox answers add one to
/// each selected value. Values are compared verbatim.
pub fn tally(responses: &[ResponseDetail]) -> FormStatistics {
    let mut question_stats: Vec<QuestionStat> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for response in responses {
        for answer in &response.answers {
            let slot = *index.entry(answer.question_id).or_insert_with(|| {
                question_stats.push(QuestionStat {
                    question_id: answer.question_id,
                    question_title: answer.question.title.clone(),
                    question_type: answer.question.question_type,
                    total_answers: 0,
                    answers: BTreeMap::new(),
                });
                question_stats.len() - 1
            });

            let stat = &mut question_stats[slot];
            stat.total_answers += 1;
            for value in answer.value.values() {
                *stat.answers.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }

    FormStatistics {
        total_responses: responses.len() as u64,
        question_stats,
    }
}

/// Statistics for one form, scanning responses oldest first.
pub async fn form_statistics(
    catalog: &dyn FormCatalog,
    form_id: Uuid,
) -> Result<FormStatistics, AppError> {
    let mut responses = catalog.list_responses(form_id).await?;
    responses.reverse();
    Ok(tally(&responses))
}
