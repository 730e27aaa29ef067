/// Integration tests for per-question statistics over stored responses.

use formulir::catalog::FormCatalog;
use formulir::models::question::QuestionType;
use formulir::models::response::{AnswerValue, NewResponse, SubmittedAnswer};
use formulir::stats::form_statistics;

mod common;
use common::{AGAMA_OPTIONS, add_question, create_form, setup_catalog};

async fn respond(catalog: &dyn FormCatalog, form_id: uuid::Uuid, answers: Vec<(uuid::Uuid, AnswerValue)>) {
    let new_response = NewResponse {
        form_id,
        responder_id: None,
        responder_name: None,
        answers: answers
            .into_iter()
            .map(|(question_id, value)| SubmittedAnswer { question_id, value })
            .collect(),
    };
    catalog.create_response(new_response).await.expect("store response");
}

fn multi(values: &[&str]) -> AnswerValue {
    AnswerValue::MultiSelect(values.iter().map(|s| s.to_string()).collect())
}

#[tokio::test]
async fn test_form_without_responses() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Survey", true).await;
    add_question(env.catalog(), &form, "Nama", QuestionType::ShortText, 0, false, &[]).await;

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    assert_eq!(stats.total_responses, 0);
    assert!(stats.question_stats.is_empty());
}

#[tokio::test]
async fn test_agama_single_response() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Data Diri", true).await;
    let agama = add_question(env.catalog(), &form, "Agama", QuestionType::MultipleChoice, 0, true, AGAMA_OPTIONS).await;

    respond(env.catalog(), form.id, vec![(agama.id, AnswerValue::Scalar("Islam".into()))]).await;

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    assert_eq!(stats.total_responses, 1);
    assert_eq!(stats.question_stats.len(), 1);
    let stat = &stats.question_stats[0];
    assert_eq!(stat.question_id, agama.id);
    assert_eq!(stat.question_title, "Agama");
    assert_eq!(stat.question_type, QuestionType::MultipleChoice);
    assert_eq!(stat.total_answers, 1);
    assert_eq!(stat.answers.len(), 1);
    assert_eq!(stat.answers.get("Islam"), Some(&1));
}

#[tokio::test]
async fn test_checkbox_tally() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Survey", true).await;
    let hobby = add_question(env.catalog(), &form, "Hobi", QuestionType::Checkbox, 0, false, &["A", "B"]).await;

    respond(env.catalog(), form.id, vec![(hobby.id, multi(&["A", "B"]))]).await;
    respond(env.catalog(), form.id, vec![(hobby.id, multi(&["B"]))]).await;

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    let stat = &stats.question_stats[0];
    assert_eq!(stat.total_answers, 2);
    assert_eq!(stat.answers.get("A"), Some(&1));
    assert_eq!(stat.answers.get("B"), Some(&2));
}

#[tokio::test]
async fn test_unanswered_questions_are_omitted() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Survey", true).await;
    let name = add_question(env.catalog(), &form, "Nama", QuestionType::ShortText, 0, false, &[]).await;
    let note = add_question(env.catalog(), &form, "Catatan", QuestionType::LongText, 1, false, &[]).await;

    respond(env.catalog(), form.id, vec![(name.id, AnswerValue::Scalar("Budi".into()))]).await;
    respond(env.catalog(), form.id, vec![]).await;

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    assert_eq!(stats.total_responses, 2);
    assert!(stats.question_stats.iter().all(|s| s.question_id != note.id));
    assert_eq!(stats.question_stats.len(), 1);
}

#[tokio::test]
async fn test_entries_follow_first_encounter_in_oldest_response() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Survey", true).await;
    let first = add_question(env.catalog(), &form, "Pertama", QuestionType::ShortText, 0, false, &[]).await;
    let second = add_question(env.catalog(), &form, "Kedua", QuestionType::ShortText, 1, false, &[]).await;

    // Oldest response only answers the second question.
    respond(env.catalog(), form.id, vec![(second.id, AnswerValue::Scalar("x".into()))]).await;
    respond(
        env.catalog(),
        form.id,
        vec![(first.id, AnswerValue::Scalar("y".into())), (second.id, AnswerValue::Scalar("x".into()))],
    )
    .await;

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    let ids: Vec<uuid::Uuid> = stats.question_stats.iter().map(|s| s.question_id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(stats.question_stats[0].answers.get("x"), Some(&2));
}

#[tokio::test]
async fn test_deleted_question_drops_out_of_stats() {
    let env = setup_catalog().await;
    let form = create_form(env.catalog(), &env.admin, "Survey", true).await;
    let kept = add_question(env.catalog(), &form, "Kota", QuestionType::ShortText, 0, false, &[]).await;
    let dropped = add_question(env.catalog(), &form, "Umur", QuestionType::ShortText, 1, false, &[]).await;

    respond(
        env.catalog(),
        form.id,
        vec![(kept.id, AnswerValue::Scalar("Medan".into())), (dropped.id, AnswerValue::Scalar("30".into()))],
    )
    .await;
    env.catalog.delete_question(dropped.id).await.expect("delete question");

    let stats = form_statistics(env.catalog(), form.id).await.expect("stats");
    assert_eq!(stats.total_responses, 1);
    assert_eq!(stats.question_stats.len(), 1);
    assert_eq!(stats.question_stats[0].question_id, kept.id);
}
