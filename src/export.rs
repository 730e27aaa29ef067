//! Tabular export of a form's responses, plus CSV and print-friendly HTML
//! renderings of the same table.

use serde::Serialize;

use crate::models::form::Form;
use crate::models::question::Question;
use crate::models::response::ResponseDetail;

const FIXED_HEADERS: [&str; 4] = ["No", "Timestamp", "Responder Name", "Responder Email"];
const NO_VALUE: &str = "-";

#[derive(Debug, Clone, Serialize)]
pub struct ExportTable {
    pub title: String,
    pub description: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Build the export table. `questions` must be in ascending `order` and
/// `responses` newest first, as the catalog lists them. Rows come out
/// oldest first.
pub fn build_table(form: &Form, questions: &[Question], responses: &[ResponseDetail]) -> ExportTable {
    let columns: Vec<&Question> = questions
        .iter()
        .filter(|q| q.question_type.is_answerable())
        .collect();

    let mut headers: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(columns.iter().map(|q| q.title.clone()));

    let mut ordered: Vec<&ResponseDetail> = responses.iter().rev().collect();
    ordered.sort_by_key(|r| r.response.created_at);

    let rows = ordered
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let name = r
                .responder
                .as_ref()
                .map(|u| u.name.clone())
                .or_else(|| r.response.responder_name.clone())
                .unwrap_or_else(|| "Anonymous".to_string());
            let email = r
                .responder
                .as_ref()
                .map(|u| u.email.clone())
                .unwrap_or_else(|| NO_VALUE.to_string());

            let mut row = vec![
                (i + 1).to_string(),
                r.response.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                name,
                email,
            ];
            row.extend(columns.iter().map(|q| {
                r.answer_for(q.id)
                    .map(|a| a.value.display())
                    .unwrap_or_else(|| NO_VALUE.to_string())
            }));
            row
        })
        .collect();

    ExportTable {
        title: form.title.clone(),
        description: form.description.clone().unwrap_or_default(),
        headers,
        rows,
    }
}

/// Minimal HTML escaping for text and attribute content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render the table as CSV: the header line, then one line per row.
pub fn render_csv(table: &ExportTable) -> String {
    let mut csv = String::new();
    for line in std::iter::once(&table.headers).chain(table.rows.iter()) {
        let fields: Vec<String> = line.iter().map(|f| escape_csv(f)).collect();
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }
    csv
}

/// Safe download name derived from the form title.
pub fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() {
        "form".to_string()
    } else {
        stem
    }
}

/// Render the table as a standalone printable page, one card per response.
pub fn render_html(table: &ExportTable, theme_color: Option<&str>) -> String {
    let accent = theme_color.map(escape_html).unwrap_or_else(|| "#4F46E5".to_string());
    let question_headers = table.headers.iter().skip(FIXED_HEADERS.len());

    let cards = table
        .rows
        .iter()
        .map(|row| {
            let answers = question_headers
                .clone()
                .zip(row.iter().skip(FIXED_HEADERS.len()))
                .map(|(q, a)| {
                    format!(
                        r#"<div class="answer"><h3>{}</h3><p>{}</p></div>"#,
                        escape_html(q),
                        escape_html(a)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                r#"<section class="response">
    <h2>Response #{}</h2>
    <p class="meta">Responder: {} &middot; Email: {} &middot; Submitted: {}</p>
    {}
</section>"#,
                escape_html(&row[0]),
                escape_html(&row[2]),
                escape_html(&row[3]),
                escape_html(&row[1]),
                answers
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - Responses</title>
    <style>
        body {{ font-family: -apple-system, system-ui, 'Segoe UI', Roboto, sans-serif; color: #333; margin: 0; }}
        .page {{ max-width: 900px; margin: 0 auto; padding: 2rem; }}
        header {{ border-top: 8px solid {accent}; text-align: center; padding-top: 1rem; }}
        .response {{ border-bottom: 1px solid #ccc; padding: 1rem 0; page-break-inside: avoid; }}
        .meta {{ color: #666; font-size: 0.85rem; }}
        .answer h3 {{ font-size: 0.95rem; margin: 0.75rem 0 0.25rem; }}
        .answer p {{ margin: 0 0 0 1rem; white-space: pre-wrap; }}
        @media print {{ .page {{ padding: 0; }} }}
    </style>
</head>
<body>
<div class="page">
<header>
    <h1>{title}</h1>
    <p>{description}</p>
    <p class="meta">Total Responses: {total}</p>
</header>
{cards}
</div>
</body>
</html>"#,
        title = escape_html(&table.title),
        description = escape_html(&table.description),
        total = table.rows.len(),
        accent = accent,
        cards = cards,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use crate::models::response::{
        AnswerDetail, AnswerValue, QuestionSummary, ResponderSummary, Response,
    };
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn form() -> Form {
        let now = Utc::now();
        Form {
            id: Uuid::new_v4(),
            title: "Survei <Keluarga>".to_string(),
            description: None,
            is_published: true,
            header_image: None,
            logo_url: None,
            theme_color: None,
            created_by_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn question(form: &Form, title: &str, order: i32, question_type: QuestionType) -> Question {
        let now = Utc::now();
        Question {
            id: Uuid::new_v4(),
            form_id: form.id,
            title: title.to_string(),
            description: None,
            question_type,
            is_required: false,
            order,
            options: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn response(form: &Form, age: Duration, answers: Vec<(&Question, AnswerValue)>) -> ResponseDetail {
        let id = Uuid::new_v4();
        ResponseDetail {
            response: Response {
                id,
                form_id: form.id,
                responder_id: None,
                responder_name: None,
                created_at: Utc::now() - age,
            },
            responder: None,
            answers: answers
                .into_iter()
                .map(|(q, value)| AnswerDetail {
                    id: Uuid::new_v4(),
                    response_id: id,
                    question_id: q.id,
                    value,
                    question: QuestionSummary::from(q),
                })
                .collect(),
        }
    }

    #[test]
    fn test_table_columns_and_rows() {
        let f = form();
        let header = question(&f, "Part A", 0, QuestionType::SectionHeader);
        let city = question(&f, "Kota", 1, QuestionType::ShortText);
        let hobbies = question(&f, "Hobi", 2, QuestionType::Checkbox);

        let mut newer = response(&f, Duration::minutes(1), vec![(&city, AnswerValue::Scalar("Medan".into()))]);
        newer.responder = Some(ResponderSummary {
            id: Uuid::new_v4(),
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
        });
        let older = response(
            &f,
            Duration::minutes(10),
            vec![(&hobbies, AnswerValue::MultiSelect(vec!["A".into(), "B".into()]))],
        );

        let table = build_table(&f, &[header, city, hobbies], &[newer, older]);
        assert_eq!(
            table.headers,
            vec!["No", "Timestamp", "Responder Name", "Responder Email", "Kota", "Hobi"]
        );
        assert_eq!(table.rows.len(), 2);

        // Oldest first: the anonymous checkbox response.
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[0][2], "Anonymous");
        assert_eq!(table.rows[0][3], "-");
        assert_eq!(table.rows[0][4], "-");
        assert_eq!(table.rows[0][5], "A, B");

        assert_eq!(table.rows[1][2], "Budi");
        assert_eq!(table.rows[1][3], "budi@example.com");
        assert_eq!(table.rows[1][4], "Medan");
    }

    #[test]
    fn test_free_text_name_used_for_anonymous() {
        let f = form();
        let mut r = response(&f, Duration::zero(), vec![]);
        r.response.responder_name = Some("Siti".to_string());
        let table = build_table(&f, &[], &[r]);
        assert_eq!(table.rows[0][2], "Siti");
    }

    #[test]
    fn test_html_is_escaped() {
        let f = form();
        let q = question(&f, "<b>Q</b>", 0, QuestionType::ShortText);
        let r = response(&f, Duration::zero(), vec![(&q, AnswerValue::Scalar("<script>".into()))]);
        let html = render_html(&build_table(&f, &[q], &[r]), Some("#7B1F3A"));
        assert!(html.contains("Survei &lt;Keluarga&gt;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("#7B1F3A"));
    }

    #[test]
    fn test_csv_quotes_commas_quotes_and_newlines() {
        let f = form();
        let hobbies = question(&f, "Hobi, minat", 0, QuestionType::Checkbox);
        let note = question(&f, "Catatan", 1, QuestionType::LongText);
        let r = response(
            &f,
            Duration::zero(),
            vec![
                (&hobbies, AnswerValue::MultiSelect(vec!["A".into(), "B".into()])),
                (&note, AnswerValue::Scalar("baris \"satu\"\nbaris dua".into())),
            ],
        );

        let csv = render_csv(&build_table(&f, &[hobbies, note], &[r]));
        let mut lines = csv.splitn(2, '\n');
        assert_eq!(
            lines.next(),
            Some("No,Timestamp,Responder Name,Responder Email,\"Hobi, minat\",Catatan")
        );
        let row = lines.next().unwrap_or_default();
        assert!(row.starts_with("1,"));
        assert!(row.contains(",Anonymous,-,\"A, B\",\"baris \"\"satu\"\"\nbaris dua\"\n"));
        assert!(row.ends_with('\n'));
    }

    #[test]
    fn test_csv_without_responses_is_header_only() {
        let f = form();
        let q = question(&f, "Kota", 0, QuestionType::ShortText);
        let csv = render_csv(&build_table(&f, &[q], &[]));
        assert_eq!(csv, "No,Timestamp,Responder Name,Responder Email,Kota\n");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("PHD Survey 2026"), "PHD_Survey_2026");
        assert_eq!(file_stem("???"), "form");
    }
}
