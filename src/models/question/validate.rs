use super::types::{QuestionType, ScaleBounds};

/// Check a question definition. Returns one message per problem found.
pub fn validate_definition(
    title: &str,
    question_type: QuestionType,
    order: i32,
    options: &[String],
) -> Vec<String> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("Question title is required".to_string());
    }
    if order < 0 {
        errors.push("Order must be zero or greater".to_string());
    }

    if question_type.uses_choices() {
        if options.is_empty() {
            errors.push("Choice questions need at least one option".to_string());
        } else if options.iter().any(|o| o.trim().is_empty()) {
            errors.push("Options must not be blank".to_string());
        }
    }

    if question_type == QuestionType::LinearScale {
        match ScaleBounds::from_options(options) {
            Some(bounds) if bounds.min < bounds.max => {}
            Some(_) => errors.push("Scale minimum must be lower than its maximum".to_string()),
            None => errors.push(
                "Linear scale needs [minValue, maxValue, minLabel, maxLabel] with integer bounds"
                    .to_string(),
            ),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scale_requires_four_entries() {
        let errors = validate_definition("Rate", QuestionType::LinearScale, 0, &opts(&["1", "7"]));
        assert_eq!(errors.len(), 1);

        let ok = validate_definition(
            "Rate",
            QuestionType::LinearScale,
            0,
            &opts(&["1", "7", "Sangat Tidak Setuju", "Sangat Setuju"]),
        );
        assert!(ok.is_empty());
    }

    #[test]
    fn test_scale_bounds_must_increase() {
        let errors = validate_definition("Rate", QuestionType::LinearScale, 0, &opts(&["5", "1", "lo", "hi"]));
        assert_eq!(errors, vec!["Scale minimum must be lower than its maximum".to_string()]);
    }

    #[test]
    fn test_choice_needs_options() {
        let errors = validate_definition("Agama", QuestionType::MultipleChoice, 1, &[]);
        assert_eq!(errors.len(), 1);
        let ok = validate_definition("Agama", QuestionType::Checkbox, 1, &opts(&["Islam", "Kristen"]));
        assert!(ok.is_empty());
    }

    #[test]
    fn test_section_header_ignores_options() {
        let errors = validate_definition("Part A", QuestionType::SectionHeader, 0, &opts(&["x", ""]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_title_and_negative_order() {
        let errors = validate_definition("  ", QuestionType::ShortText, -1, &[]);
        assert_eq!(errors.len(), 2);
    }
}
