/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Email must be a valid address".to_string()),
    }
}

/// Validate a password: min 6 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 6 {
        return Some("Password must be at least 6 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (absent or empty is OK).
pub fn validate_optional(value: Option<&str>, field_name: &str, max_len: usize) -> Option<String> {
    match value {
        Some(v) if v.trim().chars().count() > max_len => {
            Some(format!("{field_name} must be at most {max_len} characters"))
        }
        _ => None,
    }
}

/// Accent colours are `#RGB` or `#RRGGBB`; empty clears the colour.
pub fn validate_theme_color(value: Option<&str>) -> Option<String> {
    let v = value.map(str::trim).unwrap_or("");
    if v.is_empty() {
        return None;
    }
    let ok = v
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if ok {
        None
    } else {
        Some("Theme color must be a hex colour like #7B1F3A".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email("a@b.co").is_none());
        assert!(validate_email("").is_some());
        assert!(validate_email("no-at.example.com").is_some());
        assert!(validate_email("@example.com").is_some());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("").is_some());
        assert!(validate_password("12345").is_some());
        assert!(validate_password("123456").is_none());
    }

    #[test]
    fn test_required_and_optional() {
        assert_eq!(validate_required("  ", "Title", 10), Some("Title is required".to_string()));
        assert!(validate_required("Survey", "Title", 10).is_none());
        assert!(validate_optional(None, "Description", 5).is_none());
        assert!(validate_optional(Some("too long"), "Description", 5).is_some());
    }

    #[test]
    fn test_theme_color() {
        assert!(validate_theme_color(Some("#7B1F3A")).is_none());
        assert!(validate_theme_color(Some("#fff")).is_none());
        assert!(validate_theme_color(Some("")).is_none());
        assert!(validate_theme_color(None).is_none());
        assert!(validate_theme_color(Some("maroon")).is_some());
        assert!(validate_theme_color(Some("#12345")).is_some());
    }
}
