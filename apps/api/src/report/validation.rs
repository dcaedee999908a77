use serde::{Deserialize, Serialize};

pub const MIN_DESCRIPTION_LEN: usize = 20;
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// Inline errors keyed by form field. Both fields are checked on every submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
}

impl ReportFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.confirmation.is_none()
    }
}

/// Lengths are counted in characters after trimming.
pub fn validate_description(description: &str) -> Option<String> {
    let len = description.trim().chars().count();
    if len == 0 {
        Some("Description is required".to_string())
    } else if len < MIN_DESCRIPTION_LEN {
        Some(format!(
            "Description must be at least {MIN_DESCRIPTION_LEN} characters long"
        ))
    } else if len > MAX_DESCRIPTION_LEN {
        Some(format!(
            "Description must not exceed {MAX_DESCRIPTION_LEN} characters"
        ))
    } else {
        None
    }
}

pub fn validate_report(form: &ReportForm) -> Result<(), ReportFieldErrors> {
    let errors = ReportFieldErrors {
        description: validate_description(&form.description),
        confirmation: (!form.confirmed)
            .then(|| "You must confirm that your report is truthful".to_string()),
    };
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_boundaries() {
        assert!(validate_description(&"a".repeat(19))
            .unwrap()
            .contains("at least 20"));
        assert_eq!(validate_description(&"a".repeat(20)), None);
        assert_eq!(validate_description(&"a".repeat(500)), None);
        assert!(validate_description(&"a".repeat(501))
            .unwrap()
            .contains("not exceed 500"));
    }

    #[test]
    fn test_whitespace_only_is_required() {
        assert_eq!(
            validate_description("   \n\t ").as_deref(),
            Some("Description is required")
        );
    }

    #[test]
    fn test_trim_before_counting() {
        let padded = format!("   {}   ", "b".repeat(19));
        assert!(validate_description(&padded).is_some());
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(validate_description(&"é".repeat(20)), None);
    }

    #[test]
    fn test_both_fields_reported() {
        let errors = validate_report(&ReportForm::default()).unwrap_err();
        assert_eq!(errors.description.as_deref(), Some("Description is required"));
        assert!(errors.confirmation.is_some());
    }

    #[test]
    fn test_valid_report() {
        let form = ReportForm {
            description: "This quote is misattributed to the wrong author.".to_string(),
            confirmed: true,
        };
        assert!(validate_report(&form).is_ok());
    }
}
