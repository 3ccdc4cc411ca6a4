//! Common validation utilities and helpers.

use validator::{Validate, ValidationErrors};

use crate::errors::ApiError;

/// Convert validator errors to ApiError::ValidationFailed.
///
/// This helper function extracts error messages from ValidationErrors
/// and converts them into a format suitable for API responses.
pub fn validation_errors_to_api_error(e: ValidationErrors) -> ApiError {
    let mut errors: Vec<String> = e
        .field_errors()
        .iter()
        .flat_map(|(_, errs)| {
            errs.iter()
                .map(|e| e.message.clone().unwrap_or_default().to_string())
        })
        .collect();
    // field_errors() iterates a HashMap
    errors.sort();
    ApiError::ValidationFailed(errors)
}

/// Validate a request body, mapping failures to [`ApiError::ValidationFailed`].
pub fn validate_request<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate().map_err(validation_errors_to_api_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ERR_DESCRIPTION_TOO_LONG, ERR_TITLE_REQUIRED, ERR_TITLE_TOO_LONG};
    use crate::models::{CreateBugRequest, UpdateBugRequest};

    fn create(title: &str, description: &str) -> CreateBugRequest {
        CreateBugRequest {
            title: title.to_string(),
            description: description.to_string(),
            report_time: None,
        }
    }

    #[test]
    fn test_valid_create_request() {
        assert!(validate_request(&create("Crash", "On start")).is_ok());
        assert!(validate_request(&create("0123456789", &"d".repeat(144))).is_ok());
    }

    #[test]
    fn test_title_too_long() {
        match validate_request(&create("01234567890", "On start")) {
            Err(ApiError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec![ERR_TITLE_TOO_LONG.to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_description_too_long() {
        match validate_request(&create("Crash", &"d".repeat(145))) {
            Err(ApiError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec![ERR_DESCRIPTION_TOO_LONG.to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_blank_title() {
        match validate_request(&create("  ", "On start")) {
            Err(ApiError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec![ERR_TITLE_REQUIRED.to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        assert!(validate_request(&UpdateBugRequest::default()).is_ok());

        let update = UpdateBugRequest {
            title: Some("far too long title".to_string()),
            description: None,
        };
        assert!(validate_request(&update).is_err());
    }
}
