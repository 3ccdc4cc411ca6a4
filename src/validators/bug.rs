//! Bug-related custom validators.

use validator::ValidationError;

use crate::constants::ERR_TITLE_REQUIRED;

/// Custom validator for the title field.
/// Rejects empty and whitespace-only titles.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(ERR_TITLE_REQUIRED.into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Crash").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }
}
