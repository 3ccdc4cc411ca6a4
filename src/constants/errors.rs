//! Error message constants used throughout the application.

// Bug errors
pub const ERR_BUG_NOT_FOUND: &str = "Bug not found";

// Validation errors
pub const ERR_TITLE_REQUIRED: &str = "Title is required.";
pub const ERR_TITLE_TOO_LONG: &str = "Title too long.";
pub const ERR_DESCRIPTION_TOO_LONG: &str = "Description too long.";
pub const ERR_VALIDATION_FAILED: &str = "Validation failed";

// Request errors
pub const ERR_REQUEST_CANCELLED: &str = "Request was cancelled before the backend answered";
pub const ERR_MALFORMED_DOCUMENT: &str = "Backend returned a malformed document";
