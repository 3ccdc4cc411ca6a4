//! Error code constants for API responses.
//!
//! These codes provide a machine-readable identifier for each error type,
//! making it easier for API clients to handle errors programmatically.

// Validation errors
pub const CODE_VALIDATION_FAILED: &str = "VALIDATION_FAILED";

// Bug errors
pub const CODE_BUG_NOT_FOUND: &str = "BUG_NOT_FOUND";

// Backend errors
pub const CODE_BACKEND_UNAVAILABLE: &str = "BACKEND_UNAVAILABLE";
pub const CODE_BACKEND_OPERATION_FAILED: &str = "BACKEND_OPERATION_FAILED";

// Generic errors
pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
pub const CODE_REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";
