//! Pagination constants for list endpoints.

/// Default number of items per page when not specified in the request.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may ask for. Anything above falls back to the default.
pub const MAX_PAGE_SIZE: u32 = 10;

/// Default starting page number.
pub const DEFAULT_PAGE_NUMBER: i64 = 1;
