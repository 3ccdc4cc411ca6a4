//! Request models for API endpoints.

pub mod bug;
pub mod pagination;

pub use bug::*;
pub use pagination::*;
