//! Response models for API endpoints.

pub mod api;
pub mod bug;
pub mod pagination;

pub use api::*;
pub use bug::*;
pub use pagination::*;
