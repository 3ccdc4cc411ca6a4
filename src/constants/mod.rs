//! Application constants module.
//!
//! This module centralizes all constant strings used throughout the application,
//! including error messages, success messages, pagination defaults and storage names.

pub mod error_codes;
pub mod errors;
pub mod messages;
pub mod pagination;
pub mod storage;

pub use error_codes::*;
pub use errors::*;
pub use messages::*;
pub use pagination::*;
pub use storage::*;
