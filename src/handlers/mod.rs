//! HTTP request handlers organized by domain.

pub mod bug_handler;

pub use bug_handler::*;
