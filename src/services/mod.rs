//! Services organized by domain concern.

pub mod bug_service;

pub use bug_service::BugService;
