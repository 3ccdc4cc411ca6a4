//! Middleware wrapped around the per-backend bug routes.

pub mod action_logger;

pub use action_logger::BugActionLogger;
