//! Success message constants used throughout the application.

pub const MSG_BUG_FOUND: &str = "Bug found";
pub const MSG_BUG_CREATED: &str = "Bug created successfully";
pub const MSG_BUG_UPDATED: &str = "Bug updated successfully";
pub const MSG_BUG_DELETED: &str = "Bug deleted successfully";

pub const MSG_SERVER_RUNNING: &str = "Server is running";
