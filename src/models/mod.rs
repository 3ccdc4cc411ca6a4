//! Data models organized by type.

pub mod bug;
pub mod requests;
pub mod responses;

pub use bug::*;
pub use requests::*;
pub use responses::*;
