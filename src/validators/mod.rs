//! Request validation helpers.

pub mod bug;
pub mod common;

pub use bug::*;
pub use common::*;
