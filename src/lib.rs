//! Squash: a bug tracker whose REST API runs the same paging contract over
//! several storage engines.

pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validators;
