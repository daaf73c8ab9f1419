//! Request middleware for the REST layer.

pub mod auth;

pub use auth::auth_middleware;
