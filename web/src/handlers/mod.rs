//! HTTP request handlers shared by tasklist services.

pub mod health;

pub use health::{health_check, readiness_check};
