//! Axum middleware functions.

pub mod trace_request;

pub use trace_request::trace_request;
