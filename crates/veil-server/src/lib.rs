//! veil-server
//!
//! HTTP surface for document PII detection and redaction: an axum router
//! that runs behind Lambda or on a plain TCP listener, plus the pipeline
//! that composes the detector and redactor.

pub mod config;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod retry;
pub mod routes;
pub mod state;
