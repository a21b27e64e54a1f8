//! veil-core
//!
//! Pure domain types for PII detection and redaction: the detection
//! contract, image data URIs, sanitization policy, overlay mapping,
//! redaction planning, and prompt templates. No network dependency; the
//! model backends implement the traits in [`capability`].

pub mod capability;
pub mod error;
pub mod models;
pub mod policy;
pub mod prompts;
