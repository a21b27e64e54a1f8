//! veil-gemini
//!
//! Google Gemini backend over the Generative Language REST API: structured
//! PII detection and instruction-driven image regeneration.

pub mod client;
pub mod detect;
pub mod error;
pub mod redact;
pub mod wire;
