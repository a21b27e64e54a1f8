//! veil-bedrock
//!
//! PII detection through the Bedrock Converse API, plus discovery of the
//! vision-capable models an account can use for it.

pub mod client;
pub mod detect;
pub mod error;
pub mod models;
pub mod tokens;
