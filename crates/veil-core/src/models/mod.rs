pub mod detection;
pub mod image;
pub mod overlay;
pub mod redaction;
pub mod report;
