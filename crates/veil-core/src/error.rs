use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("unsupported media type: {0} (expected image/png, image/jpeg or image/webp)")]
    UnsupportedMediaType(String),

    #[error("declared media type {declared} does not match image content ({detected})")]
    MediaTypeMismatch { declared: String, detected: String },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("detection response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("invalid value for {field}: {value}")]
    InvalidSetting { field: &'static str, value: String },
}
