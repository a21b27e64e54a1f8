use thiserror::Error;
use veil_core::capability::ProviderError;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request blocked: {0}")]
    Blocked(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("model returned no image: {0}")]
    NoImage(String),
}

impl GeminiError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::ResponseParse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<GeminiError> for ProviderError {
    fn from(e: GeminiError) -> Self {
        let message = e.to_string();
        match e {
            GeminiError::Transport(_) => ProviderError::Transport(message),
            GeminiError::Timeout(_) => ProviderError::Timeout(message),
            GeminiError::Api { status: 429, .. } => ProviderError::RateLimited(message),
            GeminiError::Api {
                status: 401 | 403, ..
            }
            | GeminiError::MissingApiKey => ProviderError::Unauthorized(message),
            GeminiError::Api {
                status: 500 | 502 | 503 | 504,
                ..
            } => ProviderError::Unavailable(message),
            GeminiError::ResponseParse(_) | GeminiError::SchemaViolation(_) => {
                ProviderError::SchemaViolation(message)
            }
            GeminiError::NoImage(_) => ProviderError::NoImage(message),
            GeminiError::Api { .. } | GeminiError::Blocked(_) | GeminiError::Client(_) => {
                ProviderError::Rejected(message)
            }
        }
    }
}
