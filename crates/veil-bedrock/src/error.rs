use thiserror::Error;
use veil_core::capability::ProviderError;

#[derive(Debug, Error)]
pub enum BedrockError {
    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("response did not conform to expected schema: {0}")]
    SchemaViolation(String),

    #[error("model discovery failed: {0}")]
    Discovery(String),
}

impl From<BedrockError> for ProviderError {
    fn from(e: BedrockError) -> Self {
        let message = e.to_string();
        match e {
            BedrockError::Throttled(_) => ProviderError::RateLimited(message),
            BedrockError::AccessDenied(_) => ProviderError::Unauthorized(message),
            BedrockError::Unavailable(_) => ProviderError::Unavailable(message),
            BedrockError::Transport(_) => ProviderError::Transport(message),
            BedrockError::Timeout(_) => ProviderError::Timeout(message),
            BedrockError::ResponseParse(_) | BedrockError::SchemaViolation(_) => {
                ProviderError::SchemaViolation(message)
            }
            BedrockError::Invocation(_) | BedrockError::Discovery(_) => {
                ProviderError::Rejected(message)
            }
        }
    }
}
