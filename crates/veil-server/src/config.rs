use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use eyre::{WrapErr, eyre};

use veil_core::models::redaction::RedactionStyle;
use veil_core::policy::IdPrefixPolicy;

use crate::retry::RetryPolicy;

/// Which backend answers detection requests. Redaction is always Gemini.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorBackend {
    Gemini,
    Bedrock,
}

impl FromStr for DetectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "bedrock" => Ok(Self::Bedrock),
            other => Err(format!("unknown detector '{other}' (expected gemini or bedrock)")),
        }
    }
}

/// How `/api/process` combines detection and masking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composition {
    /// Masking consumes the detection output.
    #[default]
    Sequential,
    /// Detection and masking run side by side; the masking branch detects
    /// on its own.
    Concurrent,
}

impl FromStr for Composition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!(
                "unknown composition '{other}' (expected sequential or concurrent)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VeilConfig {
    pub bind_addr: SocketAddr,
    pub detector: DetectorBackend,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_detect_model: String,
    pub gemini_image_model: String,
    pub aws_region: String,
    pub bedrock_model: String,
    pub id_policy: IdPrefixPolicy,
    pub style: RedactionStyle,
    pub composition: Composition,
    pub retry: RetryPolicy,
    pub call_timeout: Duration,
    /// Largest decoded image accepted, in bytes.
    pub max_upload_bytes: usize,
}

impl VeilConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset or blank keys take their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let id_policy = IdPrefixPolicy::new(
            parse_or(&get, "VEIL_ID_PREFIX_DIGITS", 8)?,
            parse_or(&get, "VEIL_ID_GROUP_SIZE", 4)?,
        )
        .wrap_err("invalid national ID prefix policy")?;

        let retry = RetryPolicy {
            max_retries: parse_or(&get, "VEIL_MAX_RETRIES", 2)?,
            base_delay: Duration::from_millis(parse_or(&get, "VEIL_RETRY_BASE_MS", 500)?),
            ..RetryPolicy::default()
        };

        let call_timeout_secs: u64 = parse_or(&get, "VEIL_CALL_TIMEOUT_SECS", 90)?;
        if call_timeout_secs == 0 {
            return Err(eyre!("VEIL_CALL_TIMEOUT_SECS must be greater than zero"));
        }

        let max_upload_bytes: usize = parse_or(&get, "VEIL_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;
        if max_upload_bytes == 0 {
            return Err(eyre!("VEIL_MAX_UPLOAD_BYTES must be greater than zero"));
        }

        Ok(Self {
            bind_addr: parse_or(&get, "VEIL_BIND", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            detector: parse_or(&get, "VEIL_DETECTOR", DetectorBackend::Gemini)?,
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            gemini_base_url: get("VEIL_GEMINI_BASE_URL")
                .unwrap_or_else(|| veil_gemini::client::DEFAULT_BASE_URL.to_string()),
            gemini_detect_model: get("VEIL_GEMINI_DETECT_MODEL")
                .unwrap_or_else(|| veil_gemini::detect::DEFAULT_DETECT_MODEL.to_string()),
            gemini_image_model: get("VEIL_GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| veil_gemini::redact::DEFAULT_IMAGE_MODEL.to_string()),
            aws_region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            bedrock_model: get("VEIL_BEDROCK_MODEL")
                .unwrap_or_else(|| veil_bedrock::detect::DEFAULT_MODEL_ID.to_string()),
            id_policy,
            style: parse_or(&get, "VEIL_STYLE", RedactionStyle::default())?,
            composition: parse_or(&get, "VEIL_COMPOSITION", Composition::default())?,
            retry,
            call_timeout: Duration::from_secs(call_timeout_secs),
            max_upload_bytes,
        })
    }

    /// Request body limit. Images arrive base64-encoded inside JSON, so the
    /// body may be a third larger than the image itself.
    pub fn body_limit(&self) -> usize {
        (self.max_upload_bytes / 3)
            .saturating_mul(4)
            .saturating_add(64 * 1024)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("invalid value for {key} ({raw}): {e}")),
        None => Ok(default),
    }
}
