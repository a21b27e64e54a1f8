use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Raster formats accepted for upload and returned by the redactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
}

impl ImageMime {
    pub fn from_mime_type(mime: &str) -> Result<Self, CoreError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            other => Err(CoreError::UnsupportedMediaType(other.to_string())),
        }
    }

    fn from_format(format: ::image::ImageFormat) -> Option<Self> {
        match format {
            ::image::ImageFormat::Png => Some(Self::Png),
            ::image::ImageFormat::Jpeg => Some(Self::Jpeg),
            ::image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// Natural pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// What the header of an image says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub mime: ImageMime,
    pub dimensions: ImageDimensions,
}

/// An image together with its media type.
///
/// Crosses the HTTP boundary as a data URI
/// (`data:<mime>;base64,<payload>`), the same self-describing form a
/// browser `FileReader` produces.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(mime: ImageMime, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    pub fn from_data_uri(uri: &str) -> Result<Self, CoreError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidDataUri("missing `data:` prefix".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidDataUri("missing `,` separator".to_string()))?;

        let mut params = header.split(';');
        let mime = ImageMime::from_mime_type(params.next().unwrap_or_default())?;
        if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(CoreError::InvalidDataUri(
                "payload must be base64 encoded".to_string(),
            ));
        }

        Self::from_base64(mime, payload)
    }

    pub fn from_base64(mime: ImageMime, payload: &str) -> Result<Self, CoreError> {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| CoreError::InvalidDataUri(e.to_string()))?;

        if bytes.is_empty() {
            return Err(CoreError::InvalidDataUri("empty payload".to_string()));
        }

        Ok(Self { mime, bytes })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime.as_str(), self.to_base64())
    }

    /// Read the image header to learn its real format and pixel size.
    ///
    /// Pixels are not decoded. The sniffed format must agree with the
    /// declared media type.
    pub fn inspect(&self) -> Result<ImageMetadata, CoreError> {
        let reader = ::image::ImageReader::new(Cursor::new(self.bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| CoreError::InvalidImage(e.to_string()))?;

        let detected = reader
            .format()
            .and_then(ImageMime::from_format)
            .ok_or_else(|| CoreError::InvalidImage("unrecognized image format".to_string()))?;

        if detected != self.mime {
            return Err(CoreError::MediaTypeMismatch {
                declared: self.mime.as_str().to_string(),
                detected: detected.as_str().to_string(),
            });
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CoreError::InvalidImage(e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImage(format!(
                "image has no area ({width}x{height})"
            )));
        }

        Ok(ImageMetadata {
            mime: detected,
            dimensions: ImageDimensions { width, height },
        })
    }
}
