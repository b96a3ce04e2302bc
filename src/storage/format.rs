use base64::Engine;
use image::ImageFormat;

use crate::error::{AppError, AppResult};

/// Raster formats accepted for upload and variant generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Detects the format from the leading bytes; declared types and file
    /// names are never consulted.
    pub fn sniff(data: &[u8]) -> AppResult<Self> {
        match image::guess_format(data) {
            Ok(ImageFormat::Png) => Ok(ImageKind::Png),
            Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
            Ok(other) => Err(AppError::UnsupportedFormat(other.to_mime_type().to_string())),
            Err(_) => Err(AppError::UnsupportedFormat("unrecognized content".to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }

    pub fn format(self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Decodes a base64 upload and checks it sniffs as PNG or JPEG.
pub fn decode_upload(encoded: &str) -> AppResult<(Vec<u8>, ImageKind)> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AppError::InvalidInput(format!("bad base64 image encoding: {}", e)))?;
    let kind = ImageKind::sniff(&data)?;
    Ok((data, kind))
}
