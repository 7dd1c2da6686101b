//! Upload validation before decoding.

use crate::config::{LimitsConfig, UploadConfig};
use crate::error::IntakeError;

/// Validates uploads before decoding.
pub struct Validator {
    upload: UploadConfig,
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(upload: UploadConfig, limits: LimitsConfig) -> Self {
        Self { upload, limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - Upload is non-empty
    /// - File extension is an accepted format
    /// - Size is within limits
    /// - Bytes start with a known raster signature
    pub fn validate(&self, file_name: &str, bytes: &[u8]) -> Result<(), IntakeError> {
        if bytes.is_empty() {
            return Err(IntakeError::Empty);
        }

        if !self.upload.accepts(file_name) {
            return Err(IntakeError::UnsupportedFormat {
                file_name: file_name.to_string(),
                supported: self.upload.supported_formats.join(", "),
            });
        }

        let len = bytes.len() as u64;
        if len > self.limits.max_file_size_bytes() {
            return Err(IntakeError::FileTooLarge {
                file_name: file_name.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !Self::is_valid_image_header(bytes) {
            return Err(IntakeError::Decode {
                file_name: file_name.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// Check if the leading bytes match JPEG, PNG or WebP.
    fn is_valid_image_header(header: &[u8]) -> bool {
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // WebP: RIFF....WEBP
        header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP"
    }
}
