//! Image decoding with format detection, dimension limits and timeout.

use image::{GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::IntakeError;
use crate::types::UploadedImage;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an uploaded buffer on the blocking pool, bounded by the decode timeout.
    pub async fn decode(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<UploadedImage, IntakeError> {
        let name = file_name.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_sync(bytes, name)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(IntakeError::ImageTooLarge {
                        file_name: file_name.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                tracing::debug!(
                    file = %decoded.file_name,
                    format = %decoded.format,
                    width = decoded.width,
                    height = decoded.height,
                    "Decoded upload"
                );
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(IntakeError::Decode {
                file_name: file_name.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(IntakeError::Timeout {
                file_name: file_name.to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_sync(bytes: Vec<u8>, file_name: String) -> Result<UploadedImage, IntakeError> {
        use std::io::Cursor;

        let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| IntakeError::Decode {
                file_name: file_name.clone(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format().ok_or_else(|| IntakeError::Decode {
            file_name: file_name.clone(),
            message: "Cannot detect image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| IntakeError::Decode {
            file_name: file_name.clone(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        drop(image);
        Ok(UploadedImage {
            file_name,
            bytes,
            format: format_to_string(format),
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        _ => "unknown".to_string(),
    }
}
