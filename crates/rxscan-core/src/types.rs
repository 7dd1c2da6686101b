//! Session-scoped data: the uploaded image and the extraction result.

use chrono::{DateTime, Local};

/// Timestamp format shown on the page and written into reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An uploaded prescription image that passed validation and decoding.
///
/// Only the original bytes are retained; the decoded bitmap is dropped
/// once dimensions are known.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Name of the file as the browser reported it
    pub file_name: String,

    /// Original encoded bytes, sent to the model as-is
    pub bytes: Vec<u8>,

    /// Detected format ("jpeg", "png", "webp")
    pub format: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

impl UploadedImage {
    /// Size of the encoded file in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size of the encoded file in kilobytes.
    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }

    /// MIME type matching the detected format.
    pub fn media_type(&self) -> &'static str {
        match self.format.as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }
}

/// Outcome of one extraction: model text or a failure message.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Text displayed and downloaded verbatim
    pub text: String,

    /// When the extraction was triggered
    pub captured_at: DateTime<Local>,

    /// True when `text` describes a failure rather than a transcription
    pub failed: bool,
}

impl ExtractionResult {
    pub fn new(text: impl Into<String>, failed: bool) -> Self {
        Self {
            text: text.into(),
            captured_at: Local::now(),
            failed,
        }
    }

    /// Capture time rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_image(format: &str, len: usize) -> UploadedImage {
        UploadedImage {
            file_name: "rx.jpg".into(),
            bytes: vec![0; len],
            format: format.into(),
            width: 10,
            height: 20,
        }
    }

    #[test]
    fn test_size_kb() {
        let image = sample_image("jpeg", 1536);
        assert_eq!(image.file_size(), 1536);
        assert!((image.size_kb() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_media_type() {
        assert_eq!(sample_image("jpeg", 1).media_type(), "image/jpeg");
        assert_eq!(sample_image("png", 1).media_type(), "image/png");
        assert_eq!(sample_image("webp", 1).media_type(), "image/webp");
    }

    #[test]
    fn test_timestamp_format() {
        let mut result = ExtractionResult::new("text", false);
        result.captured_at = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap();
        assert_eq!(result.timestamp(), "2024-03-05 09:07:01");
    }
}
