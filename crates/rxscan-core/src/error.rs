//! Error types for rxscan.
//!
//! Only two failures are user-visible in practice: a missing credential,
//! which is fatal at startup, and a failed model call, which the
//! [`Extractor`](crate::Extractor) folds into the result text. Upload errors
//! surface as an inline notice on the page.

use thiserror::Error;

/// Top-level error type for rxscan operations.
#[derive(Error, Debug)]
pub enum RxScanError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upload / decode errors
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Hosted model errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No usable API key in the config file or the environment
    #[error(
        "API key not found. Set `api_key` under [llm.{provider}] in {config_path} \
         or export {env_var}.\n\n  [llm.{provider}]\n  api_key = \"your-api-key-here\""
    )]
    MissingApiKey {
        provider: String,
        env_var: String,
        config_path: String,
    },
}

/// Errors raised while accepting an uploaded image.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Extension is not in `upload.supported_formats`
    #[error("Unsupported file type for {file_name}: supported formats are {supported}")]
    UnsupportedFormat { file_name: String, supported: String },

    /// Upload exceeds the size limit
    #[error("File too large: {file_name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        file_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed the limit
    #[error("Image too large: {file_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        file_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Bytes could not be decoded as an image
    #[error("Decode error for {file_name}: {message}")]
    Decode { file_name: String, message: String },

    /// Decoding did not finish in time
    #[error("Decoding {file_name} timed out after {timeout_ms}ms")]
    Timeout { file_name: String, timeout_ms: u64 },

    /// Upload carried no image data
    #[error("No image data received")]
    Empty,
}

/// Errors from a hosted model call.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct LlmError {
    /// Human-readable failure description
    pub message: String,
    /// HTTP status code, when the provider answered
    pub status_code: Option<u16>,
}

impl LlmError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status),
        }
    }
}

/// Convenience type alias for rxscan results.
pub type Result<T> = std::result::Result<T, RxScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_message_has_remediation() {
        let err = ConfigError::MissingApiKey {
            provider: "gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
            config_path: "/tmp/config.toml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
        assert!(msg.contains("[llm.gemini]"));
        assert!(msg.contains("/tmp/config.toml"));
    }

    #[test]
    fn test_llm_error_status() {
        let err = LlmError::with_status("Gemini HTTP 500", 500);
        assert_eq!(err.status_code, Some(500));
        assert_eq!(err.to_string(), "Gemini HTTP 500");
        assert_eq!(LlmError::new("boom").status_code, None);
    }
}
