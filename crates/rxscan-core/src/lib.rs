//! rxscan core - transcribe handwritten prescriptions through a hosted model.
//!
//! There is no local OCR. An uploaded image is validated, decoded for its
//! dimensions, and sent with one fixed instruction to a hosted multimodal
//! model; the reply is shown and offered for download as-is.
//!
//! ```text
//! Upload → Validate → Decode → Extractor (one model call) → Session → Page / Report
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use rxscan_core::{intake, Config, Extractor};
//!
//! #[tokio::main]
//! async fn main() -> rxscan_core::Result<()> {
//!     let config = Config::load()?;
//!     let extractor = Extractor::from_config(&config)?;
//!
//!     let bytes = std::fs::read("./prescription.jpg")?;
//!     let image = intake::accept_upload(&config, "prescription.jpg", bytes).await?;
//!     let result = extractor.extract(&image).await;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod intake;
pub mod llm;
pub mod report;
pub mod session;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, IntakeError, LlmError, Result, RxScanError};
pub use extractor::{Extractor, FAILURE_PREFIX};
pub use session::{Session, SessionId, SessionStore};
pub use types::{ExtractionResult, UploadedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    /// Encode a blank RGB image as PNG.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }
}
