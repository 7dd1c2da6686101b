//! Upload intake: cheap validation first, then a bounded decode.
//!
//! - **validate**: extension, size and magic-byte checks
//! - **decode**: format detection and dimension limits on the blocking pool

pub mod decode;
pub mod validate;

pub use decode::{format_to_string, ImageDecoder};
pub use validate::Validator;

use crate::config::Config;
use crate::error::IntakeError;
use crate::types::UploadedImage;

/// Validate and decode an upload in one step.
pub async fn accept_upload(
    config: &Config,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<UploadedImage, IntakeError> {
    Validator::new(config.upload.clone(), config.limits.clone()).validate(file_name, &bytes)?;
    ImageDecoder::new(config.limits.clone())
        .decode(bytes, file_name)
        .await
}
