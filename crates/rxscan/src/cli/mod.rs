//! Subcommand implementations.

pub mod config;
pub mod extract;
pub mod serve;

use rxscan_core::{Config, Extractor};

/// Build the extractor, turning a missing credential into a fatal error.
///
/// Runs before anything is served or sent.
pub(crate) fn build_extractor(config: &Config) -> anyhow::Result<Extractor> {
    Extractor::from_config(config).map_err(|e| {
        tracing::error!("{e}");
        anyhow::anyhow!("{e}\n\n  Hint: `rxscan config set-key <KEY>` writes the key for you.")
    })
}
