//! The `rxscan config` command for configuration management.

use clap::{Args, Subcommand};
use rxscan_core::llm::ProviderKind;
use rxscan_core::Config;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key in the config file (comments are preserved)
    SetKey {
        /// The API key
        key: String,

        /// Provider section to write ("gemini" or "openai"); defaults to llm.provider
        #[arg(long)]
        provider: Option<String>,
    },
}

/// Execute the config command.
pub async fn execute(
    args: ConfigArgs,
    path_override: Option<PathBuf>,
    config: Config,
) -> anyhow::Result<()> {
    let path = path_override.unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { key, provider } => {
            let provider: ProviderKind = provider
                .as_deref()
                .unwrap_or(config.llm.provider.as_str())
                .parse()?;
            save_api_key(&path, provider, &key)?;
            println!("Key saved to {}", path.display());
        }
    }

    Ok(())
}

/// Write `[llm.<provider>] api_key` into the config file, keeping everything else intact.
fn save_api_key(config_path: &Path, provider: ProviderKind, key: &str) -> anyhow::Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let content = std::fs::read_to_string(config_path).unwrap_or_default();
    let mut doc: toml_edit::DocumentMut = content.parse()?;
    let section = provider.as_str();

    if !doc.contains_key("llm") {
        doc["llm"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if !doc["llm"]
        .as_table()
        .is_some_and(|t| t.contains_key(section))
    {
        doc["llm"][section] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    doc["llm"][section]["api_key"] = toml_edit::value(key);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    tracing::debug!(provider = section, "API key persisted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_api_key_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        save_api_key(&path, ProviderKind::Gemini, " abc123 ").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.llm.gemini.api_key, "abc123");
    }

    #[test]
    fn test_save_api_key_preserves_comments_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# my settings\n[server]\nport = 9100\n\n[llm.gemini]\nmodel = \"gemini-pro\"\n",
        )
        .unwrap();

        save_api_key(&path, ProviderKind::Gemini, "k-1").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# my settings"));
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.llm.gemini.model, "gemini-pro");
        assert_eq!(config.llm.gemini.api_key, "k-1");
    }

    #[test]
    fn test_save_api_key_rejects_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(save_api_key(&path, ProviderKind::OpenAi, "   ").is_err());
        assert!(!path.exists());
    }
}
