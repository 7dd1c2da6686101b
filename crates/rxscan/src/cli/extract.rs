//! The `rxscan extract` command: one image, one model call, no browser.

use clap::Args;
use rxscan_core::{intake, report, Config};
use std::path::PathBuf;
use std::time::Duration;

use super::build_extractor;

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Prescription image (jpg, jpeg, png, webp)
    #[arg(required = true)]
    pub image: PathBuf,

    /// Write the full text report here instead of printing the transcription
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(long)]
    pub quiet: bool,
}

/// Execute the extract command.
pub async fn execute(args: ExtractArgs, config: Config) -> anyhow::Result<()> {
    if !args.image.exists() {
        anyhow::bail!(
            "Image does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.image
        );
    }

    let extractor = build_extractor(&config)?;

    let file_name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.image.display().to_string());
    let bytes = std::fs::read(&args.image)?;
    let image = intake::accept_upload(&config, &file_name, bytes).await?;

    let spinner = (!args.quiet).then(create_spinner);
    let result = extractor.extract(&image).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, report::render(&result, &file_name))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", result.text),
    }

    if result.failed {
        anyhow::bail!("Extraction failed");
    }
    Ok(())
}

fn create_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Processing prescription... This may take a few seconds");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
