//! xtask - Offline tooling for FireQuote
//!
//! Usage: cargo xtask <command>
//!
//! The template loader keeps the TemplateDoc inventory in sync with the
//! directory of Word templates the selector picks from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firequote_core::database::{self, DatabaseConfig, TemplateRepository};
use firequote_core::templates::infer_tags;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "FireQuote offline tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory of .docx templates and upsert their records
    LoadTemplates {
        /// Template directory (defaults to the server's template dir)
        #[arg(long, default_value = "templates_docs")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xtask=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::LoadTemplates { dir } => load_templates(&dir).await,
    }
}

/// Upsert a TemplateDoc record for every .docx file in `dir`.
///
/// Tags come from the file name: underscore-separated service segments,
/// with a trailing `autocad`/`revit`/`both` segment as the format.
async fn load_templates(dir: &Path) -> Result<()> {
    let pool = database::connect(&DatabaseConfig::default())
        .await
        .context("failed to open database")?;
    let templates = TemplateRepository::new(pool);

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read template directory {}", dir.display()))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.to_lowercase().ends_with(".docx"))
        .collect();
    names.sort();

    tracing::info!("found {} templates in {}", names.len(), dir.display());

    for name in &names {
        let tags = infer_tags(name);
        templates
            .upsert(name, &tags.services_tag, &tags.formats_tag)
            .await
            .with_context(|| format!("failed to upsert {name}"))?;
        tracing::info!(
            "upserted {name} (services={}, formats={})",
            tags.services_tag,
            tags.formats_tag
        );
    }

    tracing::info!("done");
    Ok(())
}
