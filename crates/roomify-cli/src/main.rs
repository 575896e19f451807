//! Roomify CLI: drive the upload widget headlessly and manage the hosting config.
//!
//! Configuration comes from the environment (`ROOMIFY_*`, `.env` honoured).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use roomify_cli::{
    init_tracing, progress_line, run_upload, truncate_string, HostingSummary, UploadSummary,
};
use roomify_core::{RoomifyConfig, SelectedFile};
use roomify_storage::{
    create_hosting_slug, create_kv_store, get_hosting_config, get_or_create_hosting_config,
    hosted_asset,
};
use roomify_upload::{content_type_for_filename, Base64Encoder};
use serde::Serialize;

const DATA_URL_PREVIEW_LEN: usize = 64;

#[derive(Parser)]
#[command(name = "roomify", about = "Roomify floor plan upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a floor plan image and print its data URL once analysis completes
    Upload {
        /// Path to the image (.png, .jpg, .jpeg)
        file: PathBuf,
        /// Declared content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// Simulate a signed-out session
        #[arg(long)]
        signed_out: bool,
        /// Write the full data URL to this file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the full data URL instead of a preview
        #[arg(long)]
        full: bool,
    },
    /// Generate a new hosting slug
    Slug,
    /// Show the hosting config, creating it when absent
    Hosting {
        /// Only read the stored config, never create one
        #[arg(long)]
        no_create: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn upload(
    config: &RoomifyConfig,
    path: PathBuf,
    content_type: Option<String>,
    signed_out: bool,
    output: Option<PathBuf>,
    full: bool,
) -> anyhow::Result<()> {
    tracing::debug!(path = %path.display(), "Reading upload source");
    let data = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let content_type = content_type
        .or_else(|| content_type_for_filename(&file_name).map(String::from))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let file = SelectedFile::new(file_name.clone(), content_type.clone(), data);
    let size_bytes = file.size();

    let data_url = run_upload(
        config.upload().clone(),
        file,
        !signed_out,
        Arc::new(Base64Encoder),
        |snapshot| eprintln!("{}", progress_line(snapshot.progress, snapshot.status_text())),
    )
    .await?;

    let written_to = match output {
        Some(out) => {
            tokio::fs::write(&out, data_url.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            Some(out.display().to_string())
        }
        None => None,
    };

    print_json(&UploadSummary {
        file_name,
        content_type,
        size_bytes,
        data_url_len: data_url.len(),
        data_url: if full {
            data_url
        } else {
            truncate_string(&data_url, DATA_URL_PREVIEW_LEN)
        },
        written_to,
    })
}

async fn hosting(config: &RoomifyConfig, no_create: bool) -> anyhow::Result<()> {
    let store = create_kv_store(config)
        .await
        .context("Failed to open key-value store")?;

    tracing::debug!(backend = %store.backend_type(), "Key-value store ready");

    let existing = get_hosting_config(store.as_ref())
        .await
        .context("Failed to read hosting config")?;

    let (hosting_config, created) = match existing {
        Some(existing) => (existing, false),
        None if no_create => anyhow::bail!("No hosting config stored"),
        None => {
            let created = get_or_create_hosting_config(store.as_ref())
                .await
                .context("Failed to create hosting config")?;
            (created, true)
        }
    };

    let asset = hosted_asset(&hosting_config);
    print_json(&HostingSummary {
        host: hosting_config.host(),
        subdomain: hosting_config.subdomain,
        url: asset.url,
        created,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = RoomifyConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Upload {
            file,
            content_type,
            signed_out,
            output,
            full,
        } => upload(&config, file, content_type, signed_out, output, full).await?,
        Commands::Slug => println!("{}", create_hosting_slug()),
        Commands::Hosting { no_create } => hosting(&config, no_create).await?,
    }

    Ok(())
}
