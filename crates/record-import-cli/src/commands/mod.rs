//! Command handlers. Each one maps a parsed subcommand to client calls and
//! writes its result through [`Output`]; confirmations go to the log.

use anyhow::{Context, Result};
use record_import_client::RecordImportClient;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWrite};

use crate::cli::Commands;
use crate::output::Output;

pub mod blobs;
pub mod profiles;

pub use blobs::handle_blob_command;
pub use profiles::handle_profile_command;

pub async fn run<W: AsyncWrite + Unpin>(
    command: Commands,
    client: &dyn RecordImportClient,
    output: &mut Output<W>,
) -> Result<()> {
    match command {
        Commands::Profiles { action } => handle_profile_command(action, client, output).await,
        Commands::Blobs { action } => handle_blob_command(action, client, output).await,
    }
}

/// Read text input from `file`, or from stdin until it is closed
pub(crate) async fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut data = String::new();
            tokio::io::stdin()
                .read_to_string(&mut data)
                .await
                .context("Failed to read stdin")?;
            Ok(data)
        }
    }
}
