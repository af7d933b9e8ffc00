use anyhow::{Context, Result};
use record_import_client::RecordImportClient;
use serde_json::Value;
use tokio::io::AsyncWrite;

use super::read_input;
use crate::cli::ProfileCommands;
use crate::output::Output;

pub async fn handle_profile_command<W: AsyncWrite + Unpin>(
    action: ProfileCommands,
    client: &dyn RecordImportClient,
    output: &mut Output<W>,
) -> Result<()> {
    match action {
        ProfileCommands::Modify { id, file } => {
            let data = read_input(file.as_deref()).await?;
            let payload: Value =
                serde_json::from_str(&data).context("Profile is not valid JSON")?;
            client.modify_profile(&id, &payload).await?;
            log::info!("Created/updated profile {}", id);
        }
        ProfileCommands::Query => {
            let profiles = client.query_profiles().await?;
            output.print_json(&profiles).await?;
        }
        ProfileCommands::Read { id } => {
            let profile = client.get_profile(&id).await?;
            output.print_json(&profile).await?;
        }
        ProfileCommands::Delete { id } => {
            client.delete_profile(&id).await?;
            log::info!("Deleted profile {}", id);
        }
    }

    Ok(())
}
