use anyhow::{Context, Result};
use futures_util::StreamExt;
use record_import_client::{build_blob_query, BlobQueryInput, RecordImportClient};
use reqwest::Body;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWrite};

use crate::cli::{BlobCommands, BlobQueryArgs};
use crate::output::{localize_timestamps, write_content_to_file, Output};

pub async fn handle_blob_command<W: AsyncWrite + Unpin>(
    action: BlobCommands,
    client: &dyn RecordImportClient,
    output: &mut Output<W>,
) -> Result<()> {
    match action {
        BlobCommands::Create {
            file,
            profile,
            content_type,
        } => {
            let body = upload_body(file.as_deref()).await?;
            let id = client.create_blob(&profile, &content_type, body).await?;
            log::info!("Created a new blob {}", id);
        }
        BlobCommands::Read { id } => {
            let mut metadata = client.get_blob_metadata(&id).await?;
            localize_timestamps(&mut metadata);
            output.print_json(&metadata).await?;
        }
        BlobCommands::Delete { id } => {
            client.delete_blob(&id).await?;
            log::info!("Deleted blob {}", id);
        }
        BlobCommands::ReadContent { id, file } => {
            let content = client.get_blob_content(&id).await?;
            match file {
                Some(path) => {
                    write_content_to_file(content, &path).await?;
                    log::info!("Wrote blob content to file {}", path.display());
                }
                None => {
                    output.print_content(content).await?;
                }
            }
        }
        BlobCommands::DeleteContent { id } => {
            client.delete_blob_content(&id).await?;
            log::info!("Deleted content for blob {}", id);
        }
        BlobCommands::Abort { id } => {
            client.set_aborted(&id).await?;
            log::info!("Aborted processing of blob {}", id);
        }
        BlobCommands::Query(args) => query_blobs(args, client, output).await?,
    }

    Ok(())
}

async fn query_blobs<W: AsyncWrite + Unpin>(
    args: BlobQueryArgs,
    client: &dyn RecordImportClient,
    output: &mut Output<W>,
) -> Result<()> {
    let query = build_blob_query(&BlobQueryInput::from(args));
    log::info!("Query: {}", serde_json::to_string(&query)?);

    let mut pages = client.get_blobs(query);
    while let Some(page) = pages.next().await {
        output.print_json(&page?).await?;
    }

    Ok(())
}

/// Request body for a new blob: the named file streamed from disk, or all of stdin
async fn upload_body(file: Option<&Path>) -> Result<Body> {
    match file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Body::from(file))
        }
        None => {
            let mut buffer = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .context("Failed to read blob content from stdin")?;
            Ok(Body::from(buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockClient;
    use chrono::DateTime;
    use record_import_client::{ApiError, BlobMetadata};
    use reqwest::StatusCode;
    use serde_json::{json, Value};

    async fn run(action: BlobCommands, client: &MockClient, is_terminal: bool) -> (Result<()>, Vec<u8>) {
        let mut output = Output::new(Vec::new(), is_terminal);
        let result = handle_blob_command(action, client, &mut output).await;
        (result, output.into_inner())
    }

    fn blob(id: &str) -> BlobMetadata {
        serde_json::from_value(json!({"id": id, "state": "PENDING_TRANSFORMATION"})).unwrap()
    }

    #[tokio::test]
    async fn create_uploads_file_with_profile_and_type() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "<record/>").unwrap();

        let client = MockClient::new();
        let (result, printed) = run(
            BlobCommands::Create {
                file: Some(file.path().to_path_buf()),
                profile: "foo".to_string(),
                content_type: "application/xml".to_string(),
            },
            &client,
            false,
        )
        .await;

        result.unwrap();
        assert!(printed.is_empty());
        assert_eq!(client.calls(), vec!["create_blob foo application/xml".to_string()]);
    }

    #[tokio::test]
    async fn create_with_missing_file_fails_before_upload() {
        let client = MockClient::new();
        let (result, _) = run(
            BlobCommands::Create {
                file: Some("/nonexistent/blob.xml".into()),
                profile: "foo".to_string(),
                content_type: "application/xml".to_string(),
            },
            &client,
            false,
        )
        .await;

        assert!(result.is_err());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn read_prints_metadata_with_local_timestamps() {
        let client = MockClient::new();
        let (result, printed) = run(BlobCommands::Read { id: "abc".to_string() }, &client, false).await;

        result.unwrap();
        let value: Value = serde_json::from_slice(&printed).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["state"], "TRANSFORMED");
        let creation = DateTime::parse_from_rfc3339(value["creationTime"].as_str().unwrap()).unwrap();
        assert_eq!(
            creation,
            DateTime::parse_from_rfc3339("2022-05-12T09:00:00Z").unwrap()
        );
    }

    #[tokio::test]
    async fn read_content_prints_text_on_terminal() {
        let client = MockClient {
            content: b"[{\"leader\":\"00000cam\"}]".to_vec(),
            ..MockClient::new()
        };
        let (result, printed) = run(
            BlobCommands::ReadContent {
                id: "abc".to_string(),
                file: None,
            },
            &client,
            true,
        )
        .await;

        result.unwrap();
        assert_eq!(printed, b"[{\"leader\":\"00000cam\"}]");
    }

    #[tokio::test]
    async fn read_content_refuses_binary_on_terminal() {
        let client = MockClient {
            content_type: "application/octet-stream".to_string(),
            content: vec![0, 159, 146, 150],
            ..MockClient::new()
        };
        let (result, printed) = run(
            BlobCommands::ReadContent {
                id: "abc".to_string(),
                file: None,
            },
            &client,
            true,
        )
        .await;

        assert!(result.is_err());
        assert!(printed.is_empty());
    }

    #[tokio::test]
    async fn read_content_writes_binary_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let client = MockClient {
            content_type: "application/octet-stream".to_string(),
            content: vec![0, 159, 146, 150],
            ..MockClient::new()
        };
        let (result, printed) = run(
            BlobCommands::ReadContent {
                id: "abc".to_string(),
                file: Some(path.clone()),
            },
            &client,
            true,
        )
        .await;

        result.unwrap();
        assert!(printed.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 159, 146, 150]);
    }

    #[tokio::test]
    async fn lifecycle_commands_call_the_client() {
        let client = MockClient::new();
        for action in [
            BlobCommands::Delete { id: "a".to_string() },
            BlobCommands::DeleteContent { id: "b".to_string() },
            BlobCommands::Abort { id: "c".to_string() },
        ] {
            let (result, _) = run(action, &client, false).await;
            result.unwrap();
        }

        assert_eq!(
            client.calls(),
            vec![
                "delete_blob a".to_string(),
                "delete_blob_content b".to_string(),
                "set_aborted c".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn query_builds_filter_and_prints_every_page() {
        let client = MockClient {
            blob_pages: vec![vec![blob("1"), blob("2")], vec![blob("3")]],
            ..MockClient::new()
        };
        let (result, printed) = run(
            BlobCommands::Query(BlobQueryArgs {
                state: Some("transformed".to_string()),
                created_after: Some("2022-05-12".to_string()),
                created_before: Some("garbage".to_string()),
                ..Default::default()
            }),
            &client,
            false,
        )
        .await;

        result.unwrap();
        let queries = client.queries.lock().unwrap();
        assert_eq!(queries[0].state.as_deref(), Some("transformed"));
        assert_eq!(
            queries[0].creation_time,
            Some(["2022-05-12".to_string(), "3000-01-01".to_string()])
        );
        assert!(queries[0].modification_time.is_none());

        let printed = String::from_utf8(printed).unwrap();
        let pages: Vec<Value> = serde_json::Deserializer::from_str(&printed)
            .into_iter::<Value>()
            .map(|page| page.unwrap())
            .collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0][1]["id"], "2");
        assert_eq!(pages[1][0]["id"], "3");
    }

    #[tokio::test]
    async fn query_failure_is_reported() {
        let client = MockClient::failing(StatusCode::UNAUTHORIZED);
        let (result, printed) = run(BlobCommands::Query(BlobQueryArgs::default()), &client, false).await;

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ApiError>().and_then(ApiError::status),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert!(printed.is_empty());
    }
}
