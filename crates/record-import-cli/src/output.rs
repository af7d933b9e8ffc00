use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, SecondsFormat};
use futures_util::StreamExt;
use record_import_client::{BlobContent, BlobMetadata, ByteStream};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Destination for command results. Log lines never go through here.
pub struct Output<W> {
    writer: W,
    is_terminal: bool,
}

impl Output<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: tokio::io::stdout(),
            is_terminal: std::io::stdout().is_terminal(),
        }
    }
}

impl<W: AsyncWrite + Unpin> Output<W> {
    pub fn new(writer: W, is_terminal: bool) -> Self {
        Self {
            writer,
            is_terminal,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub async fn print_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Copy blob content to the output, refusing binary content on a terminal
    pub async fn print_content(&mut self, content: BlobContent) -> Result<u64> {
        if self.is_terminal && is_binary_content_type(&content.content_type) {
            log::error!(
                "Content type {} seems to be binary. Refusing to print to console",
                content.content_type
            );
            bail!("Refusing to print binary content to console");
        }

        let written = copy_stream(content.stream, &mut self.writer).await?;
        self.writer.flush().await?;
        Ok(written)
    }
}

async fn copy_stream<W: AsyncWrite + Unpin>(mut stream: ByteStream, writer: &mut W) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

/// Stream blob content into `path`, replacing any existing file
pub async fn write_content_to_file(content: BlobContent, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let written = copy_stream(content.stream, &mut file).await?;
    file.flush().await?;
    Ok(written)
}

/// Whether a content type names data that is not meant to be read as text
pub fn is_binary_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some((top, sub)) = essence.split_once('/') else {
        return false;
    };

    match top {
        "text" => false,
        "image" | "audio" | "video" | "font" => true,
        "application" => {
            if sub.ends_with("+json") || sub.ends_with("+xml") {
                return false;
            }
            matches!(
                sub,
                "octet-stream"
                    | "marc"
                    | "zip"
                    | "gzip"
                    | "x-gzip"
                    | "x-tar"
                    | "x-bzip2"
                    | "x-7z-compressed"
                    | "pdf"
                    | "vnd.ms-excel"
                    | "msword"
            )
        }
        _ => false,
    }
}

/// Re-render the timestamps of a metadata record in the local time zone
pub fn localize_timestamps(metadata: &mut BlobMetadata) {
    for field in [&mut metadata.creation_time, &mut metadata.modification_time] {
        if let Some(localized) = field.as_deref().and_then(to_local_timestamp) {
            *field = Some(localized);
        }
    }
}

fn to_local_timestamp(value: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| {
            instant
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false)
        })
}
