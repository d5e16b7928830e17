//! Attachment download.
//!
//! The file name decides the [`AttachmentKind`]. Every supported kind is
//! downloaded the same way: a streamed GET written through a small buffered
//! writer. Names with any other extension produce
//! [`AttachmentOutcome::Unsupported`] without touching the network.

use crate::client::ScoringClient;
use crate::error::AttachmentError;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Write buffer size for downloads.
const CHUNK_SIZE: usize = 1024;

/// Attachment types the scoring service serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// `.mp3`
    Audio,
    /// `.png`
    Image,
    /// `.py`
    Source,
    /// `.xlsx`
    Spreadsheet,
}

impl AttachmentKind {
    /// Classify a file name by its extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "mp3" => Some(Self::Audio),
            "png" => Some(Self::Image),
            "py" => Some(Self::Source),
            "xlsx" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Source => "source",
            Self::Spreadsheet => "spreadsheet",
        };
        f.write_str(name)
    }
}

/// Result of an attachment fetch that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttachmentOutcome {
    /// The file was written to `path`
    Saved {
        kind: AttachmentKind,
        path: PathBuf,
        bytes: u64,
    },

    /// The server answered with a non-2xx status; nothing was written
    HttpStatus(u16),

    /// The extension is not one the service serves; nothing was requested
    Unsupported { extension: String },
}

/// Downloads task attachments next to the run.
#[derive(Debug, Clone)]
pub struct AttachmentFetcher {
    client: ScoringClient,
}

impl AttachmentFetcher {
    pub fn new(client: ScoringClient) -> Self {
        Self { client }
    }

    /// Where the attachment `file_name` is stored locally.
    pub fn local_path(&self, file_name: &str) -> PathBuf {
        match &self.client.config().attachment_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Download the attachment of `task_id` to [`local_path`](Self::local_path).
    ///
    /// The download has no timeout and is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError`] for unsafe file names, transport failures
    /// and write failures. A non-2xx response is an
    /// [`AttachmentOutcome::HttpStatus`], not an error.
    pub async fn fetch_attachment(
        &self,
        task_id: &str,
        file_name: &str,
    ) -> Result<AttachmentOutcome, AttachmentError> {
        let Some(kind) = AttachmentKind::from_file_name(file_name) else {
            let extension = Path::new(file_name)
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::warn!(
                "Unsupported attachment type '{}' for task {}; not downloading",
                extension,
                task_id
            );
            return Ok(AttachmentOutcome::Unsupported { extension });
        };

        if !is_plain_relative(file_name) {
            return Err(AttachmentError::InvalidFileName(file_name.to_string()));
        }

        let url = self.client.config().file_url(task_id);
        let mut response = self.client.http().get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!(
                "Failed to download {} file for task {}: status {}",
                kind,
                task_id,
                status.as_u16()
            );
            return Ok(AttachmentOutcome::HttpStatus(status.as_u16()));
        }

        let path = self.local_path(file_name);
        let io_error = |source| AttachmentError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let file = tokio::fs::File::create(&path).await.map_err(io_error)?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            writer.write_all(&chunk).await.map_err(io_error)?;
            bytes += chunk.len() as u64;
        }
        writer.flush().await.map_err(io_error)?;

        log::info!(
            "Downloaded {} file for task {} to {} ({} bytes)",
            kind,
            task_id,
            path.display(),
            bytes
        );
        Ok(AttachmentOutcome::Saved { kind, path, bytes })
    }
}

/// A relative path made only of normal components.
fn is_plain_relative(file_name: &str) -> bool {
    let path = Path::new(file_name);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
