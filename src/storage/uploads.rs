use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Prefix of in-progress uploads in the upload directory.
const STAGING_PREFIX: &str = ".upload-";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid upload file name: {0:?}")]
    InvalidName(String),
}

/// Directory that uploaded CSV files are written into, keyed by the client's
/// file name. A second completed upload with the same name replaces the first;
/// an upload that is never finished leaves the existing file untouched.
pub struct UploadStore {
    base_path: PathBuf,
}

impl UploadStore {
    /// Creates the directory if needed. The stored path is absolute because the
    /// update tool runs from its own working directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(base_path.as_ref())?;
        let base_path = std::fs::canonicalize(base_path.as_ref())?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path an upload named `file_name` is stored at.
    pub fn upload_path(&self, file_name: &str) -> Result<PathBuf, UploadError> {
        let name = base_name(file_name)
            .ok_or_else(|| UploadError::InvalidName(file_name.to_string()))?;
        Ok(self.base_path.join(name))
    }

    /// Start an upload. Chunks go to a staging file in the same directory,
    /// which replaces `<dir>/<name>` only in [`PendingUpload::finish`].
    pub async fn create(&self, file_name: &str) -> Result<PendingUpload, UploadError> {
        let path = self.upload_path(file_name)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.base_path)?;
        let (file, staging) = staging.into_parts();
        Ok(PendingUpload {
            path,
            staging,
            file: File::from_std(file),
        })
    }
}

/// An upload being written to disk. Call [`PendingUpload::finish`] once all
/// chunks are written. Dropping it unfinished deletes the staging file.
pub struct PendingUpload {
    path: PathBuf,
    staging: TempPath,
    file: File,
}

impl PendingUpload {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.file.write_all(chunk).await?;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<PathBuf, UploadError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);
        self.staging.persist(&self.path).map_err(|e| e.error)?;
        Ok(self.path)
    }
}

/// Final component of a client-supplied file name. Browsers on Windows may
/// send a full path, so both separators are stripped.
fn base_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}
