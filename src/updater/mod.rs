mod command;

pub use command::CommandUpdater;

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Failed(ExitStatus),
}

/// One load of an uploaded CSV into the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub table_name: String,
    pub file_path: PathBuf,
    pub column_name: String,
}

/// Abstraction over whatever performs the database update.
/// Implementations must have regenerated the report file when `run` returns `Ok`.
#[async_trait]
pub trait UpdateService: Send + Sync {
    async fn run(&self, request: &UpdateRequest) -> Result<(), UpdateError>;
}
