use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::{UpdateError, UpdateRequest, UpdateService};
use crate::config::UpdaterConfig;

/// Runs the external update tool as a child process.
///
/// The child inherits this process's stdout and stderr, so its output only
/// shows up in the server log. There is no timeout: a hung tool blocks the
/// request that started it.
pub struct CommandUpdater {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CommandUpdater {
    pub fn new(config: &UpdaterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir: config.working_dir.clone(),
        }
    }

    fn command(&self, request: &UpdateRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&request.table_name)
            .arg(&request.file_path)
            .arg(&request.column_name)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

#[async_trait]
impl UpdateService for CommandUpdater {
    async fn run(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        tracing::info!(
            program = %self.program,
            table = %request.table_name,
            column = %request.column_name,
            file = %request.file_path.display(),
            "Running update tool"
        );

        let status = self
            .command(request)
            .status()
            .await
            .map_err(|source| UpdateError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            tracing::warn!(program = %self.program, %status, "Update tool failed");
            return Err(UpdateError::Failed(status));
        }

        tracing::info!(table = %request.table_name, "Update tool finished");
        Ok(())
    }
}
