//! Shared test helpers for table-loader handler tests.

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::{Config, PathsConfig, ServerConfig, UpdaterConfig};
use crate::updater::{UpdateError, UpdateRequest, UpdateService};
use crate::AppState;

pub const INDEX_HTML: &str = include_str!("../web/templates/index.html");
pub const RESULT_HTML: &str = include_str!("../web/templates/result.html");

pub const REPORT_NAME: &str = "Report.xlsm";

/// What the update tool saw when it was invoked.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub request: UpdateRequest,
    /// Contents of the uploaded file at invocation time, if it existed.
    pub file_contents: Option<Vec<u8>>,
}

/// In-memory stand-in for the external update tool.
pub struct FakeUpdater {
    fail: bool,
    runs: Mutex<Vec<RecordedRun>>,
}

impl FakeUpdater {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateService for FakeUpdater {
    async fn run(&self, request: &UpdateRequest) -> Result<(), UpdateError> {
        let file_contents = std::fs::read(&request.file_path).ok();
        self.runs.lock().unwrap().push(RecordedRun {
            request: request.clone(),
            file_contents,
        });

        if self.fail {
            return Err(UpdateError::Launch {
                program: "fake-update-db".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
            });
        }
        Ok(())
    }
}

/// Create a SQLite file at `path` containing the given tables, in order.
pub async fn create_database(path: &Path, tables: &[&str]) {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await
        .expect("Failed to create test database");

    for table in tables {
        sqlx::query(&format!("CREATE TABLE \"{table}\" (id INTEGER PRIMARY KEY, value TEXT)"))
            .execute(&mut conn)
            .await
            .expect("Failed to create test table");
    }

    conn.close().await.expect("Failed to close test database");
}

/// Config rooted in a temporary directory, with the shipped page templates.
pub fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    let root = temp_dir.path();
    let template_dir = root.join("templates");
    std::fs::create_dir_all(&template_dir).expect("Failed to create template dir");
    std::fs::write(template_dir.join("index.html"), INDEX_HTML).unwrap();
    std::fs::write(template_dir.join("result.html"), RESULT_HTML).unwrap();

    let static_dir = root.join("static");
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");

    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            ..Default::default()
        },
        paths: PathsConfig {
            database_path: root.join("vulns.db"),
            static_dir,
            template_dir,
            upload_dir: root.join("upload"),
            report_path: root.join(REPORT_NAME),
        },
        updater: UpdaterConfig::default(),
        max_upload_size: 1024 * 1024, // 1MB for tests
    }
}

/// Create a test AppState with a temporary database and the given updater.
pub async fn test_state(
    temp_dir: &tempfile::TempDir,
    updater: Arc<dyn UpdateService>,
) -> Arc<AppState> {
    let config = test_config(temp_dir);
    create_database(&config.paths.database_path, &["hosts", "vulns"]).await;
    Arc::new(AppState::new(config, updater).expect("Failed to create test state"))
}
