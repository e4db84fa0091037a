use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub updater: UpdaterConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub tls_cert_path: PathBuf,
    pub tls_key_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// SQLite file whose tables are listed on the landing page
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Spreadsheet produced by the update tool, served under /downloads
    pub report_path: PathBuf,
}

/// How the external update tool is launched.
///
/// The tool receives `args` first, then the table name, the uploaded file path
/// and the column name. Setting `program = "go"` and `args = ["run", "main.go"]`
/// runs the tool from source instead of a compiled binary.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:443".to_string(),
            tls_cert_path: PathBuf::from("./certificate.crt"),
            tls_key_path: PathBuf::from("./private.key"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./update-db/vulns.db"),
            static_dir: PathBuf::from("web/static"),
            template_dir: PathBuf::from("web/templates"),
            upload_dir: PathBuf::from("web/upload"),
            report_path: PathBuf::from("./update-db/Populated_VMaaS_v4_Dashboard.xlsm"),
        }
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            program: "update-db".to_string(),
            args: Vec::new(),
            working_dir: PathBuf::from("./update-db"),
        }
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address),
            tls_cert_path: env_path("TLS_CERT_PATH", server_defaults.tls_cert_path),
            tls_key_path: env_path("TLS_KEY_PATH", server_defaults.tls_key_path),
        };

        let path_defaults = PathsConfig::default();
        let paths = PathsConfig {
            database_path: env_path("DATABASE_PATH", path_defaults.database_path),
            static_dir: env_path("STATIC_DIR", path_defaults.static_dir),
            template_dir: env_path("TEMPLATE_DIR", path_defaults.template_dir),
            upload_dir: env_path("UPLOAD_DIR", path_defaults.upload_dir),
            report_path: env_path("REPORT_PATH", path_defaults.report_path),
        };

        let updater_defaults = UpdaterConfig::default();
        let updater = UpdaterConfig {
            program: std::env::var("UPDATER_PROGRAM").unwrap_or(updater_defaults.program),
            args: std::env::var("UPDATER_ARGS")
                .map(|a| a.split_whitespace().map(str::to_string).collect())
                .unwrap_or(updater_defaults.args),
            working_dir: env_path("UPDATER_WORKDIR", updater_defaults.working_dir),
        };

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let config = Config {
            server,
            paths,
            updater,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "BIND_ADDRESS '{}' is not a valid socket address",
                self.server.bind_address
            )));
        }

        if self.updater.program.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "UPDATER_PROGRAM cannot be empty".to_string(),
            ));
        }

        match self.report_filename() {
            None => {
                return Err(ConfigError::ValidationError(format!(
                    "REPORT_PATH '{}' has no file name",
                    self.paths.report_path.display()
                )));
            }
            // The name is sent in a quoted Content-Disposition header
            Some(name) if name.chars().any(|c| c.is_control() || c == '"') => {
                return Err(ConfigError::ValidationError(format!(
                    "REPORT_PATH file name {name:?} cannot be used in a download header"
                )));
            }
            Some(_) => {}
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if !self.paths.template_dir.is_dir() {
            tracing::warn!(
                "Template directory {} does not exist; page rendering will fail",
                self.paths.template_dir.display()
            );
        }

        Ok(())
    }

    /// File name the report is downloaded as, taken from the report path.
    pub fn report_filename(&self) -> Option<String> {
        self.paths
            .report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            paths: PathsConfig::default(),
            updater: UpdaterConfig::default(),
            max_upload_size: 1024,
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_report_filename_from_path() {
        let config = valid_config();
        assert_eq!(
            config.report_filename().as_deref(),
            Some("Populated_VMaaS_v4_Dashboard.xlsm")
        );
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let mut config = valid_config();
        config.server.bind_address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_report_path_without_file_name() {
        let mut config = valid_config();
        config.paths.report_path = PathBuf::from("/");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_report_name_unfit_for_header() {
        for name in ["report\n.xlsm", "tab\there.xlsm", "say \"hi\".xlsm"] {
            let mut config = valid_config();
            config.paths.report_path = PathBuf::from("/reports").join(name);
            assert!(config.validate().is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_accepts_report_name_with_spaces() {
        let mut config = valid_config();
        config.paths.report_path = PathBuf::from("/reports/Weekly Dashboard v4.xlsm");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_program() {
        let mut config = valid_config();
        config.updater.program = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_upload_size() {
        let mut config = valid_config();
        config.max_upload_size = 0;
        assert!(config.validate().is_err());
    }
}
