//! table-loader - internal web front-end for the vulnerability database loader
//!
//! This crate provides:
//! - A landing page listing the tables of a SQLite database
//! - CSV upload that hands the file to an external update tool
//! - Download of the spreadsheet report the update tool produces
//! - HTTPS serving via rustls

pub mod api;
pub mod config;
pub mod storage;
pub mod templates;
#[cfg(test)]
pub mod testutil;
pub mod updater;

use std::sync::Arc;

use config::Config;
use storage::{TableCatalog, UploadStore};
use templates::Templates;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub catalog: TableCatalog,
    pub templates: Templates,
    pub uploads: UploadStore,
    pub updater: Arc<dyn updater::UpdateService>,
}

impl AppState {
    /// Build state from configuration with the given update service.
    pub fn new(
        config: Config,
        updater: Arc<dyn updater::UpdateService>,
    ) -> Result<Self, std::io::Error> {
        let uploads = UploadStore::new(&config.paths.upload_dir)?;
        Ok(Self {
            catalog: TableCatalog::new(&config.paths.database_path),
            templates: Templates::new(&config.paths.template_dir),
            uploads,
            updater,
            config,
        })
    }
}
