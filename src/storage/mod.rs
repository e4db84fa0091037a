pub mod catalog;
pub mod uploads;

pub use catalog::{CatalogError, TableCatalog};
pub use uploads::{UploadError, UploadStore};
