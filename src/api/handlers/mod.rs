mod download;
mod health;
mod index;
mod upload;

pub use download::download_report;
pub use health::health;
pub use index::index;
pub use upload::{method_not_allowed, upload};

/// Template rendered for the landing page.
pub const INDEX_TEMPLATE: &str = "index.html";
/// Template rendered after a successful upload.
pub const RESULT_TEMPLATE: &str = "result.html";
