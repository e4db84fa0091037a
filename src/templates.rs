use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Error parsing template: {0}")]
    Read(#[from] std::io::Error),
    #[error("Error parsing template: {0}")]
    Parse(#[source] minijinja::Error),
    #[error("Error executing template: {0}")]
    Render(#[source] minijinja::Error),
}

/// HTML page templates loaded from a directory.
///
/// Templates are read from disk on every render, so edits to the directory
/// take effect without a restart.
pub struct Templates {
    dir: PathBuf,
}

impl Templates {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub async fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        let source = tokio::fs::read_to_string(self.dir.join(name)).await?;
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let template = env
            .template_from_str(&source)
            .map_err(TemplateError::Parse)?;
        template.render(ctx).map_err(TemplateError::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_template(dir: &tempfile::TempDir, name: &str, body: &str) {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    #[tokio::test]
    async fn test_render_escapes_html() {
        let dir = tempfile::tempdir().unwrap();
        write_template(&dir, "page.html", "<p>{{ value }}</p>");
        let templates = Templates::new(dir.path());

        let html = templates
            .render("page.html", json!({ "value": "<script>" }))
            .await
            .unwrap();
        assert_eq!(html, "<p>&lt;script&gt;</p>");
    }

    #[tokio::test]
    async fn test_render_picks_up_edits() {
        let dir = tempfile::tempdir().unwrap();
        let templates = Templates::new(dir.path());

        write_template(&dir, "page.html", "one");
        assert_eq!(templates.render("page.html", ()).await.unwrap(), "one");

        write_template(&dir, "page.html", "two");
        assert_eq!(templates.render("page.html", ()).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_missing_template_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let templates = Templates::new(dir.path());

        let err = templates.render("missing.html", ()).await.unwrap_err();
        assert!(matches!(err, TemplateError::Read(_)));
        assert!(err.to_string().starts_with("Error parsing template:"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_template(&dir, "page.html", "{% for x in %}");
        let templates = Templates::new(dir.path());

        let err = templates.render("page.html", ()).await.unwrap_err();
        assert!(matches!(err, TemplateError::Parse(_)));
    }

    #[tokio::test]
    async fn test_runtime_failure_is_execute_error() {
        let dir = tempfile::tempdir().unwrap();
        write_template(&dir, "page.html", "{{ value + 1 }}");
        let templates = Templates::new(dir.path());

        let err = templates
            .render("page.html", json!({ "value": "text" }))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
        assert!(err.to_string().starts_with("Error executing template:"));
    }
}
