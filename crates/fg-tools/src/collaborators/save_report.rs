// save_report.rs — Persist a research report to the reports directory.
//
// The only write-capable collaborator, gated behind the save_report
// capability at registration. File names combine a timestamp with a
// sanitized slug of the title so reports never collide or escape the
// directory.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::error::ToolError;
use crate::registry::ToolHandler;

/// Title slugs are capped to keep file names manageable.
const MAX_SLUG_LEN: usize = 50;

pub struct SaveReport {
    reports_dir: PathBuf,
}

impl SaveReport {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    /// Keep only characters that are safe in a file name; everything
    /// else becomes an underscore. Path separators can never survive.
    fn slugify(title: &str) -> String {
        let slug: String = title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        slug.chars().take(MAX_SLUG_LEN).collect()
    }
}

impl ToolHandler for SaveReport {
    fn name(&self) -> &str {
        "save_report"
    }

    fn invoke(&self, arguments: &Map<String, Value>) -> Result<Value, ToolError> {
        let title = arguments
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument {
                name: "title".to_string(),
            })?;
        let content = arguments
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument {
                name: "content".to_string(),
            })?;

        fs::create_dir_all(&self.reports_dir).map_err(|source| ToolError::Io {
            tool: "save_report".to_string(),
            source,
        })?;

        let now = Utc::now();
        let file_name = format!("{}_{}.md", now.format("%Y%m%d_%H%M%S"), Self::slugify(title));
        let path = self.reports_dir.join(&file_name);

        let document = format!(
            "# {title}\n\n*Generated: {timestamp}*\n\n---\n\n{content}\n",
            title = title,
            timestamp = now.format("%Y-%m-%d %H:%M:%S UTC"),
            content = content,
        );

        fs::write(&path, &document).map_err(|source| ToolError::Io {
            tool: "save_report".to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), bytes = document.len(), "report saved");
        Ok(json!({
            "path": path.to_string_lossy(),
            "bytes_written": document.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn report_is_written_with_title_and_content() {
        let dir = tempdir().unwrap();
        let tool = SaveReport::new(dir.path());

        let payload = tool
            .invoke(&args(json!({
                "title": "Q3 semiconductor review",
                "content": "Demand held up better than feared."
            })))
            .unwrap();

        let path = PathBuf::from(payload["path"].as_str().unwrap());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Q3 semiconductor review"));
        assert!(written.contains("Demand held up better than feared."));
    }

    #[test]
    fn title_cannot_escape_the_reports_directory() {
        let dir = tempdir().unwrap();
        let tool = SaveReport::new(dir.path());

        let payload = tool
            .invoke(&args(json!({
                "title": "../../etc/passwd",
                "content": "x"
            })))
            .unwrap();

        let path = PathBuf::from(payload["path"].as_str().unwrap());
        // The sanitized file still lands inside the reports directory.
        assert!(path.starts_with(dir.path()));
        assert!(!path.to_string_lossy().contains(".."));
    }

    #[test]
    fn missing_content_is_invalid() {
        let dir = tempdir().unwrap();
        let tool = SaveReport::new(dir.path());
        assert!(matches!(
            tool.invoke(&args(json!({"title": "t"}))),
            Err(ToolError::InvalidArgument { .. })
        ));
    }
}
