//! Knowledge file access

use crate::types::{AppError, Result, ToolDefinition};
use serde_json::json;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name under which file access is granted to a stage.
pub const TEXT_FILE_READ_TOOL: &str = "TextFileReadTool";

/// A local text file that capability-gated stages may read.
///
/// Every [`read`](Self::read) opens, fully reads and closes the file; nothing
/// is cached between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file as UTF-8.
    ///
    /// Errors are [`AppError::Io`] with a message that names the path.
    pub async fn read(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::Io(describe_io_error(&self.path, &e)))
    }

    /// Read the file, turning a failure into text that can stand in for the
    /// content. A stage whose knowledge file is unreadable still runs.
    pub async fn read_or_describe(&self) -> String {
        match self.read().await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "knowledge file unreadable");
                format!("Error reading file: {}", e)
            }
        }
    }

    /// Definition advertised to the model when file access is granted.
    pub fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TEXT_FILE_READ_TOOL.to_string(),
            description: format!(
                "Reads the content of the text file '{}' and returns it.",
                self.path.display()
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the text file to read",
                        "default": self.path.display().to_string()
                    }
                },
                "required": []
            }),
        }
    }
}

fn describe_io_error(path: &Path, error: &std::io::Error) -> String {
    match error.kind() {
        ErrorKind::NotFound => format!("{} not found", path.display()),
        ErrorKind::PermissionDenied => format!("permission denied reading {}", path.display()),
        ErrorKind::InvalidData => format!("{} is not valid UTF-8 text", path.display()),
        _ => format!("{}: {}", path.display(), error),
    }
}
