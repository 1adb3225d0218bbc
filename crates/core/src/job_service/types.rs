//! Wire types for the conversion job API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Responses wrap their payload in a `data` field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Status of a job or of one of its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Waiting,
    Processing,
    Finished,
    Error,
    /// Any status this client does not know about. Treated as non-terminal.
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Finished | Status::Error)
    }
}

/// A conversion job and its tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// One task of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub operation: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

/// Result payload of a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskResult {
    /// Upload form, present on import/upload tasks.
    #[serde(default)]
    pub form: Option<UploadForm>,
    /// Produced files, present on export tasks.
    #[serde(default)]
    pub files: Vec<ExportFile>,
}

/// Where and how to upload the input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A file produced by an export task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

pub const OP_IMPORT_UPLOAD: &str = "import/upload";
pub const OP_CONVERT: &str = "convert";
pub const OP_EXPORT_URL: &str = "export/url";

pub const TASK_IMPORT: &str = "import-file";
pub const TASK_CONVERT: &str = "convert-file";
pub const TASK_EXPORT: &str = "export-file";

impl Job {
    /// First task with the given operation.
    pub fn task_by_operation(&self, operation: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.operation == operation)
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.status == Status::Error)
    }

    /// One line naming every failed task and its reason.
    pub fn failure_summary(&self) -> String {
        let failures: Vec<String> = self.failed_tasks().map(Task::failure_description).collect();
        if failures.is_empty() {
            format!("job {} ended in error", self.id)
        } else {
            failures.join("; ")
        }
    }
}

impl Task {
    pub fn failure_description(&self) -> String {
        let reason = match (&self.message, &self.code) {
            (Some(message), Some(code)) => format!("{} ({})", message, code),
            (Some(message), None) => message.clone(),
            (None, Some(code)) => code.clone(),
            (None, None) => "unknown error".to_string(),
        };
        format!("{}: {}", self.operation, reason)
    }

    /// URL of the first produced file, if any.
    pub fn first_file_url(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.files.first())
            .and_then(|f| f.url.as_deref())
    }
}

/// Body for creating the three-task upload, convert, export job.
pub(crate) fn job_request(input_format: &str, output_format: &str, engine: &str) -> Value {
    serde_json::json!({
        "tasks": {
            TASK_IMPORT: {
                "operation": OP_IMPORT_UPLOAD
            },
            TASK_CONVERT: {
                "operation": OP_CONVERT,
                "input": TASK_IMPORT,
                "input_format": input_format,
                "output_format": output_format,
                "engine": engine
            },
            TASK_EXPORT: {
                "operation": OP_EXPORT_URL,
                "input": TASK_CONVERT
            }
        }
    })
}

/// Import format derived from the file name's extension, `docx` if none.
pub fn input_format_for(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => "docx".to_string(),
    }
}
