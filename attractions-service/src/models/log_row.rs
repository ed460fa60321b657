use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One line of the request log.
///
/// Column order matches the CSV header `project,prompt,timestamp`. The
/// timestamp is local wall-clock time in ISO-8601 form, e.g.
/// `2025-06-01T14:03:22.518200`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub project: String,
    pub prompt: String,
    pub timestamp: NaiveDateTime,
}

impl LogRow {
    /// Create a row stamped with the current local time.
    pub fn new(project: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            prompt: prompt.into(),
            timestamp: Local::now().naive_local(),
        }
    }
}
