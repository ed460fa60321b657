//! Append-only CSV log of requests.
//!
//! The file doubles as the search-history document uploaded to the model on
//! every request. Writes are not locked; concurrent appends may interleave.

use crate::models::LogRow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Header line of the log file.
pub const LOG_HEADER: &str = "project,prompt,timestamp\n";

/// What `append` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// Project or prompt was empty.
    Skipped,
    /// The write failed and was logged.
    Failed,
}

/// Log contents ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDocument {
    pub bytes: Vec<u8>,
    /// Number of data rows, header excluded.
    pub rows: usize,
}

impl ContextDocument {
    /// Header-only document used when there is no history yet.
    pub fn empty() -> Self {
        Self {
            bytes: LOG_HEADER.as_bytes().to_vec(),
            rows: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestLog {
    path: PathBuf,
}

impl RequestLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row stamped with the current time.
    ///
    /// Never fails: empty input is skipped and I/O errors are logged.
    pub async fn append(&self, project: &str, prompt: &str) -> AppendOutcome {
        if project.is_empty() || prompt.is_empty() {
            tracing::debug!("Skipping request log entry with empty project or prompt");
            return AppendOutcome::Skipped;
        }

        match self.write_row(&LogRow::new(project, prompt)).await {
            Ok(()) => AppendOutcome::Appended,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to write request log entry"
                );
                AppendOutcome::Failed
            }
        }
    }

    /// The row (plus the header on an empty file) goes out in one write.
    async fn write_row(&self, row: &LogRow) -> Result<(), csv::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let needs_header = file.metadata().await?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(Vec::new());
        writer.serialize(row)?;
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read the whole log for upload.
    ///
    /// A missing or empty file means no prior history and yields
    /// [`ContextDocument::empty`].
    pub async fn load_context(&self) -> std::io::Result<ContextDocument> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => return Ok(ContextDocument::empty()),
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ContextDocument::empty()),
            Err(e) => return Err(e),
        };

        let rows = csv::Reader::from_reader(bytes.as_slice())
            .records()
            .filter(Result::is_ok)
            .count();

        Ok(ContextDocument { bytes, rows })
    }

    /// Parse every row of the log. A missing file has no rows.
    pub async fn entries(&self) -> Result<Vec<LogRow>, csv::Error> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        csv::Reader::from_reader(bytes.as_slice())
            .deserialize()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> RequestLog {
        RequestLog::new(dir.path().join("info.csv"))
    }

    #[tokio::test]
    async fn writes_header_once() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        assert_eq!(log.append("Paris", "museums").await, AppendOutcome::Appended);
        assert_eq!(log.append("Rome", "food").await, AppendOutcome::Appended);
        assert_eq!(log.append("Oslo", "fjords").await, AppendOutcome::Appended);

        let contents = std_fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.matches("project,prompt,timestamp").count(), 1);
        assert!(contents.starts_with(LOG_HEADER));
        assert_eq!(contents.lines().count(), 4);
    }

    #[tokio::test]
    async fn rows_round_trip_in_order() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.append("Paris", "museums").await;
        log.append("Rome", "food").await;

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].project, "Paris");
        assert_eq!(entries[0].prompt, "museums");
        assert_eq!(entries[1].project, "Rome");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[tokio::test]
    async fn quotes_fields_with_separators() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.append("Washington, D.C.", "say \"hi\"\nto monuments").await;

        let entries = log.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project, "Washington, D.C.");
        assert_eq!(entries[0].prompt, "say \"hi\"\nto monuments");
    }

    #[tokio::test]
    async fn empty_input_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        assert_eq!(log.append("", "museums").await, AppendOutcome::Skipped);
        assert_eq!(log.append("Paris", "").await, AppendOutcome::Skipped);
        assert!(!log.path().exists());

        log.append("Paris", "museums").await;
        let before = std_fs::read(log.path()).unwrap();
        log.append("", "").await;
        assert_eq!(std_fs::read(log.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let log = RequestLog::new(dir.path().join("missing-dir").join("info.csv"));

        assert_eq!(log.append("Paris", "museums").await, AppendOutcome::Failed);
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_history() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let context = log.load_context().await.unwrap();
        assert_eq!(context, ContextDocument::empty());
        assert!(log.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_context_counts_data_rows() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.append("Paris", "museums").await;
        log.append("Rome", "food").await;

        let context = log.load_context().await.unwrap();
        assert_eq!(context.rows, 2);
        assert_eq!(context.bytes, std_fs::read(log.path()).unwrap());
    }
}
