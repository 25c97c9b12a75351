use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

pub const REPORT_FILENAME: &str = "report.json";

/// Outcome of one bundled URL as recorded in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub url: String,
    /// Where `index.html` was written; absent when the job failed.
    pub output_path: Option<PathBuf>,
    pub bytes: u64,
    /// Non-fatal errors recorded while bundling.
    pub errors: Vec<String>,
    /// Error that aborted the job.
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            jobs: Vec::new(),
        }
    }

    pub fn total_errors(&self) -> usize {
        self.jobs.iter().map(|job| job.errors.len()).sum()
    }

    pub fn failed_jobs(&self) -> usize {
        self.jobs.iter().filter(|job| job.failure.is_some()).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Writes `report.json` into `output_dir`. Jobs are sorted by URL so the file
/// is stable across runs.
pub fn write_report(output_dir: &Path, report: &RunReport) -> Result<PathBuf, ReportError> {
    let mut report = report.clone();
    report.jobs.sort_by(|a, b| a.url.cmp(&b.url));
    let json = serde_json::to_string_pretty(&report)?;
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    Ok(writer.write(Path::new(REPORT_FILENAME), json)?)
}
