//! Run report persistence.
//!
//! Reports are stored as pretty-printed JSON. A report path that names an
//! existing directory (or ends in a separator) gets [RUN_REPORT_FILENAME]
//! appended.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::ReportError;
use crate::types::RunReport;

/// File name used when a report is written into a directory.
pub const RUN_REPORT_FILENAME: &str = "run_report.json";

/// Where a report given `target` ends up.
pub fn report_file_path(target: &Path) -> PathBuf {
  let names_dir = target.is_dir()
    || target
      .as_os_str()
      .to_str()
      .is_some_and(|s| s.ends_with(std::path::MAIN_SEPARATOR) || s.ends_with('/'));
  if names_dir {
    target.join(RUN_REPORT_FILENAME)
  } else {
    target.to_path_buf()
  }
}

/// Writes `report` to [report_file_path] of `target`, creating missing
/// parent directories. Returns the file actually written.
#[instrument(level = "trace", skip(report))]
pub fn save_run_report(target: &Path, report: &RunReport) -> Result<PathBuf, ReportError> {
  let path = report_file_path(target);
  let io_err = |source| ReportError::Io {
    path: path.clone(),
    source,
  };
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(io_err)?;
  }
  let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
  serde_json::to_writer_pretty(&mut writer, report).map_err(|source| ReportError::Json {
    path: path.clone(),
    source,
  })?;
  writer.flush().map_err(io_err)?;
  debug!(path = %path.display(), steps = report.steps.len(), "run report saved");
  Ok(path)
}

/// Reads a report previously written by [save_run_report].
#[instrument(level = "trace")]
pub fn load_run_report(path: &Path) -> Result<RunReport, ReportError> {
  let file = File::open(path).map_err(|source| ReportError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_reader(BufReader::new(file)).map_err(|source| ReportError::Json {
    path: path.to_path_buf(),
    source,
  })
}
