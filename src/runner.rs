//! Runner: load a graph file, resolve it against a registry, run it, and
//! optionally write the run report.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::dispatch::Workflow;
use crate::drawing_parser::load_graph_document;
use crate::engine::{self, EngineConfig};
use crate::error::{EngineError, GraphError, LoadError, ReportError};
use crate::registry::OperationRegistry;
use crate::report_io::save_run_report;
use crate::types::{GraphModel, RunReport};

/// Any failure between reading the graph file and writing the report.
#[derive(Debug, Error)]
pub enum RunError {
  #[error(transparent)]
  Load(#[from] LoadError),
  #[error(transparent)]
  Graph(#[from] GraphError),
  #[error(transparent)]
  Engine(#[from] EngineError),
  #[error("failed to write run report: {0}")]
  Report(#[from] ReportError),
}

/// Options for [run_graph_file].
pub struct RunOptions<'a> {
  /// Engine parameters (start node, cycle count, timeout).
  pub engine: EngineConfig,
  /// If set, the run report is written here after a successful run. A
  /// directory receives `run_report.json`.
  pub report_path: Option<&'a Path>,
}

/// Loads the graph at `path` and resolves it against `registry`.
pub fn load_workflow(path: &Path, registry: &OperationRegistry) -> Result<Workflow, RunError> {
  let doc = load_graph_document(path)?;
  let graph = GraphModel::from_document(&doc)?;
  Ok(Workflow::new(graph, registry))
}

/// Loads, resolves and runs the graph at `path`.
pub async fn run_graph_file(
  path: &Path,
  registry: &OperationRegistry,
  options: RunOptions<'_>,
) -> Result<RunReport, RunError> {
  let workflow = load_workflow(path, registry)?;
  let report = engine::run(&workflow, &options.engine).await?;
  if let Some(report_path) = options.report_path {
    let written = save_run_report(report_path, &report)?;
    info!(path = %written.display(), "run report written");
  }
  Ok(report)
}
