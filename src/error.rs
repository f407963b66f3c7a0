//! Error types for loading graphs and running them.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure reading a graph document from disk or text.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid drawing XML: {0}")]
  Xml(#[from] quick_xml::DeError),
  #[error("invalid graph JSON: {0}")]
  Json(#[from] serde_json::Error),
}

/// Inconsistent graph detected while building the model.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error("connector {from} --[{outcome}]--> {to} references unknown shape '{missing}'")]
  DanglingEdge {
    from: String,
    outcome: String,
    to: String,
    missing: String,
  },
}

/// Fatal error that aborts an engine run.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("start node '{0}' is not in the graph")]
  StartNodeNotFound(String),
  #[error("node '{node_id}' has no bound operation (operation name '{operation}')")]
  UnboundNode { node_id: String, operation: String },
  #[error("node '{node_id}' reported outcome '{token}' which has no matching connector")]
  NoRoute { node_id: String, token: String },
  #[error("operation for node '{node_id}' produced no outcome within {timeout:?}")]
  Timeout { node_id: String, timeout: Duration },
  #[error("operation for node '{node_id}' finished without reporting an outcome")]
  NoOutcome { node_id: String },
  #[error("step limit of {limit} reached at node '{node_id}' before the last cycle finished")]
  StepLimit { node_id: String, limit: u32 },
}

impl EngineError {
  /// Node the run was positioned at when it failed.
  pub fn node_id(&self) -> &str {
    match self {
      EngineError::StartNodeNotFound(id) => id,
      EngineError::UnboundNode { node_id, .. }
      | EngineError::NoRoute { node_id, .. }
      | EngineError::Timeout { node_id, .. }
      | EngineError::NoOutcome { node_id }
      | EngineError::StepLimit { node_id, .. } => node_id,
    }
  }
}

/// Failure writing or reading a run report.
#[derive(Debug, Error)]
pub enum ReportError {
  #[error("run report I/O failed for {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("run report at {} is not valid JSON: {source}", path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}
