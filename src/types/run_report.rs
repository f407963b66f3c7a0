//! DTOs for run_report.json: the dispatch history of one engine run.

use serde::{Deserialize, Serialize};

/// One dispatched node and the outcome it reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntry {
  /// 1-based step index across the whole run.
  pub step: u32,
  /// 1-based cycle the step belongs to.
  pub cycle: u32,
  pub node_id: String,
  pub operation: String,
  /// Outcome token reported by the operation.
  pub outcome: String,
  /// Node the cursor moved to; None when the step completed the run.
  pub next_node_id: Option<String>,
}

/// Root structure for run_report.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
  /// ISO 8601 timestamp when the run started.
  pub started_at: String,
  /// ISO 8601 timestamp when the run finished.
  pub finished_at: Option<String>,
  pub start_node: String,
  pub max_cycles: u32,
  pub cycles_completed: u32,
  /// Recorded steps in dispatch order.
  pub steps: Vec<StepEntry>,
}

impl RunReport {
  pub fn new(start_node: impl Into<String>, max_cycles: u32) -> Self {
    Self {
      started_at: chrono::Utc::now().to_rfc3339(),
      finished_at: None,
      start_node: start_node.into(),
      max_cycles,
      cycles_completed: 0,
      steps: Vec::new(),
    }
  }

  /// Node ids in the order they were dispatched.
  pub fn dispatch_order(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.node_id.as_str()).collect()
  }

  pub(crate) fn finish(&mut self, cycles_completed: u32) {
    self.cycles_completed = cycles_completed;
    self.finished_at = Some(chrono::Utc::now().to_rfc3339());
  }
}
