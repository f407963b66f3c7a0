//! Execution cursor owned by the engine loop.

/// Execution cursor owned by the engine loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
  start_node_id: String,
  current_node_id: String,
  completed_cycles: u32,
  max_cycles: u32,
}

impl Cursor {
  pub fn new(start_node_id: impl Into<String>, max_cycles: u32) -> Self {
    let start_node_id = start_node_id.into();
    Self {
      current_node_id: start_node_id.clone(),
      start_node_id,
      completed_cycles: 0,
      max_cycles,
    }
  }

  pub fn current_node_id(&self) -> &str {
    &self.current_node_id
  }

  pub fn start_node_id(&self) -> &str {
    &self.start_node_id
  }

  pub fn completed_cycles(&self) -> u32 {
    self.completed_cycles
  }

  pub fn max_cycles(&self) -> u32 {
    self.max_cycles
  }

  /// 1-based index of the cycle in progress.
  pub fn cycle(&self) -> u32 {
    self.completed_cycles + 1
  }

  pub fn is_finished(&self) -> bool {
    self.completed_cycles >= self.max_cycles
  }

  /// Moves to the destination of a matched edge.
  pub fn advance(&mut self, next_node_id: impl Into<String>) {
    self.current_node_id = next_node_id.into();
  }

  /// Records a completed traversal and rewinds to the start node.
  /// Returns true when the last cycle has been completed.
  pub fn complete_cycle(&mut self) -> bool {
    self.completed_cycles = (self.completed_cycles + 1).min(self.max_cycles);
    self.current_node_id = self.start_node_id.clone();
    self.is_finished()
  }
}
