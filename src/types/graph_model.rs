//! In-memory workflow graph built from shape and connector records.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, instrument, warn};

use super::{ConnectorRecord, GraphDocument, ShapeRecord, operation_name_of};
use crate::error::GraphError;

/// In-memory workflow graph built from shape and connector records.
///
/// Holds three lookups: node id to operation name, node id to argument, and
/// (node id, outcome token) to destination node id. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphModel {
  operations: HashMap<String, String>,
  arguments: HashMap<String, String>,
  edges: HashMap<String, HashMap<String, String>>,
}

impl GraphModel {
  /// Builds the model from a loaded document.
  pub fn from_document(doc: &GraphDocument) -> Result<Self, GraphError> {
    Self::build(&doc.shapes, &doc.connectors)
  }

  /// Builds the model from raw records.
  ///
  /// Malformed shapes and connectors are logged and skipped. The only hard
  /// failure is a connector that names a shape that does not exist.
  #[instrument(level = "trace", skip(shapes, connectors))]
  pub fn build(shapes: &[ShapeRecord], connectors: &[ConnectorRecord]) -> Result<Self, GraphError> {
    let mut model = GraphModel::default();

    for shape in shapes {
      let id = shape.id.trim();
      if id.is_empty() {
        warn!(payload = %shape.payload, "skipping shape without an id");
        continue;
      }
      let operation = operation_name_of(&shape.payload);
      if operation.is_empty() {
        warn!(node_id = %id, payload = %shape.payload, "shape payload names no operation");
      }
      if model
        .operations
        .insert(id.to_string(), operation.to_string())
        .is_some()
      {
        warn!(node_id = %id, "duplicate shape id, later shape wins");
      }
      model
        .arguments
        .insert(id.to_string(), shape.payload.clone());
      debug!(node_id = %id, operation = %operation, "added node");
    }

    for connector in connectors {
      let from = connector.from.trim();
      let to = connector.to.trim();
      let outcome = connector.outcome.trim();
      if outcome.is_empty() {
        warn!(from = %from, to = %to, "skipping connector without outcome text");
        continue;
      }
      for endpoint in [from, to] {
        if !model.contains_node(endpoint) {
          return Err(GraphError::DanglingEdge {
            from: from.to_string(),
            outcome: outcome.to_string(),
            to: to.to_string(),
            missing: endpoint.to_string(),
          });
        }
      }
      let previous = model
        .edges
        .entry(from.to_string())
        .or_default()
        .insert(outcome.to_string(), to.to_string());
      if let Some(previous) = previous {
        warn!(from = %from, outcome = %outcome, previous = %previous, to = %to, "duplicate connector, later connector wins");
      }
      debug!(from = %from, outcome = %outcome, to = %to, "added edge");
    }

    Ok(model)
  }

  pub fn contains_node(&self, node_id: &str) -> bool {
    self.operations.contains_key(node_id)
  }

  /// Operation name bound to `node_id` (may be empty).
  pub fn operation_name(&self, node_id: &str) -> Option<&str> {
    self.operations.get(node_id).map(String::as_str)
  }

  /// Raw payload passed to the node's operation.
  pub fn argument(&self, node_id: &str) -> Option<&str> {
    self.arguments.get(node_id).map(String::as_str)
  }

  /// Destination reached from `node_id` when its operation reports `token`.
  pub fn next_node(&self, node_id: &str, token: &str) -> Option<&str> {
    self
      .edges
      .get(node_id)
      .and_then(|out| out.get(token))
      .map(String::as_str)
  }

  /// Node ids in lexical order.
  pub fn node_ids(&self) -> Vec<&str> {
    let ids: BTreeSet<&str> = self.operations.keys().map(String::as_str).collect();
    ids.into_iter().collect()
  }

  pub fn node_count(&self) -> usize {
    self.operations.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edges.values().map(HashMap::len).sum()
  }
}
