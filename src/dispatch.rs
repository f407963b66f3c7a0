//! Dispatch resolution: node id to bound operation, and the immutable workflow snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::registry::{Operation, OperationRegistry};
use crate::types::GraphModel;

/// A node whose operation name has no registry binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundNode {
  pub node_id: String,
  pub operation: String,
}

/// Node id to bound operation.
#[derive(Clone, Default)]
pub struct DispatchTable {
  bound: HashMap<String, Arc<dyn Operation>>,
  unbound: Vec<UnboundNode>,
}

impl DispatchTable {
  /// Composes node id → operation name with operation name → operation.
  ///
  /// Unresolved names are logged and recorded; they only become errors if the
  /// engine visits the node.
  pub fn resolve(graph: &GraphModel, registry: &OperationRegistry) -> Self {
    let mut table = DispatchTable::default();
    for node_id in graph.node_ids() {
      let operation = graph.operation_name(node_id).unwrap_or_default();
      match registry.resolve(operation) {
        Some(op) => {
          table.bound.insert(node_id.to_string(), op);
        }
        None => {
          warn!(node_id = %node_id, operation = %operation, "no operation registered for node");
          table.unbound.push(UnboundNode {
            node_id: node_id.to_string(),
            operation: operation.to_string(),
          });
        }
      }
    }
    table
  }

  pub fn get(&self, node_id: &str) -> Option<&Arc<dyn Operation>> {
    self.bound.get(node_id)
  }

  /// Nodes left without an operation, in node id order.
  pub fn unbound(&self) -> &[UnboundNode] {
    &self.unbound
  }

  pub fn bound_count(&self) -> usize {
    self.bound.len()
  }
}

impl fmt::Debug for DispatchTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut bound: Vec<&str> = self.bound.keys().map(String::as_str).collect();
    bound.sort_unstable();
    f.debug_struct("DispatchTable")
      .field("bound", &bound)
      .field("unbound", &self.unbound)
      .finish()
  }
}

/// Immutable snapshot handed to the engine: the graph plus its dispatch table.
#[derive(Debug, Clone)]
pub struct Workflow {
  graph: GraphModel,
  dispatch: DispatchTable,
}

impl Workflow {
  pub fn new(graph: GraphModel, registry: &OperationRegistry) -> Self {
    let dispatch = DispatchTable::resolve(&graph, registry);
    info!(
      nodes = graph.node_count(),
      edges = graph.edge_count(),
      bound = dispatch.bound_count(),
      unbound = dispatch.unbound().len(),
      "workflow resolved"
    );
    Self { graph, dispatch }
  }

  pub fn graph(&self) -> &GraphModel {
    &self.graph
  }

  pub fn dispatch(&self) -> &DispatchTable {
    &self.dispatch
  }
}
