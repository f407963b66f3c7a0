//! Loader output: the raw records of one drawing.

use serde::{Deserialize, Serialize};

use super::{ConnectorRecord, ShapeRecord};

/// Loader output: the raw records of one drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
  #[serde(default)]
  pub shapes: Vec<ShapeRecord>,
  #[serde(default)]
  pub connectors: Vec<ConnectorRecord>,
}
