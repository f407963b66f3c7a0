//! A raw connector record (one edge of the drawing).

use serde::{Deserialize, Serialize};

/// A raw connector record (one edge of the drawing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
  /// Id of the shape the connector starts at.
  #[serde(default)]
  pub from: String,
  /// Outcome text the source operation must report to follow this connector.
  #[serde(default)]
  pub outcome: String,
  /// Id of the shape the connector ends at.
  #[serde(default)]
  pub to: String,
}

impl ConnectorRecord {
  pub fn new(from: impl Into<String>, outcome: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      outcome: outcome.into(),
      to: to.into(),
    }
  }
}
