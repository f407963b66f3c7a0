//! A raw shape record (one node of the drawing).

use serde::{Deserialize, Serialize};

/// Returns the operation name encoded in a shape payload.
///
/// The name is the first comma-delimited token with surrounding whitespace and
/// square brackets removed, so `"[DoPDFToText, docName]"` names `DoPDFToText`.
/// Malformed payloads still yield a (possibly empty) name.
pub fn operation_name_of(payload: &str) -> &str {
  payload
    .split(',')
    .next()
    .unwrap_or("")
    .trim_matches(|c: char| c.is_whitespace() || c == '[' || c == ']')
}

/// A raw shape record (one node of the drawing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRecord {
  #[serde(default)]
  pub id: String,
  /// Free text of the shape; passed verbatim to the operation as its argument.
  #[serde(default)]
  pub payload: String,
}

impl ShapeRecord {
  pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      payload: payload.into(),
    }
  }

  pub fn operation_name(&self) -> &str {
    operation_name_of(&self.payload)
  }
}
