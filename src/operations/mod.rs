//! Built-in document-routing operations.
//!
//! These simulate the email attachment router the engine was first drawn for:
//! each one waits for a latency typical of the real work, then reports the
//! outcome text of the connector it leaves through.

mod random_choice;
mod simulated;

use std::time::Duration;

use crate::outcome::TERMINAL_TOKEN;
use crate::registry::OperationRegistry;

pub use random_choice::RandomChoiceOperation;
pub use simulated::SimulatedOperation;

/// Outcome of `GetFileType` for PDF attachments.
pub const FILE_TYPE_PDF: &str = "[pdf]";
/// Outcome of `GetFileType` for scanned images.
pub const FILE_TYPE_IMAGE: &str = "[image]";
/// Outcome of `GetFileType` for word processor documents.
pub const FILE_TYPE_DOC: &str = "[doc]";
/// Outcome of `GetFileType` for anything else.
pub const FILE_TYPE_ELSE: &str = "[ELSE]";

/// Tuning for the built-in operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSettings {
  /// Multiplier applied to every simulated latency; 0 makes operations instant.
  pub latency_scale: f64,
}

impl Default for OperationSettings {
  fn default() -> Self {
    Self { latency_scale: 1.0 }
  }
}

impl OperationSettings {
  pub fn instant() -> Self {
    Self { latency_scale: 0.0 }
  }

  /// Scales `secs` seconds of latency; negative or non-finite scales count as 0.
  pub fn latency(&self, secs: u64) -> Duration {
    let scale = if self.latency_scale.is_finite() && self.latency_scale > 0.0 {
      self.latency_scale
    } else {
      0.0
    };
    Duration::from_secs(secs).mul_f64(scale)
  }
}

/// Registry with every built-in operation bound by name.
pub fn builtin_registry(settings: &OperationSettings) -> OperationRegistry {
  let mut registry = OperationRegistry::new();
  let fixed = [
    ("GetNextEmail", 4, "[emailXML]"),
    ("GetNextAttachment", 2, "[docName]"),
    ("DoPDFToText", 3, "[docStr]"),
    ("DoOCRToText", 4, "[docStr]"),
    ("DoDocToText", 4, "[docStr]"),
    ("SaveStringToFile", 3, TERMINAL_TOKEN),
    ("SaveFile", 4, TERMINAL_TOKEN),
  ];
  for (name, secs, token) in fixed {
    registry.register(
      name,
      SimulatedOperation::new(name, settings.latency(secs), token),
    );
  }
  registry.register(
    "GetFileType",
    RandomChoiceOperation::new(
      "GetFileType",
      settings.latency(2),
      [FILE_TYPE_PDF, FILE_TYPE_IMAGE, FILE_TYPE_DOC, FILE_TYPE_ELSE],
    ),
  );
  registry
}
