//! # docrouter
//!
//! Concurrent engine for workflows drawn as directed graphs.
//!
//! ## Architecture
//!
//! A drawing is loaded into shape and connector records ([drawing_parser]),
//! translated into a [GraphModel], and resolved against an
//! [OperationRegistry] into an immutable [Workflow]. The [engine] then
//! dispatches one operation at a time as a tokio task, routes on the outcome
//! token each operation reports, and stops after a fixed number of traversal
//! cycles, each ending with [TERMINAL_TOKEN].

pub mod dispatch;
pub mod drawing_parser;
pub mod engine;
#[cfg(test)]
mod engine_test;
pub mod error;
pub mod operations;
pub mod outcome;
pub mod registry;
pub mod report_io;
pub mod runner;
pub mod types;

pub use dispatch::{DispatchTable, UnboundNode, Workflow};
pub use engine::{EngineConfig, run};
pub use error::{EngineError, GraphError, LoadError, ReportError};
pub use operations::{OperationSettings, builtin_registry};
pub use outcome::{Outcome, OutcomeReport, OutcomeSink, TERMINAL_TOKEN};
pub use registry::{FnOperation, Operation, OperationRegistry};
pub use runner::{RunError, RunOptions, load_workflow, run_graph_file};
pub use types::{ConnectorRecord, GraphDocument, GraphModel, RunReport, ShapeRecord, StepEntry};
