//! Workflow graph types: raw loader records, the graph model, and run state.

mod connector_record;
mod cursor;
mod graph_document;
mod graph_model;
mod run_report;
mod shape_record;

pub use connector_record::ConnectorRecord;
pub use cursor::Cursor;
pub use graph_document::GraphDocument;
pub use graph_model::GraphModel;
pub use run_report::{RunReport, StepEntry};
pub use shape_record::{ShapeRecord, operation_name_of};
