//! Graph loaders: drawing XML exported by the diagramming tool, and plain JSON.
//!
//! The XML layout is `document > body > drawing > page`, where every
//! `custom-shape` (attribute `id`) is a node and every `connector` (attributes
//! `start-shape`, `end-shape`) is an edge. Both carry their text in `shptext`
//! children; the last one wins. Missing attributes or text become empty strings.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::LoadError;
use crate::types::{ConnectorRecord, GraphDocument, ShapeRecord};

#[derive(Debug, Default, Deserialize)]
struct XmlDocument {
  #[serde(default)]
  body: XmlBody,
}

#[derive(Debug, Default, Deserialize)]
struct XmlBody {
  #[serde(default)]
  drawing: XmlDrawing,
}

#[derive(Debug, Default, Deserialize)]
struct XmlDrawing {
  #[serde(default, rename = "page")]
  pages: Vec<XmlPage>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlPage {
  #[serde(default, rename = "custom-shape")]
  shapes: Vec<XmlShape>,
  #[serde(default, rename = "connector")]
  connectors: Vec<XmlConnector>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlShape {
  #[serde(default, rename = "@id")]
  id: String,
  #[serde(default, rename = "shptext")]
  texts: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlConnector {
  #[serde(default, rename = "@start-shape")]
  start_shape: String,
  #[serde(default, rename = "@end-shape")]
  end_shape: String,
  #[serde(default, rename = "shptext")]
  texts: Vec<String>,
}

fn last_text(texts: Vec<String>) -> String {
  texts.into_iter().last().unwrap_or_default()
}

/// Parses drawing XML into shape and connector records.
#[instrument(level = "trace", skip(source))]
pub fn parse_drawing_xml(source: &str) -> Result<GraphDocument, LoadError> {
  let doc: XmlDocument = quick_xml::de::from_str(source)?;
  let mut out = GraphDocument::default();
  for page in doc.body.drawing.pages {
    out.shapes.extend(
      page
        .shapes
        .into_iter()
        .map(|s| ShapeRecord::new(s.id, last_text(s.texts))),
    );
    out.connectors.extend(page.connectors.into_iter().map(|c| {
      ConnectorRecord::new(c.start_shape, last_text(c.texts), c.end_shape)
    }));
  }
  Ok(out)
}

/// Parses the JSON form: `{"shapes": [...], "connectors": [...]}`.
#[instrument(level = "trace", skip(source))]
pub fn parse_graph_json(source: &str) -> Result<GraphDocument, LoadError> {
  Ok(serde_json::from_str(source)?)
}

/// Reads a graph document from `path`; `.json` files are parsed as JSON,
/// everything else as drawing XML.
pub fn load_graph_document(path: &Path) -> Result<GraphDocument, LoadError> {
  let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let is_json = path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("json"));
  let doc = if is_json {
    parse_graph_json(&source)?
  } else {
    parse_drawing_xml(&source)?
  };
  info!(
    path = %path.display(),
    shapes = doc.shapes.len(),
    connectors = doc.connectors.len(),
    "loaded graph document"
  );
  Ok(doc)
}
