//! CLI: Run a document-routing workflow from a drawing export.
//!
//! Loads the graph, binds the built-in operations, and runs the engine for a
//! fixed number of cycles starting at the given shape.
//!
//! Usage: `run_dag [OPTIONS] [path-to-graph]`
//! Example: run_dag --start id5 --max-cycles 3 demos/email_doc_router.xml
//!
//! Set RUST_LOG=docrouter=debug for per-node detail.

use clap::Parser;
use docrouter::{
  EngineConfig, OperationSettings, RunOptions, builtin_registry, run_graph_file,
};
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_GRAPH: &str = "./EmailDocRouter.xml";
const DEFAULT_START: &str = "id5";
const DEFAULT_MAX_CYCLES: u32 = 20;

/// Run a document-routing workflow drawn as a graph.
#[derive(Parser, Debug)]
#[command(name = "run_dag")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  DOCROUTER_START_NODE      Shape id every cycle starts at.
  DOCROUTER_MAX_CYCLES      Number of full traversals to run.
  DOCROUTER_LATENCY_SCALE   Multiplier for simulated operation latency (0 = instant).

Examples:
  run_dag demos/email_doc_router.xml
  run_dag --max-cycles 3 --latency-scale 0 --report out/run_report.json demos/email_doc_router.xml"#
)]
struct Args {
  /// Shape id every cycle starts at.
  #[arg(long, value_name = "ID", default_value = DEFAULT_START)]
  start: String,

  /// Number of full traversals of the graph to run.
  #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CYCLES)]
  max_cycles: u32,

  /// Fail the run when one operation takes longer than this many seconds.
  #[arg(long, value_name = "SECS")]
  timeout_secs: Option<f64>,

  /// Fail the run after this many operation dispatches.
  #[arg(long, value_name = "N")]
  max_steps: Option<u32>,

  /// Multiplier for simulated operation latency (0 = instant).
  #[arg(long, value_name = "F", default_value_t = 1.0)]
  latency_scale: f64,

  /// Write the run report (JSON) to this path on success; a directory gets run_report.json.
  #[arg(long, value_name = "PATH")]
  report: Option<PathBuf>,

  /// Path to the drawing XML (or .json) graph file.
  #[arg(value_name = "path-to-graph", default_value = DEFAULT_GRAPH)]
  graph_path: PathBuf,
}

/// Parses an env override, keeping `fallback` when unset and exiting when malformed.
fn env_override<T: std::str::FromStr>(key: &str, fallback: T) -> T {
  match env::var(key) {
    Ok(raw) => match raw.trim().parse() {
      Ok(v) => v,
      Err(_) => {
        eprintln!("Invalid value for {}: {:?}", key, raw);
        process::exit(2);
      }
    },
    Err(_) => fallback,
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  // Env vars override flags.
  let start = env::var("DOCROUTER_START_NODE").unwrap_or_else(|_| args.start.clone());
  let max_cycles = env_override("DOCROUTER_MAX_CYCLES", args.max_cycles);
  let latency_scale = env_override("DOCROUTER_LATENCY_SCALE", args.latency_scale);

  let mut engine = EngineConfig::new(start, max_cycles);
  if let Some(secs) = args.timeout_secs {
    match Duration::try_from_secs_f64(secs) {
      Ok(timeout) => engine = engine.with_timeout(timeout),
      Err(_) => {
        eprintln!("Invalid --timeout-secs: {}", secs);
        process::exit(2);
      }
    }
  }

  if let Some(max_steps) = args.max_steps {
    engine = engine.with_max_steps(max_steps);
  }

  info!(
    graph = %args.graph_path.display(),
    start = %engine.start_node,
    max_cycles = engine.max_cycles,
    timeout = ?engine.operation_timeout,
    max_steps = ?engine.max_steps,
    latency_scale,
    "run_dag starting"
  );

  let registry = builtin_registry(&OperationSettings { latency_scale });
  let options = RunOptions {
    engine,
    report_path: args.report.as_deref(),
  };

  let report = match run_graph_file(&args.graph_path, &registry, options).await {
    Ok(r) => r,
    Err(e) => {
      eprintln!("Run failed: {}", e);
      process::exit(1);
    }
  };

  println!("Workflow completed.");
  println!("  Cycles: {}/{}", report.cycles_completed, report.max_cycles);
  println!("  Steps: {}", report.steps.len());
  println!("  Dispatch order: {:?}", report.dispatch_order());
}
