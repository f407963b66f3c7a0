//! Execution engine - drives a workflow for a bounded number of traversal cycles.
//!
//! One scheduling loop owns the [Cursor]. Each step spawns the current node's
//! operation as a tokio task, waits for that invocation's report on the shared
//! result channel, then either follows the matching connector or, on
//! [TERMINAL_TOKEN], rewinds to the start node and counts a finished cycle.
//! The next operation is never dispatched before the current report has been
//! consumed.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::dispatch::Workflow;
use crate::error::EngineError;
use crate::outcome::{Outcome, OutcomeReport, OutcomeSink, TERMINAL_TOKEN};
use crate::types::{Cursor, RunReport, StepEntry};

/// Parameters of one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
  /// Node every cycle begins at.
  pub start_node: String,
  /// Number of full traversals to perform.
  pub max_cycles: u32,
  /// Upper bound on how long one invocation may take to report.
  pub operation_timeout: Option<Duration>,
  /// Upper bound on dispatches over the whole run; exceeding it fails with
  /// [EngineError::StepLimit].
  pub max_steps: Option<u32>,
}

impl EngineConfig {
  pub fn new(start_node: impl Into<String>, max_cycles: u32) -> Self {
    Self {
      start_node: start_node.into(),
      max_cycles,
      operation_timeout: None,
      max_steps: None,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.operation_timeout = Some(timeout);
    self
  }

  pub fn with_max_steps(mut self, max_steps: u32) -> Self {
    self.max_steps = Some(max_steps);
    self
  }
}

/// Runs `workflow` until `config.max_cycles` cycles complete or a fatal error occurs.
///
/// Operation tasks still running when this returns are aborted.
pub async fn run(workflow: &Workflow, config: &EngineConfig) -> Result<RunReport, EngineError> {
  let graph = workflow.graph();
  if !graph.contains_node(&config.start_node) {
    return Err(EngineError::StartNodeNotFound(config.start_node.clone()));
  }

  let mut cursor = Cursor::new(config.start_node.clone(), config.max_cycles);
  let mut report = RunReport::new(config.start_node.clone(), config.max_cycles);
  if cursor.is_finished() {
    info!("max_cycles is 0, nothing to dispatch");
    report.finish(0);
    return Ok(report);
  }

  // The loop keeps `tx` for the whole run, so `rx` never closes while a
  // report is awaited; each sink reports `Abandoned` when dropped.
  let (tx, mut rx) = mpsc::unbounded_channel::<OutcomeReport>();
  let mut tasks = JoinSet::new();
  let mut invocation: u64 = 0;

  info!(start_node = %config.start_node, max_cycles = config.max_cycles, "engine starting");

  loop {
    let node_id = cursor.current_node_id().to_string();
    if let Some(limit) = config.max_steps {
      if report.steps.len() >= limit as usize {
        warn!(node_id = %node_id, limit, "step limit reached");
        return Err(EngineError::StepLimit { node_id, limit });
      }
    }
    let operation_name = graph.operation_name(&node_id).unwrap_or_default().to_string();
    let operation = workflow
      .dispatch()
      .get(&node_id)
      .cloned()
      .ok_or_else(|| EngineError::UnboundNode {
        node_id: node_id.clone(),
        operation: operation_name.clone(),
      })?;
    let argument = graph.argument(&node_id).unwrap_or_default().to_string();

    invocation += 1;
    let sink = OutcomeSink::new(invocation, tx.clone());
    info!(
      node_id = %node_id,
      operation = %operation_name,
      argument = %argument,
      cycle = cursor.cycle(),
      invocation,
      "dispatching"
    );
    tasks.spawn(async move { operation.invoke(argument, sink).await });

    let outcome = await_outcome(&mut rx, invocation, &node_id, config.operation_timeout).await?;
    reap_finished(&mut tasks);

    let token = match outcome {
      Outcome::Token(token) => token,
      Outcome::Abandoned => return Err(EngineError::NoOutcome { node_id }),
    };
    info!(node_id = %node_id, outcome = %token, "operation returned");

    let step = StepEntry {
      step: report.steps.len() as u32 + 1,
      cycle: cursor.cycle(),
      node_id: node_id.clone(),
      operation: operation_name,
      outcome: token.clone(),
      next_node_id: None,
    };

    if token == TERMINAL_TOKEN {
      let finished = cursor.complete_cycle();
      info!(
        completed = cursor.completed_cycles(),
        max_cycles = cursor.max_cycles(),
        "cycle complete"
      );
      if finished {
        report.steps.push(step);
        break;
      }
      report.steps.push(StepEntry {
        next_node_id: Some(cursor.current_node_id().to_string()),
        ..step
      });
      continue;
    }

    let next = graph
      .next_node(&node_id, &token)
      .ok_or_else(|| EngineError::NoRoute {
        node_id: node_id.clone(),
        token: token.clone(),
      })?;
    cursor.advance(next);
    report.steps.push(StepEntry {
      next_node_id: Some(next.to_string()),
      ..step
    });
  }

  report.finish(cursor.completed_cycles());
  info!(
    cycles = report.cycles_completed,
    steps = report.steps.len(),
    "successfully performed all cycles"
  );
  Ok(report)
}

/// Waits for the report of `invocation`, bounded by `timeout` when set.
async fn await_outcome(
  rx: &mut mpsc::UnboundedReceiver<OutcomeReport>,
  invocation: u64,
  node_id: &str,
  timeout: Option<Duration>,
) -> Result<Outcome, EngineError> {
  let wait = next_outcome_for(rx, invocation);
  let outcome = match timeout {
    Some(limit) => tokio::time::timeout(limit, wait)
      .await
      .map_err(|_| EngineError::Timeout {
        node_id: node_id.to_string(),
        timeout: limit,
      })?,
    None => wait.await,
  };
  Ok(outcome.unwrap_or(Outcome::Abandoned))
}

/// Receives until a report tagged with `invocation` arrives; reports from any
/// other invocation are discarded. None when every sender is gone.
pub(crate) async fn next_outcome_for(
  rx: &mut mpsc::UnboundedReceiver<OutcomeReport>,
  invocation: u64,
) -> Option<Outcome> {
  while let Some(report) = rx.recv().await {
    if report.invocation == invocation {
      return Some(report.outcome);
    }
    debug!(
      stale = report.invocation,
      expected = invocation,
      "discarding outcome from earlier invocation"
    );
  }
  None
}

/// Collects finished operation tasks so the set does not grow with the run.
#[instrument(level = "trace", skip(tasks))]
fn reap_finished(tasks: &mut JoinSet<()>) {
  while let Some(result) = tasks.try_join_next() {
    if let Err(e) = result {
      if e.is_panic() {
        warn!(error = %e, "operation task panicked");
      }
    }
  }
}
