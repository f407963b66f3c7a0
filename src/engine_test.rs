//! Tests for the execution engine.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::dispatch::Workflow;
use crate::engine::{EngineConfig, next_outcome_for, run};
use crate::error::EngineError;
use crate::outcome::{Outcome, OutcomeReport, OutcomeSink, TERMINAL_TOKEN};
use crate::registry::OperationRegistry;
use crate::types::{ConnectorRecord, GraphModel, ShapeRecord};

type Trace = Arc<Mutex<Vec<String>>>;

/// Registers `name` as an operation that records `label` and reports `token`.
fn traced(reg: &mut OperationRegistry, trace: &Trace, name: &str, label: &str, token: &str) {
  let trace = trace.clone();
  let label = label.to_string();
  let token = token.to_string();
  reg.register_fn(name, move |_arg, sink: OutcomeSink| {
    trace.lock().unwrap().push(label.clone());
    let token = token.clone();
    async move { sink.send(token) }
  });
}

fn graph(shapes: &[(&str, &str)], connectors: &[(&str, &str, &str)]) -> GraphModel {
  let shapes: Vec<ShapeRecord> = shapes
    .iter()
    .map(|(id, payload)| ShapeRecord::new(*id, *payload))
    .collect();
  let connectors: Vec<ConnectorRecord> = connectors
    .iter()
    .map(|(from, outcome, to)| ConnectorRecord::new(*from, *outcome, *to))
    .collect();
  GraphModel::build(&shapes, &connectors).unwrap()
}

#[tokio::test]
async fn single_terminal_node_runs_max_cycles() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Only", "S", TERMINAL_TOKEN);
  let wf = Workflow::new(graph(&[("S", "[Only]")], &[]), &reg);

  let report = run(&wf, &EngineConfig::new("S", 3)).await.unwrap();

  assert_eq!(*trace.lock().unwrap(), vec!["S", "S", "S"]);
  assert_eq!(report.cycles_completed, 3);
  assert_eq!(report.steps.len(), 3);
  assert_eq!(report.steps[2].next_node_id, None);
  assert!(report.finished_at.is_some());
}

#[tokio::test]
async fn two_node_cycle_dispatch_order() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "First", "S", "next");
  traced(&mut reg, &trace, "Second", "T", TERMINAL_TOKEN);
  let wf = Workflow::new(
    graph(&[("S", "First"), ("T", "Second")], &[("S", "next", "T")]),
    &reg,
  );

  let report = run(&wf, &EngineConfig::new("S", 2)).await.unwrap();

  assert_eq!(*trace.lock().unwrap(), vec!["S", "T", "S", "T"]);
  assert_eq!(report.dispatch_order(), vec!["S", "T", "S", "T"]);
  assert_eq!(report.steps[0].next_node_id.as_deref(), Some("T"));
  assert_eq!(report.steps[1].next_node_id.as_deref(), Some("S"));
  assert_eq!(report.steps[1].cycle, 1);
  assert_eq!(report.steps[2].cycle, 2);
}

#[tokio::test]
async fn unmatched_token_is_fatal_and_names_node_and_token() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Start", "S", "next");
  traced(&mut reg, &trace, "Broken", "X", "nowhere");
  let wf = Workflow::new(
    graph(&[("S", "Start"), ("X", "Broken")], &[("S", "next", "X")]),
    &reg,
  );

  let err = run(&wf, &EngineConfig::new("S", 5)).await.unwrap_err();

  match &err {
    EngineError::NoRoute { node_id, token } => {
      assert_eq!(node_id, "X");
      assert_eq!(token, "nowhere");
    }
    other => panic!("expected NoRoute, got {:?}", other),
  }
  assert!(err.to_string().contains("nowhere"));
  assert_eq!(*trace.lock().unwrap(), vec!["S", "X"]);
}

#[tokio::test]
async fn second_registration_is_the_one_dispatched() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Op", "first", TERMINAL_TOKEN);
  traced(&mut reg, &trace, "Op", "second", TERMINAL_TOKEN);
  let wf = Workflow::new(graph(&[("S", "Op")], &[]), &reg);

  run(&wf, &EngineConfig::new("S", 2)).await.unwrap();

  assert_eq!(*trace.lock().unwrap(), vec!["second", "second"]);
}

#[tokio::test]
async fn unbound_node_fails_only_when_visited() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Start", "S", "go");
  let wf = Workflow::new(
    graph(
      &[("S", "Start"), ("U", "Missing"), ("V", "AlsoMissing")],
      &[("S", "go", "U")],
    ),
    &reg,
  );
  assert_eq!(wf.dispatch().unbound().len(), 2);

  let err = run(&wf, &EngineConfig::new("S", 1)).await.unwrap_err();

  match err {
    EngineError::UnboundNode { node_id, operation } => {
      assert_eq!(node_id, "U");
      assert_eq!(operation, "Missing");
    }
    other => panic!("expected UnboundNode, got {:?}", other),
  }
}

#[tokio::test]
async fn unknown_start_node_is_rejected() {
  let reg = OperationRegistry::new();
  let wf = Workflow::new(graph(&[("S", "Op")], &[]), &reg);
  let err = run(&wf, &EngineConfig::new("nope", 1)).await.unwrap_err();
  assert!(matches!(err, EngineError::StartNodeNotFound(ref id) if id == "nope"));
  assert_eq!(err.node_id(), "nope");
}

#[tokio::test]
async fn zero_cycles_dispatches_nothing() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Op", "S", TERMINAL_TOKEN);
  let wf = Workflow::new(graph(&[("S", "Op")], &[]), &reg);

  let report = run(&wf, &EngineConfig::new("S", 0)).await.unwrap();

  assert!(trace.lock().unwrap().is_empty());
  assert_eq!(report.cycles_completed, 0);
  assert!(report.steps.is_empty());
}

#[tokio::test]
async fn argument_is_passed_verbatim() {
  let seen = Arc::new(Mutex::new(None::<String>));
  let mut reg = OperationRegistry::new();
  let captured = seen.clone();
  reg.register_fn("DoPDFToText", move |arg, sink: OutcomeSink| {
    *captured.lock().unwrap() = Some(arg);
    async move { sink.finish_cycle() }
  });
  let wf = Workflow::new(graph(&[("id4", "[DoPDFToText, docName]")], &[]), &reg);

  run(&wf, &EngineConfig::new("id4", 1)).await.unwrap();

  assert_eq!(seen.lock().unwrap().as_deref(), Some("[DoPDFToText, docName]"));
}

#[tokio::test]
async fn stalled_operation_times_out() {
  let mut reg = OperationRegistry::new();
  reg.register_fn("Hang", |_arg, sink: OutcomeSink| async move {
    tokio::time::sleep(Duration::from_secs(30)).await;
    sink.finish_cycle();
  });
  let wf = Workflow::new(graph(&[("H", "Hang")], &[]), &reg);
  let config = EngineConfig::new("H", 1).with_timeout(Duration::from_millis(50));

  let err = run(&wf, &config).await.unwrap_err();

  match err {
    EngineError::Timeout { node_id, timeout } => {
      assert_eq!(node_id, "H");
      assert_eq!(timeout, Duration::from_millis(50));
    }
    other => panic!("expected Timeout, got {:?}", other),
  }
}

#[tokio::test]
async fn dropped_sink_is_reported_as_no_outcome() {
  let mut reg = OperationRegistry::new();
  reg.register_fn("Quitter", |_arg, sink: OutcomeSink| async move {
    drop(sink);
  });
  let wf = Workflow::new(graph(&[("Q", "Quitter")], &[]), &reg);

  let err = run(&wf, &EngineConfig::new("Q", 1)).await.unwrap_err();

  assert!(matches!(err, EngineError::NoOutcome { ref node_id } if node_id == "Q"));
}

#[tokio::test]
async fn panicking_operation_is_reported_as_no_outcome() {
  let mut reg = OperationRegistry::new();
  reg.register_fn("Boom", |arg: String, sink: OutcomeSink| async move {
    if !arg.is_empty() {
      panic!("operation failed");
    }
    sink.finish_cycle();
  });
  let wf = Workflow::new(graph(&[("B", "Boom")], &[]), &reg);

  let err = run(&wf, &EngineConfig::new("B", 1)).await.unwrap_err();

  assert!(matches!(err, EngineError::NoOutcome { .. }));
}

#[tokio::test]
async fn late_finishing_task_does_not_disturb_next_dispatch() {
  // X reports immediately but keeps running; Y is dispatched while X is still alive.
  let dispatched = Arc::new(AtomicUsize::new(0));
  let mut reg = OperationRegistry::new();
  let counter = dispatched.clone();
  reg.register_fn("Slow", move |_arg, sink: OutcomeSink| {
    counter.fetch_add(1, Ordering::SeqCst);
    async move {
      sink.send("next");
      tokio::time::sleep(Duration::from_millis(30)).await;
    }
  });
  let counter = dispatched.clone();
  reg.register_fn("Fast", move |_arg, sink: OutcomeSink| {
    counter.fetch_add(1, Ordering::SeqCst);
    async move { sink.finish_cycle() }
  });
  let wf = Workflow::new(
    graph(&[("X", "Slow"), ("Y", "Fast")], &[("X", "next", "Y")]),
    &reg,
  );

  let report = run(&wf, &EngineConfig::new("X", 3)).await.unwrap();

  assert_eq!(report.dispatch_order(), vec!["X", "Y", "X", "Y", "X", "Y"]);
  assert_eq!(dispatched.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn stale_reports_are_discarded() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  tx.send(OutcomeReport {
    invocation: 1,
    outcome: Outcome::Token("old".to_string()),
  })
  .unwrap();
  tx.send(OutcomeReport {
    invocation: 2,
    outcome: Outcome::Token("new".to_string()),
  })
  .unwrap();

  let outcome = next_outcome_for(&mut rx, 2).await;

  assert_eq!(outcome, Some(Outcome::Token("new".to_string())));
}

#[tokio::test]
async fn closed_channel_yields_none() {
  let (tx, mut rx) = mpsc::unbounded_channel::<OutcomeReport>();
  drop(tx);
  assert_eq!(next_outcome_for(&mut rx, 1).await, None);
}

mod routing_properties {
  use proptest::prelude::*;

  use super::*;

  /// Chain n0 -> n1 -> ... -> n(k-1); every node reports its own routing token
  /// and the last one reports the terminal token.
  fn chain_workflow(tokens: &[String]) -> (Workflow, Vec<String>) {
    let ids: Vec<String> = (0..=tokens.len()).map(|i| format!("n{}", i)).collect();
    let shapes: Vec<ShapeRecord> = ids
      .iter()
      .map(|id| ShapeRecord::new(id.clone(), format!("[Op{}, arg]", id)))
      .collect();
    let connectors: Vec<ConnectorRecord> = tokens
      .iter()
      .enumerate()
      .map(|(i, t)| ConnectorRecord::new(ids[i].clone(), t.clone(), ids[i + 1].clone()))
      .collect();
    let mut reg = OperationRegistry::new();
    for (i, id) in ids.iter().enumerate() {
      let token = tokens
        .get(i)
        .cloned()
        .unwrap_or_else(|| TERMINAL_TOKEN.to_string());
      reg.register_fn(format!("Op{}", id), move |_arg, sink: OutcomeSink| {
        let token = token.clone();
        async move { sink.send(token) }
      });
    }
    let graph = GraphModel::build(&shapes, &connectors).unwrap();
    (Workflow::new(graph, &reg), ids)
  }

  proptest! {
    #[test]
    fn follows_recorded_destinations_for_every_cycle(
      tokens in prop::collection::vec("[a-z]{1,4}", 0..6),
      cycles in 1u32..4,
    ) {
      let (wf, ids) = chain_workflow(&tokens);
      let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
      let report = rt.block_on(run(&wf, &EngineConfig::new("n0", cycles))).unwrap();
      let expected: Vec<&str> = (0..cycles)
        .flat_map(|_| ids.iter().map(String::as_str))
        .collect();
      prop_assert_eq!(report.dispatch_order(), expected);
      prop_assert_eq!(report.cycles_completed, cycles);
    }
  }
}

#[tokio::test]
async fn routing_loop_without_terminal_hits_step_limit() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "Ping", "A", "go");
  traced(&mut reg, &trace, "Pong", "B", "go");
  let wf = Workflow::new(
    graph(&[("A", "Ping"), ("B", "Pong")], &[("A", "go", "B"), ("B", "go", "A")]),
    &reg,
  );
  let config = EngineConfig::new("A", 1).with_max_steps(5);

  let err = tokio::time::timeout(Duration::from_secs(5), run(&wf, &config))
    .await
    .expect("run returns once the limit is hit")
    .unwrap_err();

  assert!(matches!(err, EngineError::StepLimit { ref node_id, limit: 5 } if node_id == "B"));
  assert_eq!(trace.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn step_limit_equal_to_needed_steps_succeeds() {
  let trace = Trace::default();
  let mut reg = OperationRegistry::new();
  traced(&mut reg, &trace, "First", "S", "next");
  traced(&mut reg, &trace, "Second", "T", TERMINAL_TOKEN);
  let wf = Workflow::new(
    graph(&[("S", "First"), ("T", "Second")], &[("S", "next", "T")]),
    &reg,
  );

  let report = run(&wf, &EngineConfig::new("S", 2).with_max_steps(4))
    .await
    .unwrap();

  assert_eq!(report.steps.len(), 4);
  assert_eq!(report.cycles_completed, 2);
}
