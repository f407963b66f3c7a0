//! Outcome reporting: the shared result channel between operations and the engine.
//!
//! Every dispatch gets its own [OutcomeSink] tagged with an invocation id. The
//! sink reports at most once: [OutcomeSink::send] consumes it, and dropping an
//! unsent sink reports [Outcome::Abandoned] so the engine never waits on an
//! operation that has already given up.

use tokio::sync::mpsc;

/// Reserved token: the reporting node ends one traversal cycle.
pub const TERMINAL_TOKEN: &str = "LastShape";

/// What an invocation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  /// A routing key or [TERMINAL_TOKEN].
  Token(String),
  /// The sink was dropped without a token (early return or panic).
  Abandoned,
}

/// Message on the shared result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
  /// Invocation the report belongs to.
  pub invocation: u64,
  pub outcome: Outcome,
}

/// Sending half of the result channel handed to one invocation.
#[derive(Debug)]
pub struct OutcomeSink {
  invocation: u64,
  tx: Option<mpsc::UnboundedSender<OutcomeReport>>,
}

impl OutcomeSink {
  pub fn new(invocation: u64, tx: mpsc::UnboundedSender<OutcomeReport>) -> Self {
    Self {
      invocation,
      tx: Some(tx),
    }
  }

  pub fn invocation(&self) -> u64 {
    self.invocation
  }

  /// Reports `token` for this invocation.
  ///
  /// A closed channel means the engine has already stopped listening; the token
  /// is dropped.
  pub fn send(mut self, token: impl Into<String>) {
    let token = token.into();
    self.report(Outcome::Token(token));
  }

  /// Reports [TERMINAL_TOKEN].
  pub fn finish_cycle(self) {
    self.send(TERMINAL_TOKEN);
  }

  fn report(&mut self, outcome: Outcome) {
    if let Some(tx) = self.tx.take() {
      let _ = tx.send(OutcomeReport {
        invocation: self.invocation,
        outcome,
      });
    }
  }
}

impl Drop for OutcomeSink {
  fn drop(&mut self) {
    self.report(Outcome::Abandoned);
  }
}
