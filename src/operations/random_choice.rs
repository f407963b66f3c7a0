//! Operation that reports one of several tokens at random.
//!
//! Stands in for classification steps (e.g. detecting a document's file type)
//! whose result decides which branch the workflow fans out to.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::outcome::OutcomeSink;
use crate::registry::Operation;

#[derive(Debug, Clone)]
pub struct RandomChoiceOperation {
  name: String,
  delay: Duration,
  tokens: Vec<String>,
}

impl RandomChoiceOperation {
  pub fn new<I, S>(name: impl Into<String>, delay: Duration, tokens: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      name: name.into(),
      delay,
      tokens: tokens.into_iter().map(Into::into).collect(),
    }
  }

  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  fn pick(&self) -> Option<String> {
    self.tokens.choose(&mut rand::thread_rng()).cloned()
  }
}

#[async_trait]
impl Operation for RandomChoiceOperation {
  async fn invoke(&self, argument: String, sink: OutcomeSink) {
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    match self.pick() {
      Some(token) => {
        debug!(operation = %self.name, argument = %argument, token = %token, "picked outcome");
        sink.send(token);
      }
      // Dropping the sink reports the invocation as abandoned.
      None => warn!(operation = %self.name, "no tokens to choose from"),
    }
  }
}
