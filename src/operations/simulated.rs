//! Operation that waits out a fixed latency, then reports a fixed token.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::outcome::OutcomeSink;
use crate::registry::Operation;

/// Operation that waits out a fixed latency, then reports a fixed token.
#[derive(Debug, Clone)]
pub struct SimulatedOperation {
  name: String,
  delay: Duration,
  token: String,
}

impl SimulatedOperation {
  pub fn new(name: impl Into<String>, delay: Duration, token: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      delay,
      token: token.into(),
    }
  }

  pub fn token(&self) -> &str {
    &self.token
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }
}

#[async_trait]
impl Operation for SimulatedOperation {
  async fn invoke(&self, argument: String, sink: OutcomeSink) {
    debug!(operation = %self.name, argument = %argument, delay = ?self.delay, "simulating work");
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    sink.send(self.token.clone());
  }
}
