//! Operation registry: binds operation names found in the drawing to code.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::outcome::OutcomeSink;

/// A unit of work dispatched for a node.
///
/// Implementations communicate only through `sink`: they report exactly one
/// outcome token, eventually. The argument is the node's raw payload.
#[async_trait]
pub trait Operation: Send + Sync {
  async fn invoke(&self, argument: String, sink: OutcomeSink);
}

/// Adapts an async closure into an [Operation].
pub struct FnOperation<F> {
  f: F,
}

impl<F> FnOperation<F> {
  pub fn new(f: F) -> Self {
    Self { f }
  }
}

#[async_trait]
impl<F, Fut> Operation for FnOperation<F>
where
  F: Fn(String, OutcomeSink) -> Fut + Send + Sync,
  Fut: Future<Output = ()> + Send,
{
  async fn invoke(&self, argument: String, sink: OutcomeSink) {
    (self.f)(argument, sink).await
  }
}

/// Name to operation table, populated once at startup.
#[derive(Clone, Default)]
pub struct OperationRegistry {
  operations: HashMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Binds `name` to `operation`, replacing and returning any earlier binding.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    operation: impl Operation + 'static,
  ) -> Option<Arc<dyn Operation>> {
    self.register_arc(name, Arc::new(operation))
  }

  pub fn register_arc(
    &mut self,
    name: impl Into<String>,
    operation: Arc<dyn Operation>,
  ) -> Option<Arc<dyn Operation>> {
    let name = name.into();
    let previous = self.operations.insert(name.clone(), operation);
    if previous.is_some() {
      debug!(operation = %name, "operation re-registered, replacing earlier binding");
    }
    previous
  }

  /// Binds `name` to an async closure.
  pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F) -> Option<Arc<dyn Operation>>
  where
    F: Fn(String, OutcomeSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.register(name, FnOperation::new(f))
  }

  /// Returns the operation bound to `name`, or None if the name is unbound.
  pub fn resolve(&self, name: &str) -> Option<Arc<dyn Operation>> {
    self.operations.get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.operations.contains_key(name)
  }

  /// Registered names in lexical order.
  pub fn names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn len(&self) -> usize {
    self.operations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.operations.is_empty()
  }
}

impl fmt::Debug for OperationRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OperationRegistry")
      .field("operations", &self.names())
      .finish()
  }
}
