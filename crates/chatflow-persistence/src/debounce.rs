use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Collapses bursts of calls into one trailing call.
///
/// Owns at most one pending timer. Each [`schedule`](Debouncer::schedule)
/// aborts the pending timer and arms a new one; the callback runs once the
/// window passes without another call, with the arguments of the last call.
pub struct Debouncer<A> {
  wait: Duration,
  callback: Arc<dyn Fn(A) + Send + Sync>,
  pending: Option<JoinHandle<()>>,
}

impl<A: Send + 'static> Debouncer<A> {
  pub fn new(wait: Duration, callback: impl Fn(A) + Send + Sync + 'static) -> Self {
    Self {
      wait,
      callback: Arc::new(callback),
      pending: None,
    }
  }

  pub fn wait(&self) -> Duration {
    self.wait
  }

  /// Restart the window with `args` as the pending call.
  ///
  /// Must be called from within a tokio runtime.
  pub fn schedule(&mut self, args: A) {
    self.cancel();

    let callback = Arc::clone(&self.callback);
    let wait = self.wait;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(wait).await;
      callback(args);
    }));
  }

  /// Drop the pending call, if any. Returns whether one was still waiting.
  pub fn cancel(&mut self) -> bool {
    match self.pending.take() {
      Some(handle) => {
        let waiting = !handle.is_finished();
        handle.abort();
        waiting
      }
      None => false,
    }
  }

  pub fn is_pending(&self) -> bool {
    self
      .pending
      .as_ref()
      .is_some_and(|handle| !handle.is_finished())
  }
}

impl<A> std::fmt::Debug for Debouncer<A> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Debouncer")
      .field("wait", &self.wait)
      .field("pending", &self.pending.is_some())
      .finish()
  }
}
