//! Cancellation of queries whose caller stopped waiting.
//!
//! A `tokio_rusqlite` call runs to completion on the connection thread even
//! after the awaiting future is dropped, holding up every call queued behind
//! it. A [`QueryTicket`] ties the two sides together: the closure checks in
//! before it starts and checks out when it is done, and dropping the
//! [`CancelOnDrop`] guard either skips a query that has not started yet or
//! interrupts the one that is running.

use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::InterruptHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Queued,
  Running,
  Finished,
  Abandoned,
}

pub struct QueryTicket {
  phase:     Mutex<Phase>,
  interrupt: Arc<InterruptHandle>,
}

impl QueryTicket {
  pub fn new(interrupt: Arc<InterruptHandle>) -> Arc<Self> {
    Arc::new(Self { phase: Mutex::new(Phase::Queued), interrupt })
  }

  fn with_phase<R>(&self, f: impl FnOnce(&mut Phase) -> R) -> R {
    let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut phase)
  }

  /// Called on the connection thread. `false` means the caller is gone and
  /// the query must not run.
  pub fn begin(&self) -> bool {
    self.with_phase(|phase| match phase {
      Phase::Queued => {
        *phase = Phase::Running;
        true
      }
      _ => false,
    })
  }

  /// Called on the connection thread once the query's statements are done.
  /// Holding the lock here keeps an interrupt from landing on a later call.
  pub fn finish(&self) {
    self.with_phase(|phase| *phase = Phase::Finished);
  }

  fn abandon(&self) {
    self.with_phase(|phase| match *phase {
      Phase::Queued => {
        debug!("query abandoned before it started");
        *phase = Phase::Abandoned;
      }
      Phase::Running => {
        debug!("interrupting abandoned query");
        self.interrupt.interrupt();
        *phase = Phase::Abandoned;
      }
      Phase::Finished | Phase::Abandoned => {}
    });
  }
}

/// Held by the awaiting future; abandons the ticket when dropped.
pub struct CancelOnDrop(pub Arc<QueryTicket>);

impl Drop for CancelOnDrop {
  fn drop(&mut self) { self.0.abandon(); }
}
