use super::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancel signal threaded through [`super::WriteOptions`],
/// standing in for the `context.Context` cancellation spec.md section 5
/// requires every operation taking a context to observe "at entry and
/// between independent sub-operations (before `Start`, between each
/// attribute, before `SetData`, before `End`)".
///
/// Cloning shares the same underlying flag, so a caller can hold one clone
/// and call [`CancellationToken::cancel`] from another thread (or from a
/// writer's own callback, as in seed scenario S5) while [`super::drive`]
/// holds the other and checks it between steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh token, not yet cancelled.
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns [`Error::Cancelled`] if cancellation has been requested.
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
