//! Cooperative cancellation for long planning calls.

use mowplan_core::{PlanningError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared stop flag with an optional deadline.
///
/// Clones share the flag, so a control loop can keep one clone and cancel
/// a plan running on another thread. Generators poll [`check`](Self::check)
/// inside their loops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some((Instant::now() + timeout, timeout)),
        }
    }

    /// A token sharing this token's flag that also expires `timeout` from
    /// now
    pub fn with_deadline(&self, timeout: Duration) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some((Instant::now() + timeout, timeout)),
        }
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|(deadline, _)| Instant::now() >= deadline)
    }

    /// `Err(Cancelled)` or `Err(TimedOut)` once the plan should stop
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PlanningError::Cancelled.into());
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(PlanningError::TimedOut {
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }
        }
        Ok(())
    }
}
