use futures::future::BoxFuture;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Handle to a task scheduled with [`Scheduler::schedule_after`].
#[derive(Debug)]
pub struct ScheduledHandle {
    abort: AbortHandle,
}

impl ScheduledHandle {
    pub fn new(abort: AbortHandle) -> Self {
        Self { abort }
    }

    /// Cancels the task whether it is still waiting or already running.
    pub fn cancel(self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

pub trait Scheduler: Send + Sync {
    fn schedule_after(&self, delay: Duration, task: BoxFuture<'static, ()>) -> ScheduledHandle;
}

/// Runs each scheduled task on the current tokio runtime after a sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: BoxFuture<'static, ()>) -> ScheduledHandle {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        ScheduledHandle::new(handle.abort_handle())
    }
}
