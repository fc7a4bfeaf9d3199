//! Delayed tasks bound to the lifetime of a view
//!
//! A [`ViewScope`] owns the tasks scheduled for one rendered view. Each task
//! sleeps for its delay and then runs, unless the scope is cancelled or
//! dropped first. Tasks report nothing back to whoever scheduled them.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cancellation signal handed to scheduled tasks
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the owning scope is cancelled or dropped
    pub async fn cancelled(&mut self) {
        // An error means the scope is gone, which counts as cancellation
        let _ = self.0.wait_for(|cancelled| *cancelled).await;
    }
}

/// Owner of the delayed tasks for one view
#[derive(Debug)]
pub struct ViewScope {
    cancel: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ViewScope {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            cancel,
            tasks: Vec::new(),
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken(self.cancel.subscribe())
    }

    /// Run `task` after `delay` unless the scope is cancelled first
    pub fn schedule<F, Fut>(&mut self, name: &'static str, delay: Duration, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut token = self.token();
        tracing::debug!("Scheduling {} in {:?}", name, delay);

        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    tracing::debug!("Running {}", name);
                    task().await;
                }
                _ = token.cancelled() => {
                    tracing::debug!("Cancelled {} before it ran", name);
                }
            }
        }));
    }

    /// Cancel every task that has not started yet
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Wait until every scheduled task has run or been cancelled
    pub async fn settle(mut self) {
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                tracing::error!("Scheduled task failed: {}", e);
            }
        }
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn test_tasks_run_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scope = ViewScope::new();
        scope.schedule("first", Duration::from_millis(5), counter_task(&counter));
        scope.schedule("second", Duration::from_millis(10), counter_task(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        scope.settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scope = ViewScope::new();
        scope.schedule("late", Duration::from_secs(60), counter_task(&counter));
        let token = scope.token();
        assert!(!token.is_cancelled());

        scope.cancel();
        assert!(token.is_cancelled());
        scope.settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scope = ViewScope::new();
        scope.schedule("late", Duration::from_millis(20), counter_task(&counter));
        let mut token = scope.token();
        drop(scope);

        token.cancelled().await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
