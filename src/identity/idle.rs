use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::info;

/// Forces a sign-out after a configurable idle period.
///
/// One background task owns one deferred action scheduled for
/// "last activity + timeout"; every [`touch`](Self::touch) reschedules it by
/// publishing a fresh activity instant. There is at most one pending timer
/// at any moment by construction, no matter how fast activity arrives.
///
/// The monitor is a scoped resource: [`shutdown`](Self::shutdown) (or drop)
/// cancels the pending action and detaches the activity channel. It is not
/// tied to any UI lifecycle.
pub struct InactivityMonitor {
    activity: watch::Sender<Instant>,
    task: Option<JoinHandle<()>>,
}

impl InactivityMonitor {
    /// Spawn the monitor with the idle `timeout` and the action to run when
    /// it elapses. The action runs at most once; after it fires the monitor
    /// is spent.
    pub fn spawn<F, Fut>(timeout: Duration, on_idle: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = watch::channel(Instant::now());
        let mut on_idle = Some(on_idle);
        let task = tokio::spawn(async move {
            loop {
                let deadline = *rx.borrow_and_update() + timeout;
                tokio::select! {
                    _ = time::sleep_until(deadline) => {
                        info!(idle_ms = timeout.as_millis() as u64, "idle timeout reached, forcing sign-out");
                        if let Some(action) = on_idle.take() {
                            action().await;
                        }
                        return;
                    }
                    changed = rx.changed() => {
                        // Sender gone means the monitor was shut down.
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        });
        Self { activity: tx, task: Some(task) }
    }

    /// Record user activity: cancels the pending sign-out and schedules a
    /// new one at "now + timeout".
    pub fn touch(&self) {
        let _ = self.activity.send(Instant::now());
    }

    /// Release the monitor: cancel the pending action and detach.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        self.release();
    }
}
