//! Route lifecycle effects.
//!
//! A route's mount hook runs when the route enters the active chain and
//! returns a [`MountGuard`]. The browser holds the guard while the route
//! stays active and drops it when the route leaves, which runs cleanups
//! and cancels any [`Deferred`] tasks the guard owns.

use crate::matcher::Params;
use crate::navigator::Navigator;
use crate::route::RouteId;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use waypoint_location::Location;

/// What a mount hook sees.
pub struct MountContext<'a> {
    pub(crate) route_id: &'a RouteId,
    pub(crate) location: &'a Location,
    pub(crate) params: &'a Params,
    pub(crate) navigator: &'a Navigator,
}

impl<'a> MountContext<'a> {
    /// Id of the route being mounted.
    #[must_use]
    pub fn route_id(&self) -> &'a RouteId {
        self.route_id
    }

    /// Location that caused the mount.
    #[must_use]
    pub fn location(&self) -> &'a Location {
        self.location
    }

    /// Parameters bound up to the mounted route.
    #[must_use]
    pub fn params(&self) -> &'a Params {
        self.params
    }

    /// Handle for navigating later, e.g. from a deferred task.
    #[must_use]
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }
}

/// A one-shot task that runs after a delay unless dropped first.
///
/// Dropping a `Deferred` aborts its task if it has not finished.
pub struct Deferred {
    handle: Option<JoinHandle<()>>,
}

impl Deferred {
    /// Run `task` after `delay` on the current tokio runtime.
    ///
    /// Outside a runtime the task is discarded with a warning.
    #[must_use]
    pub fn after<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(runtime) => {
                let handle = runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    task.await;
                });
                debug!(delay_ms = delay.as_millis() as u64, "Deferred task scheduled");
                Self {
                    handle: Some(handle),
                }
            }
            Err(_) => {
                warn!("No async runtime; deferred task discarded");
                Self { handle: None }
            }
        }
    }

    /// Check if the task has run to completion (or was never scheduled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the task now.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
                debug!("Deferred task cancelled");
            }
        }
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        self.abort();
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Resources held while a route is mounted.
#[derive(Default)]
pub struct MountGuard {
    tasks: Vec<Deferred>,
    cleanups: Vec<Box<dyn FnOnce() + Send>>,
}

impl MountGuard {
    /// A guard holding nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a deferred task, cancelling it on unmount.
    #[must_use]
    pub fn with_task(mut self, task: Deferred) -> Self {
        self.tasks.push(task);
        self
    }

    /// Run a closure on unmount.
    #[must_use]
    pub fn on_unmount<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
        self
    }

    /// Number of tasks still pending.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }
}

impl From<Deferred> for MountGuard {
    fn from(task: Deferred) -> Self {
        Self::new().with_task(task)
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
    }
}

impl fmt::Debug for MountGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountGuard")
            .field("tasks", &self.tasks.len())
            .field("cleanups", &self.cleanups.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_deferred_runs_after_delay() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let task = Deferred::after(Duration::from_secs(3), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(!task.is_finished());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_deferred_cancels() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let guard = MountGuard::from(Deferred::after(Duration::from_secs(3), async move {
            flag.store(true, Ordering::SeqCst);
        }));
        assert_eq!(guard.pending_tasks(), 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(guard);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cleanup_runs_on_drop() {
        let cleaned = Arc::new(AtomicBool::new(false));
        let flag = cleaned.clone();
        let guard = MountGuard::new().on_unmount(move || flag.store(true, Ordering::SeqCst));
        assert!(!cleaned.load(Ordering::SeqCst));
        drop(guard);
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[test]
    fn test_deferred_without_runtime_is_inert() {
        let task = Deferred::after(Duration::from_millis(1), async {});
        assert!(task.is_finished());
        task.cancel();
    }
}
