//! Per-user registry of running batch tasks.
//!
//! At most one live task per user. Registration is a single check-and-set on
//! the user's map entry, so two concurrent launches for the same user can
//! never both succeed.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::types::{MessageRef, UserId};

/// Cancellable, observable handle to one batch execution.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: Uuid,
    cancel: CancellationToken,
    finished: Arc<AtomicBool>,
    status: MessageRef,
}

impl TaskHandle {
    /// New handle bound to the status message the batch will keep updating.
    pub fn new(status: MessageRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            finished: Arc::new(AtomicBool::new(false)),
            status,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> MessageRef {
        self.status
    }

    /// Token the worker watches at every suspension point.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Map from user to the single in-flight batch of that user.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<UserId, TaskHandle>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` unless `user` already has a live task.
    ///
    /// A finished handle that was never cleaned up counts as stale and is replaced.
    pub fn try_register(&self, user: UserId, handle: TaskHandle) -> bool {
        match self.tasks.entry(user) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_finished() {
                    return false;
                }
                log::warn!(
                    "Replacing stale finished task {} for user {}",
                    occupied.get().id(),
                    user
                );
                occupied.insert(handle);
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(handle);
                true
            }
        }
    }

    pub fn get(&self, user: UserId) -> Option<TaskHandle> {
        self.tasks.get(&user).map(|entry| entry.value().clone())
    }

    /// True while `user` has a live task.
    pub fn is_busy(&self, user: UserId) -> bool {
        self.tasks.get(&user).is_some_and(|entry| !entry.is_finished())
    }

    /// Removes whatever is registered for `user`. Idempotent.
    pub fn unregister(&self, user: UserId) {
        self.tasks.remove(&user);
    }

    /// Removes the entry for `user` only if it still belongs to task `id`.
    pub fn unregister_task(&self, user: UserId, id: Uuid) -> bool {
        self.tasks.remove_if(&user, |_, handle| handle.id() == id).is_some()
    }

    /// Signals cancellation to the live task of `user`.
    ///
    /// Returns false when there is nothing to cancel. The entry stays in place;
    /// the worker removes it during its own cleanup.
    pub fn cancel(&self, user: UserId) -> bool {
        match self.tasks.get(&user) {
            Some(entry) if !entry.is_finished() => {
                entry.cancel();
                log::info!("Cancellation requested for task {} of user {}", entry.id(), user);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Scoped registration of one task.
///
/// Dropping the guard marks the task finished and removes its registry entry,
/// which also covers the worker future being dropped or panicking.
#[derive(Debug)]
pub struct RegistrationGuard {
    registry: Arc<TaskRegistry>,
    user: UserId,
    handle: TaskHandle,
}

impl RegistrationGuard {
    pub fn new(registry: Arc<TaskRegistry>, user: UserId, handle: TaskHandle) -> Self {
        Self { registry, user, handle }
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Explicit end of the task; same effect as dropping the guard.
    pub fn release(self) {}
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.handle.mark_finished();
        if self.registry.unregister_task(self.user, self.handle.id()) {
            log::debug!("Task {} of user {} unregistered", self.handle.id(), self.user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(7);

    fn status() -> MessageRef {
        MessageRef::new(USER, 100)
    }

    #[test]
    fn test_second_registration_is_rejected() {
        let registry = TaskRegistry::new();
        let first = TaskHandle::new(status());
        let first_id = first.id();

        assert!(registry.try_register(USER, first));
        assert!(!registry.try_register(USER, TaskHandle::new(status())));
        assert_eq!(registry.get(USER).unwrap().id(), first_id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_users_are_independent() {
        let registry = TaskRegistry::new();
        assert!(registry.try_register(UserId(1), TaskHandle::new(status())));
        assert!(registry.try_register(UserId(2), TaskHandle::new(status())));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_unregister_register() {
        let registry = TaskRegistry::new();
        assert!(registry.try_register(USER, TaskHandle::new(status())));
        registry.unregister(USER);
        registry.unregister(USER);
        assert!(registry.is_empty());
        assert!(registry.try_register(USER, TaskHandle::new(status())));
    }

    #[test]
    fn test_cancel_without_task_is_noop() {
        let registry = TaskRegistry::new();
        assert!(!registry.cancel(USER));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_cancel_signals_but_keeps_entry() {
        let registry = TaskRegistry::new();
        let handle = TaskHandle::new(status());
        let token = handle.token();
        registry.try_register(USER, handle);

        assert!(registry.cancel(USER));
        assert!(token.is_cancelled());
        assert!(registry.get(USER).is_some());
    }

    #[test]
    fn test_guard_drop_unregisters_and_marks_finished() {
        let registry = Arc::new(TaskRegistry::new());
        let handle = TaskHandle::new(status());
        let observer = handle.clone();
        registry.try_register(USER, handle.clone());

        let guard = RegistrationGuard::new(Arc::clone(&registry), USER, handle);
        assert!(registry.is_busy(USER));
        guard.release();

        assert!(observer.is_finished());
        assert!(registry.get(USER).is_none());
        assert!(!registry.cancel(USER));
    }

    #[test]
    fn test_late_guard_does_not_evict_newer_task() {
        let registry = Arc::new(TaskRegistry::new());
        let old = TaskHandle::new(status());
        registry.try_register(USER, old.clone());
        old.mark_finished();

        let newer = TaskHandle::new(status());
        let newer_id = newer.id();
        assert!(registry.try_register(USER, newer));

        drop(RegistrationGuard::new(Arc::clone(&registry), USER, old));
        assert_eq!(registry.get(USER).unwrap().id(), newer_id);
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        let registry = Arc::new(TaskRegistry::new());
        let winners = std::thread::scope(|scope| {
            let joins: Vec<_> = (0..16)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || registry.try_register(USER, TaskHandle::new(status())))
                })
                .collect();
            joins
                .into_iter()
                .map(|join| join.join().unwrap())
                .filter(|won| *won)
                .count()
        });
        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }
}
