//! Deferred native mutations.
//!
//! Composition and layout never touch native views directly. They queue
//! closures on the [`InteropContext`]; the frame driver flushes the queue on
//! the UI thread after layout and before presenting, so every native
//! mutation of a frame runs in submission order at one point.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use compose_core::RuntimeHandle;

use crate::error::InteropError;

/// Tag for structural deferred actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HierarchyChange {
    ViewAdded,
    ViewRemoved,
}

/// Queued native mutation.
pub type DeferredAction = Box<dyn FnOnce() -> Result<(), InteropError> + 'static>;

/// Scheduling function handed to code that must not know about the context.
pub type DeferFn = Rc<dyn Fn(Box<dyn FnOnce() + 'static>)>;

struct PendingAction {
    change: Option<HierarchyChange>,
    action: DeferredAction,
}

/// Whether embedded views appeared or disappeared during a flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteropState {
    /// The first embedded view was added.
    Began,
    Unchanged,
    /// The last embedded view was removed.
    Ended,
}

/// Summary of one flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteropTransaction {
    pub actions_run: usize,
    pub views_added: usize,
    pub views_removed: usize,
    pub state: InteropState,
}

impl InteropTransaction {
    pub fn is_empty(&self) -> bool {
        self.actions_run == 0
    }

    pub fn has_hierarchy_changes(&self) -> bool {
        self.views_added > 0 || self.views_removed > 0
    }
}

struct ContextInner {
    runtime: RuntimeHandle,
    queue: RefCell<VecDeque<PendingAction>>,
    active_views: Cell<usize>,
    /// Active views as of the last transaction handed to the caller.
    reported_views: Cell<usize>,
    flushing: Cell<bool>,
}

struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// FIFO of native mutations, drained once per frame on the UI thread.
#[derive(Clone)]
pub struct InteropContext {
    inner: Rc<ContextInner>,
}

impl InteropContext {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                runtime,
                queue: RefCell::new(VecDeque::new()),
                active_views: Cell::new(0),
                reported_views: Cell::new(0),
                flushing: Cell::new(false),
            }),
        }
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.inner.runtime
    }

    /// Queues a cosmetic mutation (frame, background, callbacks).
    pub fn defer_action(&self, action: impl FnOnce() -> Result<(), InteropError> + 'static) {
        self.push(None, Box::new(action));
    }

    /// Queues a structural mutation.
    pub fn defer_hierarchy_change(
        &self,
        change: HierarchyChange,
        action: impl FnOnce() -> Result<(), InteropError> + 'static,
    ) {
        self.push(Some(change), Box::new(action));
    }

    /// Adapts this context into a plain scheduling function.
    pub fn deferrer(&self) -> DeferFn {
        let context = self.clone();
        Rc::new(move |action: Box<dyn FnOnce()>| {
            context.defer_action(move || {
                action();
                Ok(())
            })
        })
    }

    fn push(&self, change: Option<HierarchyChange>, action: DeferredAction) {
        let pending = {
            let mut queue = self.inner.queue.borrow_mut();
            queue.push_back(PendingAction { change, action });
            queue.len()
        };
        log::trace!("deferred interop action {change:?}, {pending} pending");
        self.inner.runtime.schedule();
    }

    pub fn pending_count(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Embedded views currently added through this context.
    pub fn active_view_count(&self) -> usize {
        self.inner.active_views.get()
    }

    /// Runs every action queued before this call, in submission order.
    ///
    /// Actions queued while flushing wait for the next flush. The first
    /// failing action stops the flush; it is consumed, the rest of the batch
    /// stays at the head of the queue. Panics from actions unwind to the
    /// caller with the same effect.
    ///
    /// A failed removal still counts as removed. The transaction state
    /// compares against the last successful flush, so an `Ended` hidden by a
    /// failed flush is reported by the next one.
    ///
    /// # Panics
    ///
    /// When called off the UI thread or from inside a running flush.
    pub fn flush(&self) -> Result<InteropTransaction, InteropError> {
        self.inner.runtime.assert_ui_thread();
        assert!(
            !self.inner.flushing.replace(true),
            "InteropContext::flush called from inside a deferred action"
        );
        let _guard = FlushGuard(&self.inner.flushing);

        let batch = self.inner.queue.borrow().len();
        let mut transaction = InteropTransaction {
            actions_run: 0,
            views_added: 0,
            views_removed: 0,
            state: InteropState::Unchanged,
        };

        for _ in 0..batch {
            let Some(pending) = self.inner.queue.borrow_mut().pop_front() else {
                break;
            };
            transaction.actions_run += 1;
            let result = (pending.action)();
            match (pending.change, &result) {
                (Some(HierarchyChange::ViewAdded), Ok(())) => {
                    transaction.views_added += 1;
                    self.inner.active_views.set(self.inner.active_views.get() + 1);
                }
                (Some(HierarchyChange::ViewRemoved), _) => {
                    transaction.views_removed += 1;
                    self.inner
                        .active_views
                        .set(self.inner.active_views.get().saturating_sub(1));
                }
                _ => {}
            }
            if let Err(err) = result {
                log::warn!(
                    "interop flush aborted after {} of {batch} actions: {err}",
                    transaction.actions_run
                );
                return Err(err);
            }
        }

        let views_before = self.inner.reported_views.replace(self.inner.active_views.get());
        let views_after = self.inner.active_views.get();
        transaction.state = match (views_before, views_after) {
            (0, after) if after > 0 => InteropState::Began,
            (before, 0) if before > 0 => InteropState::Ended,
            _ => InteropState::Unchanged,
        };
        if transaction.actions_run > 0 || transaction.state != InteropState::Unchanged {
            log::debug!(
                "flushed {} interop actions (+{} -{} views, {:?})",
                transaction.actions_run,
                transaction.views_added,
                transaction.views_removed,
                transaction.state
            );
        }
        Ok(transaction)
    }
}

impl fmt::Debug for InteropContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropContext")
            .field("pending", &self.pending_count())
            .field("active_views", &self.active_view_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
