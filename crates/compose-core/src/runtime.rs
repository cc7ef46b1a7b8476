use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::platform::RuntimeScheduler;

type Task = Box<dyn FnOnce() + 'static>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    pending_tasks: RefCell<VecDeque<Task>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            pending_tasks: RefCell::new(VecDeque::new()),
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn enqueue_task(&self, task: Task) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn drain_tasks(&self) -> usize {
        // Tasks spawned while draining wait for the next drain.
        let tasks: Vec<Task> = self.pending_tasks.borrow_mut().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    fn has_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty()
    }
}

/// Owner of the per-UI-thread runtime state.
///
/// The runtime is bound to the thread that drives frames. Anything that
/// touches native views checks against that thread through
/// [`RuntimeHandle::assert_ui_thread`].
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
    ui_thread: ThreadId,
}

impl Runtime {
    /// Creates a runtime bound to the calling thread.
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self::with_ui_thread(scheduler, thread::current().id())
    }

    /// Creates a runtime whose UI thread is `ui_thread`.
    pub fn with_ui_thread(scheduler: Arc<dyn RuntimeScheduler>, ui_thread: ThreadId) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
            ui_thread,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
            ui_thread: self.ui_thread,
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }

    pub fn ui_thread(&self) -> ThreadId {
        self.ui_thread
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("ui_thread", &self.ui_thread)
            .field("needs_frame", &self.inner.needs_frame.get())
            .field("pending_tasks", &self.inner.pending_tasks.borrow().len())
            .finish()
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Weak handle to a [`Runtime`].
///
/// Every operation is a no-op once the runtime is gone, except the UI thread
/// checks which keep working from the thread id captured at creation.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
    ui_thread: ThreadId,
}

impl RuntimeHandle {
    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    pub fn spawn_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_task(task);
        } else {
            task();
        }
    }

    /// Runs every queued task and returns how many ran.
    pub fn drain_tasks(&self) -> usize {
        self.inner
            .upgrade()
            .map(|inner| inner.drain_tasks())
            .unwrap_or(0)
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn set_needs_frame(&self, value: bool) {
        if let Some(inner) = self.inner.upgrade() {
            inner.needs_frame.set(value);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }

    /// Panics unless called on the runtime's UI thread.
    ///
    /// Native views are only ever mutated from the UI thread; reaching this
    /// from anywhere else means a caller bypassed the deferred queue.
    #[track_caller]
    pub fn assert_ui_thread(&self) {
        let current = thread::current();
        assert!(
            current.id() == self.ui_thread,
            "native interop work must run on the UI thread {:?}, but ran on {:?} ({})",
            self.ui_thread,
            current.id(),
            current.name().unwrap_or("<unnamed>")
        );
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("ui_thread", &self.ui_thread)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler {
    frames: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl TestScheduler {
    pub fn frame_requests(&self) -> usize {
        self.frames.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.frames
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
