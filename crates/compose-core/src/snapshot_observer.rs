//! Read-set tracking for code that has to re-run when the state it read changes.
//!
//! A [`SnapshotStateObserver`] runs a block while recording every
//! [`crate::MutableState`] read into a per-scope read set. Once started, any
//! later write to a recorded cell invokes the scope's change callback. The
//! callback runs synchronously inside the write; callers that need to defer
//! work do so from within the callback.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use crate::collections::map::{HashMap, HashSet};
use crate::state::StateId;

thread_local! {
    // `None` entries mark untracked regions.
    static READ_RECORDERS: RefCell<Vec<Option<Rc<ReadRecorder>>>> = RefCell::new(Vec::new());
    static WRITE_OBSERVERS: RefCell<Vec<Weak<dyn WriteObserver>>> = RefCell::new(Vec::new());
}

#[derive(Default)]
struct ReadRecorder {
    reads: RefCell<HashSet<StateId>>,
}

trait WriteObserver {
    fn on_state_written(&self, id: StateId);
}

pub(crate) fn record_read(id: StateId) {
    READ_RECORDERS.with(|stack| {
        if let Some(Some(recorder)) = stack.borrow().last() {
            recorder.reads.borrow_mut().insert(id);
        }
    });
}

pub(crate) fn notify_write(id: StateId) {
    let observers: Vec<Rc<dyn WriteObserver>> = WRITE_OBSERVERS.with(|observers| {
        let mut observers = observers.borrow_mut();
        observers.retain(|observer| observer.strong_count() > 0);
        observers.iter().filter_map(Weak::upgrade).collect()
    });
    for observer in observers {
        observer.on_state_written(id);
    }
}

struct RecorderGuard;

impl RecorderGuard {
    fn push(recorder: Option<Rc<ReadRecorder>>) -> Self {
        READ_RECORDERS.with(|stack| stack.borrow_mut().push(recorder));
        RecorderGuard
    }
}

impl Drop for RecorderGuard {
    fn drop(&mut self) {
        READ_RECORDERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs `block` without recording any state reads.
pub fn untracked<R>(block: impl FnOnce() -> R) -> R {
    let _guard = RecorderGuard::push(None);
    block()
}

type ChangeCallback<K> = Rc<dyn Fn(&K)>;

struct ScopeRecord<K> {
    reads: HashSet<StateId>,
    on_changed: ChangeCallback<K>,
}

struct ObserverInner<K> {
    scopes: RefCell<HashMap<K, ScopeRecord<K>>>,
    started: Cell<bool>,
}

impl<K: Eq + Hash + Clone + 'static> WriteObserver for ObserverInner<K> {
    fn on_state_written(&self, id: StateId) {
        if !self.started.get() {
            return;
        }
        let affected: Vec<(K, ChangeCallback<K>)> = self
            .scopes
            .borrow()
            .iter()
            .filter(|(_, record)| record.reads.contains(&id))
            .map(|(key, record)| (key.clone(), Rc::clone(&record.on_changed)))
            .collect();
        for (key, on_changed) in affected {
            on_changed(&key);
        }
    }
}

/// Tracks which state each scope read and reports writes to it.
pub struct SnapshotStateObserver<K: Eq + Hash + Clone + 'static> {
    inner: Rc<ObserverInner<K>>,
}

impl<K: Eq + Hash + Clone + 'static> SnapshotStateObserver<K> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                scopes: RefCell::new(HashMap::new()),
                started: Cell::new(false),
            }),
        }
    }

    /// Starts delivering write notifications. Calling it twice is harmless.
    pub fn start(&self) {
        if self.inner.started.replace(true) {
            return;
        }
        let weak: Weak<dyn WriteObserver> = {
            let strong: Rc<dyn WriteObserver> = self.inner.clone();
            Rc::downgrade(&strong)
        };
        WRITE_OBSERVERS.with(|observers| observers.borrow_mut().push(weak));
    }

    /// Stops delivering write notifications. Recorded reads are kept until
    /// [`clear`](Self::clear).
    pub fn stop(&self) {
        if !self.inner.started.replace(false) {
            return;
        }
        let target = Rc::as_ptr(&self.inner) as *const ();
        WRITE_OBSERVERS.with(|observers| {
            observers.borrow_mut().retain(|observer| {
                observer.strong_count() > 0 && observer.as_ptr() as *const () != target
            });
        });
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Runs `block`, replacing the read set recorded for `scope` with the
    /// state read during this run.
    pub fn observe_reads<R>(
        &self,
        scope: K,
        on_changed: impl Fn(&K) + 'static,
        block: impl FnOnce() -> R,
    ) -> R {
        let recorder = Rc::new(ReadRecorder::default());
        let result = {
            let _guard = RecorderGuard::push(Some(Rc::clone(&recorder)));
            block()
        };
        let reads = recorder.reads.take();
        self.inner.scopes.borrow_mut().insert(
            scope,
            ScopeRecord {
                reads,
                on_changed: Rc::new(on_changed),
            },
        );
        result
    }

    /// Number of state cells recorded for `scope`.
    pub fn observed_count(&self, scope: &K) -> usize {
        self.inner
            .scopes
            .borrow()
            .get(scope)
            .map(|record| record.reads.len())
            .unwrap_or(0)
    }

    pub fn clear_scope(&self, scope: &K) {
        self.inner.scopes.borrow_mut().remove(scope);
    }

    pub fn clear(&self) {
        self.inner.scopes.borrow_mut().clear();
    }
}

impl<K: Eq + Hash + Clone + 'static> Default for SnapshotStateObserver<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone + 'static> Drop for SnapshotStateObserver<K> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<K: Eq + Hash + Clone + 'static> fmt::Debug for SnapshotStateObserver<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStateObserver")
            .field("started", &self.inner.started.get())
            .field("scopes", &self.inner.scopes.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/observer_tests.rs"]
mod tests;
