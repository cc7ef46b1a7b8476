use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::snapshot_observer;

static NEXT_STATE_ID: AtomicUsize = AtomicUsize::new(1);

/// Identity of an observable state cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    fn next() -> Self {
        StateId(NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct MutableStateInner<T> {
    id: StateId,
    value: RefCell<T>,
}

/// Observable value cell.
///
/// Reads made while a [`crate::SnapshotStateObserver`] is recording are added
/// to that recording's read set; writes notify every started observer that
/// recorded a read of this cell.
pub struct MutableState<T: 'static> {
    inner: Rc<MutableStateInner<T>>,
}

impl<T: 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Eq for MutableState<T> {}

impl<T: 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(MutableStateInner {
                id: StateId::next(),
                value: RefCell::new(value),
            }),
        }
    }

    pub fn id(&self) -> StateId {
        self.inner.id
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        snapshot_observer::record_read(self.inner.id);
        let value = self.inner.value.borrow();
        f(&value)
    }

    /// Mutates the value in place and always notifies observers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        snapshot_observer::notify_write(self.inner.id);
        result
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn value(&self) -> T {
        self.with(T::clone)
    }

    pub fn get(&self) -> T {
        self.value()
    }
}

impl<T: PartialEq + 'static> MutableState<T> {
    /// Stores `value`, notifying observers only when it differs from the
    /// current value.
    pub fn set(&self, value: T) {
        let changed = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            snapshot_observer::notify_write(self.inner.id);
        }
    }

    pub fn set_value(&self, value: T) {
        self.set(value);
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

pub fn mutable_state_of<T: 'static>(value: T) -> MutableState<T> {
    MutableState::new(value)
}
