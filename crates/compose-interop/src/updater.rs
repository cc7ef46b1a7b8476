use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use compose_core::{RuntimeHandle, SnapshotStateObserver};

use crate::context::DeferFn;

/// User callback applying composition state to a native object.
pub type UpdateFn<T> = Rc<dyn Fn(&T)>;

struct UpdaterInner<T: 'static> {
    component: Weak<T>,
    update: RefCell<UpdateFn<T>>,
    defer: DeferFn,
    runtime: RuntimeHandle,
    observer: SnapshotStateObserver<()>,
    is_update_scheduled: Cell<bool>,
    is_disposed: Cell<bool>,
}

impl<T: 'static> UpdaterInner<T> {
    fn perform_update(this: &Rc<Self>) {
        this.runtime.assert_ui_thread();
        if this.is_disposed.get() {
            return;
        }
        let Some(component) = this.component.upgrade() else {
            return;
        };
        let update = Rc::clone(&this.update.borrow());
        let weak = Rc::downgrade(this);
        this.observer.observe_reads(
            (),
            move |_| Self::schedule_update(&weak),
            || update(&*component),
        );
    }

    fn schedule_update(weak: &Weak<Self>) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        if this.is_disposed.get() || this.is_update_scheduled.replace(true) {
            return;
        }
        let weak = weak.clone();
        (this.defer)(Box::new(move || {
            if let Some(this) = weak.upgrade() {
                this.is_update_scheduled.set(false);
                Self::perform_update(&this);
            }
        }));
    }
}

/// Re-runs an update callback whenever state it read changes.
///
/// The first run happens in [`Updater::new`]. Later runs triggered by state
/// writes are coalesced into a single deferred run per flush; replacing the
/// callback re-runs it immediately.
pub struct Updater<T: 'static> {
    inner: Rc<UpdaterInner<T>>,
}

impl<T: 'static> Updater<T> {
    /// Starts observing and runs `update` once against `component`.
    ///
    /// The updater only borrows the component: once the last strong
    /// reference is dropped, updates stop.
    pub fn new(
        component: &Rc<T>,
        update: UpdateFn<T>,
        runtime: RuntimeHandle,
        defer: DeferFn,
    ) -> Self {
        let inner = Rc::new(UpdaterInner {
            component: Rc::downgrade(component),
            update: RefCell::new(update),
            defer,
            runtime,
            observer: SnapshotStateObserver::new(),
            is_update_scheduled: Cell::new(false),
            is_disposed: Cell::new(false),
        });
        inner.observer.start();
        UpdaterInner::perform_update(&inner);
        Self { inner }
    }

    pub fn update(&self) -> UpdateFn<T> {
        Rc::clone(&self.inner.update.borrow())
    }

    /// Replaces the callback. A different callback runs immediately; the
    /// same callback (by identity) does nothing.
    pub fn set_update(&self, update: UpdateFn<T>) {
        if Rc::ptr_eq(&self.inner.update.borrow(), &update) {
            return;
        }
        *self.inner.update.borrow_mut() = update;
        UpdaterInner::perform_update(&self.inner);
    }

    pub fn is_update_scheduled(&self) -> bool {
        self.inner.is_update_scheduled.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed.get()
    }

    /// Stops observing. Pending deferred runs become no-ops.
    pub fn dispose(&self) {
        self.inner.observer.stop();
        self.inner.observer.clear();
        self.inner.is_disposed.set(true);
    }
}

impl<T: 'static> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("is_update_scheduled", &self.is_update_scheduled())
            .field("is_disposed", &self.is_disposed())
            .field("observer", &self.inner.observer)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/updater_tests.rs"]
mod tests;
