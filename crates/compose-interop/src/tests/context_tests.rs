use super::*;
use compose_core::{Runtime, RuntimeScheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingScheduler {
    frames: AtomicUsize,
}

impl RuntimeScheduler for CountingScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

fn context() -> (InteropContext, Runtime, Arc<CountingScheduler>) {
    let scheduler = Arc::new(CountingScheduler::default());
    let runtime = Runtime::new(scheduler.clone());
    (InteropContext::new(runtime.handle()), runtime, scheduler)
}

fn logging(
    log: &Rc<RefCell<Vec<&'static str>>>,
    entry: &'static str,
) -> impl FnOnce() -> Result<(), InteropError> {
    let log = Rc::clone(log);
    move || {
        log.borrow_mut().push(entry);
        Ok(())
    }
}

#[test]
fn flush_runs_actions_in_submission_order() {
    let (context, _runtime, scheduler) = context();
    let log = Rc::new(RefCell::new(Vec::new()));

    context.defer_hierarchy_change(HierarchyChange::ViewAdded, logging(&log, "added"));
    context.defer_action(logging(&log, "frame"));
    context.defer_action(logging(&log, "resize"));

    assert_eq!(context.pending_count(), 3);
    assert_eq!(scheduler.frames.load(Ordering::SeqCst), 3);
    assert!(log.borrow().is_empty(), "nothing runs before the flush");

    let transaction = context.flush().expect("flush");
    assert_eq!(*log.borrow(), vec!["added", "frame", "resize"]);
    assert_eq!(transaction.actions_run, 3);
    assert_eq!(transaction.views_added, 1);
    assert_eq!(transaction.state, InteropState::Began);
    assert!(!context.has_pending());
}

#[test]
fn actions_deferred_during_flush_wait_for_next_flush() {
    let (context, _runtime, _scheduler) = context();
    let log = Rc::new(RefCell::new(Vec::new()));
    {
        let nested = context.clone();
        let log = Rc::clone(&log);
        context.defer_action(move || {
            log.borrow_mut().push("outer");
            nested.defer_action(logging(&log, "inner"));
            Ok(())
        });
    }

    assert_eq!(context.flush().expect("first").actions_run, 1);
    assert_eq!(*log.borrow(), vec!["outer"]);
    assert_eq!(context.flush().expect("second").actions_run, 1);
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn failing_action_keeps_rest_of_batch_queued() {
    let (context, _runtime, _scheduler) = context();
    let log = Rc::new(RefCell::new(Vec::new()));
    let missing = crate::ViewId(9);

    context.defer_action(logging(&log, "first"));
    context.defer_action(move || Err(InteropError::MissingView { id: missing }));
    context.defer_action(logging(&log, "third"));

    assert_eq!(
        context.flush(),
        Err(InteropError::MissingView { id: missing })
    );
    assert_eq!(*log.borrow(), vec!["first"]);
    assert_eq!(context.pending_count(), 1);

    let transaction = context.flush().expect("retry");
    assert_eq!(transaction.actions_run, 1);
    assert_eq!(*log.borrow(), vec!["first", "third"]);
}

#[test]
fn interop_state_tracks_first_and_last_view() {
    let (context, _runtime, _scheduler) = context();
    let ok = || -> Result<(), InteropError> { Ok(()) };

    context.defer_hierarchy_change(HierarchyChange::ViewAdded, ok);
    context.defer_hierarchy_change(HierarchyChange::ViewAdded, ok);
    assert_eq!(context.flush().expect("add").state, InteropState::Began);
    assert_eq!(context.active_view_count(), 2);

    context.defer_hierarchy_change(HierarchyChange::ViewRemoved, ok);
    assert_eq!(context.flush().expect("remove one").state, InteropState::Unchanged);

    context.defer_hierarchy_change(HierarchyChange::ViewRemoved, ok);
    let transaction = context.flush().expect("remove last");
    assert_eq!(transaction.state, InteropState::Ended);
    assert!(transaction.has_hierarchy_changes());
    assert!(context.flush().expect("idle").is_empty());
}

#[test]
fn failed_removal_still_ends_interop() {
    let (context, _runtime, _scheduler) = context();
    let missing = crate::ViewId(7);

    context.defer_hierarchy_change(HierarchyChange::ViewAdded, || Ok(()));
    assert_eq!(context.flush().expect("add").state, InteropState::Began);

    context.defer_hierarchy_change(HierarchyChange::ViewRemoved, move || {
        Err(InteropError::MissingView { id: missing })
    });
    assert_eq!(
        context.flush(),
        Err(InteropError::MissingView { id: missing })
    );
    assert_eq!(context.active_view_count(), 0);

    let transaction = context.flush().expect("next frame");
    assert!(transaction.is_empty());
    assert_eq!(transaction.state, InteropState::Ended);
    assert_eq!(
        context.flush().expect("idle").state,
        InteropState::Unchanged
    );
}

#[test]
fn deferrer_routes_into_queue() {
    let (context, _runtime, _scheduler) = context();
    let hits = Rc::new(Cell::new(0));
    let defer = context.deferrer();
    let counter = Rc::clone(&hits);
    defer(Box::new(move || counter.set(counter.get() + 1)));

    assert_eq!(hits.get(), 0);
    context.flush().expect("flush");
    assert_eq!(hits.get(), 1);
}

#[test]
#[should_panic(expected = "from inside a deferred action")]
fn reentrant_flush_panics() {
    let (context, _runtime, _scheduler) = context();
    let nested = context.clone();
    context.defer_action(move || nested.flush().map(|_| ()));
    let _ = context.flush();
}

#[test]
#[should_panic(expected = "must run on the UI thread")]
fn flush_off_ui_thread_panics() {
    let other = std::thread::spawn(|| std::thread::current().id())
        .join()
        .expect("thread id");
    let runtime = Runtime::with_ui_thread(Arc::new(CountingScheduler::default()), other);
    let context = InteropContext::new(runtime.handle());
    let _ = context.flush();
}
