use super::*;
use crate::memory_host::{HostOp, MemoryNativeHost};
use compose_core::{mutable_state_of, DefaultScheduler, Runtime};
use std::sync::Arc;

struct Fixture {
    runtime: Runtime,
    host: Rc<MemoryNativeHost>,
    interop_container: InteropContainer,
}

impl Fixture {
    fn new() -> Self {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let host = Rc::new(MemoryNativeHost::new());
        let root = host.create_view();
        let interop_container = InteropContainer::new(host.clone(), root, runtime.handle());
        Self {
            runtime,
            host,
            interop_container,
        }
    }

    fn embed<T: 'static, E: Embedding<T>>(
        &self,
        embedding: E,
        on_release: ReleaseFn<T>,
    ) -> EmbeddedInteropComponent<T, E> {
        EmbeddedInteropComponent::new(
            self.host.clone(),
            self.interop_container.clone(),
            embedding,
            on_release,
        )
    }

    fn immediate_defer(&self) -> DeferFn {
        Rc::new(|action: Box<dyn FnOnce()>| action())
    }
}

fn no_update<T>() -> UpdateFn<T> {
    Rc::new(|_: &T| {})
}

#[test]
fn view_add_attaches_then_registers() {
    let fixture = Fixture::new();
    let view = fixture.host.create_view();
    let embedded = fixture.embed::<ViewId, _>(ViewEmbedding, Box::new(|_: &ViewId| {}));
    let container = embedded.container();
    embedded.mount(view, no_update(), fixture.runtime.handle(), fixture.immediate_defer());
    fixture.host.clear_ops();

    embedded.add_to_hierarchy().expect("add");

    assert_eq!(
        fixture.host.ops(),
        vec![
            HostOp::AddSubview {
                parent: container,
                child: view
            },
            HostOp::AddSubview {
                parent: fixture.interop_container.container_view(),
                child: container
            },
        ]
    );
    assert!(fixture.interop_container.contains(container));
}

#[test]
fn release_runs_once_after_detach_and_disposal() {
    let fixture = Fixture::new();
    let view = fixture.host.create_view();
    let state = mutable_state_of(0);
    let update_runs = Rc::new(Cell::new(0));
    let releases = Rc::new(Cell::new(0));
    let pending = Rc::new(RefCell::new(Vec::<Box<dyn FnOnce()>>::new()));

    let on_release: ReleaseFn<ViewId> = {
        let host = fixture.host.clone();
        let interop_container = fixture.interop_container.clone();
        let releases = Rc::clone(&releases);
        Box::new(move |released: &ViewId| {
            assert_eq!(host.superview(*released), None, "detached before release");
            assert!(interop_container.is_empty(), "deregistered before release");
            releases.set(releases.get() + 1);
        })
    };
    let embedded = fixture.embed::<ViewId, _>(ViewEmbedding, on_release);
    let update: UpdateFn<ViewId> = {
        let state = state.clone();
        let update_runs = Rc::clone(&update_runs);
        Rc::new(move |_: &ViewId| {
            state.value();
            update_runs.set(update_runs.get() + 1);
        })
    };
    let defer: DeferFn = {
        let pending = Rc::clone(&pending);
        Rc::new(move |action: Box<dyn FnOnce()>| pending.borrow_mut().push(action))
    };
    embedded.mount(view, update, fixture.runtime.handle(), defer);
    embedded.add_to_hierarchy().expect("add");

    state.set(1);
    assert!(embedded.is_update_scheduled());
    embedded.remove_from_hierarchy().expect("remove");
    for action in pending.borrow_mut().drain(..) {
        action();
    }

    assert_eq!(releases.get(), 1);
    assert_eq!(update_runs.get(), 1, "queued update after disposal is dropped");
    assert!(embedded.is_released());
    assert!(embedded.component().is_none());

    embedded.remove_from_hierarchy().expect("second removal is a no-op");
    state.set(2);
    assert_eq!(releases.get(), 1);
}

#[test]
fn controller_brackets_structural_changes() {
    let fixture = Fixture::new();
    let root = fixture.host.create_controller();
    let controller = fixture.host.create_controller();
    let controller_view = fixture.host.controller_view(controller).expect("view");
    let embedded = fixture.embed::<ControllerId, _>(
        ControllerEmbedding::new(root),
        Box::new(|_: &ControllerId| {}),
    );
    let container = embedded.container();
    embedded.mount(
        controller,
        no_update(),
        fixture.runtime.handle(),
        fixture.immediate_defer(),
    );
    fixture.host.clear_ops();

    embedded.add_to_hierarchy().expect("add");
    let added = fixture.host.take_ops();
    assert_eq!(
        added[..3],
        [
            HostOp::AddChildController {
                parent: root,
                child: controller
            },
            HostOp::AddSubview {
                parent: container,
                child: controller_view
            },
            HostOp::DidMoveToParent {
                child: controller,
                parent: Some(root)
            },
        ]
    );
    assert_eq!(fixture.host.parent_controller(controller), Some(root));

    embedded.remove_from_hierarchy().expect("remove");
    let removed = fixture.host.take_ops();
    assert_eq!(removed.last(), Some(&HostOp::DestroyContainer(container)));
    assert_eq!(
        removed[..3],
        [
            HostOp::WillMoveToParent {
                child: controller,
                parent: None
            },
            HostOp::RemoveFromSuperview(controller_view),
            HostOp::RemoveFromParentController(controller),
        ]
    );
    assert_eq!(fixture.host.parent_controller(controller), None);
}

#[test]
fn unspecified_background_reads_current_root_background() {
    let fixture = Fixture::new();
    let embedded = fixture.embed::<ViewId, _>(ViewEmbedding, Box::new(|_: &ViewId| {}));
    let root = fixture.interop_container.container_view();

    fixture
        .host
        .set_background_color(root, Color::RED)
        .expect("root red");
    embedded
        .set_background_color(Color::UNSPECIFIED)
        .expect("inherit");
    assert_eq!(
        fixture.host.background_color(embedded.container()),
        Ok(Color::RED)
    );

    fixture
        .host
        .set_background_color(root, Color::BLUE)
        .expect("root blue");
    embedded
        .set_background_color(Color::UNSPECIFIED)
        .expect("inherit again");
    assert_eq!(
        fixture.host.background_color(embedded.container()),
        Ok(Color::BLUE)
    );

    embedded.set_background_color(Color::GREEN).expect("explicit");
    assert_eq!(
        fixture.host.background_color(embedded.container()),
        Ok(Color::GREEN)
    );
}

#[test]
fn default_resize_sets_component_frame() {
    let fixture = Fixture::new();
    let view = fixture.host.create_view();
    let embedded = fixture.embed::<ViewId, _>(ViewEmbedding, Box::new(|_: &ViewId| {}));
    let bounds = Rect::new(0.0, 0.0, 40.0, 30.0);

    embedded.resize(None, bounds).expect("before mount is a no-op");
    assert_eq!(fixture.host.frame(view), Ok(Rect::ZERO));

    embedded.mount(view, no_update(), fixture.runtime.handle(), fixture.immediate_defer());
    embedded.resize(None, bounds).expect("resize");
    assert_eq!(fixture.host.frame(view), Ok(bounds));

    let seen = Rc::new(Cell::new(None));
    let custom: ResizeFn<ViewId> = {
        let seen = Rc::clone(&seen);
        Rc::new(move |_: &ViewId, rect: Rect| seen.set(Some(rect)))
    };
    embedded
        .resize(Some(&custom), Rect::new(0.0, 0.0, 1.0, 1.0))
        .expect("custom");
    assert_eq!(seen.get(), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(fixture.host.frame(view), Ok(bounds));
}

#[test]
fn failed_detach_still_releases() {
    let fixture = Fixture::new();
    let root = fixture.host.create_controller();
    let viewless = fixture.host.create_viewless_controller();
    let releases = Rc::new(Cell::new(0));
    let on_release: ReleaseFn<ControllerId> = {
        let releases = Rc::clone(&releases);
        Box::new(move |_: &ControllerId| releases.set(releases.get() + 1))
    };
    let embedded = fixture.embed(ControllerEmbedding::new(root), on_release);
    embedded.mount(
        viewless,
        no_update(),
        fixture.runtime.handle(),
        fixture.immediate_defer(),
    );

    assert_eq!(
        embedded.add_to_hierarchy(),
        Err(InteropError::ControllerHasNoView { id: viewless })
    );
    assert_eq!(fixture.host.parent_controller(viewless), Some(root));
    assert_eq!(
        embedded.remove_from_hierarchy(),
        Err(InteropError::ControllerHasNoView { id: viewless })
    );
    assert_eq!(releases.get(), 1);
    assert_eq!(fixture.host.parent_controller(viewless), None);
    assert!(fixture.host.child_controllers(root).is_empty());
    assert!(!fixture.host.contains_view(embedded.container()));
}

#[test]
#[should_panic(expected = "mounted twice")]
fn mounting_twice_panics() {
    let fixture = Fixture::new();
    let embedded = fixture.embed::<ViewId, _>(ViewEmbedding, Box::new(|_: &ViewId| {}));
    let first = fixture.host.create_view();
    let second = fixture.host.create_view();
    embedded.mount(first, no_update(), fixture.runtime.handle(), fixture.immediate_defer());
    embedded.mount(second, no_update(), fixture.runtime.handle(), fixture.immediate_defer());
}
