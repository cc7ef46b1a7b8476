//! Ownership of one embedded native object.
//!
//! [`EmbeddedInteropComponent`] is the shared part: container view,
//! component, updater, background pass-through and the add/remove protocol.
//! What "attach" means for the wrapped object is delegated to an
//! [`Embedding`]: [`ViewEmbedding`] for plain views, [`ControllerEmbedding`]
//! for view controllers that join the host's controller containment tree.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use compose_core::RuntimeHandle;
use compose_ui_graphics::{Color, Rect};

use crate::container::InteropContainer;
use crate::context::DeferFn;
use crate::error::InteropError;
use crate::native::{AsNativeController, AsNativeView, ControllerId, NativeHost, ViewId};
use crate::updater::{UpdateFn, Updater};

/// Callback told about the component's new bounds after a size change.
pub type ResizeFn<T> = Rc<dyn Fn(&T, Rect)>;

/// Callback releasing user resources held by the component.
pub type ReleaseFn<T> = Box<dyn FnOnce(&T)>;

/// How a component of type `T` enters and leaves the native hierarchy.
pub trait Embedding<T>: 'static {
    /// Puts `component` inside `container`.
    fn attach(
        &self,
        host: &dyn NativeHost,
        container: ViewId,
        component: &T,
    ) -> Result<(), InteropError>;

    /// Takes `component` out of its container, undoing [`attach`](Self::attach).
    fn detach(&self, host: &dyn NativeHost, component: &T) -> Result<(), InteropError>;

    /// Resize used when the caller supplied no resize callback.
    fn resize_to_bounds(
        &self,
        host: &dyn NativeHost,
        component: &T,
        bounds: Rect,
    ) -> Result<(), InteropError>;
}

/// Embeds a plain native view.
#[derive(Clone, Copy, Debug, Default)]
pub struct ViewEmbedding;

impl<T: AsNativeView> Embedding<T> for ViewEmbedding {
    fn attach(
        &self,
        host: &dyn NativeHost,
        container: ViewId,
        component: &T,
    ) -> Result<(), InteropError> {
        host.add_subview(container, component.native_view())
    }

    fn detach(&self, host: &dyn NativeHost, component: &T) -> Result<(), InteropError> {
        host.remove_from_superview(component.native_view())
    }

    fn resize_to_bounds(
        &self,
        host: &dyn NativeHost,
        component: &T,
        bounds: Rect,
    ) -> Result<(), InteropError> {
        host.set_frame(component.native_view(), bounds)
    }
}

/// Embeds a view controller as a child of `root`.
///
/// Attaching brackets the view insertion between "add child" and "did
/// move"; detaching brackets the view removal between "will move (none)" and
/// "remove from parent", as controller containment requires.
#[derive(Clone, Copy, Debug)]
pub struct ControllerEmbedding {
    root: ControllerId,
}

impl ControllerEmbedding {
    pub fn new(root: ControllerId) -> Self {
        Self { root }
    }

    pub fn root(&self) -> ControllerId {
        self.root
    }
}

impl<T: AsNativeController> Embedding<T> for ControllerEmbedding {
    fn attach(
        &self,
        host: &dyn NativeHost,
        container: ViewId,
        component: &T,
    ) -> Result<(), InteropError> {
        let controller = component.native_controller();
        host.add_child_controller(self.root, controller)?;
        host.add_subview(container, host.controller_view(controller)?)?;
        host.did_move_to_parent(controller, Some(self.root))
    }

    /// Leaves the containment tree even when the view steps fail; the first
    /// error is returned afterwards.
    fn detach(&self, host: &dyn NativeHost, component: &T) -> Result<(), InteropError> {
        let controller = component.native_controller();
        let moved = host.will_move_to_parent(controller, None);
        let removed = host
            .controller_view(controller)
            .and_then(|view| host.remove_from_superview(view));
        let orphaned = host.remove_from_parent_controller(controller);
        moved.and(removed).and(orphaned)
    }

    fn resize_to_bounds(
        &self,
        host: &dyn NativeHost,
        component: &T,
        bounds: Rect,
    ) -> Result<(), InteropError> {
        host.set_frame(host.controller_view(component.native_controller())?, bounds)
    }
}

/// One embedded native object and the container view that hosts it.
///
/// The container exists from construction. The component and its updater
/// appear on [`mount`](Self::mount) and are dropped on
/// [`remove_from_hierarchy`](Self::remove_from_hierarchy), which also runs the
/// release callback. Every native-touching method is meant to be called from
/// a deferred action.
pub struct EmbeddedInteropComponent<T: 'static, E: Embedding<T>> {
    host: Rc<dyn NativeHost>,
    interop_container: InteropContainer,
    embedding: E,
    container: ViewId,
    component: RefCell<Option<Rc<T>>>,
    updater: RefCell<Option<Updater<T>>>,
    on_release: RefCell<Option<ReleaseFn<T>>>,
    released: Cell<bool>,
}

impl<T: 'static, E: Embedding<T>> EmbeddedInteropComponent<T, E> {
    pub fn new(
        host: Rc<dyn NativeHost>,
        interop_container: InteropContainer,
        embedding: E,
        on_release: ReleaseFn<T>,
    ) -> Self {
        let container = host.create_container();
        Self {
            host,
            interop_container,
            embedding,
            container,
            component: RefCell::new(None),
            updater: RefCell::new(None),
            on_release: RefCell::new(Some(on_release)),
            released: Cell::new(false),
        }
    }

    pub fn container(&self) -> ViewId {
        self.container
    }

    pub fn embedding(&self) -> &E {
        &self.embedding
    }

    pub fn component(&self) -> Option<Rc<T>> {
        self.component.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.component.borrow().is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// Installs the component and starts its updater, which runs `update`
    /// once right away.
    ///
    /// # Panics
    ///
    /// When the component was already mounted or released.
    pub fn mount(
        &self,
        component: T,
        update: UpdateFn<T>,
        runtime: RuntimeHandle,
        defer: DeferFn,
    ) {
        assert!(
            !self.is_mounted() && !self.released.get(),
            "embedded component in container {} mounted twice",
            self.container
        );
        let component = Rc::new(component);
        let updater = Updater::new(&component, update, runtime, defer);
        *self.component.borrow_mut() = Some(component);
        *self.updater.borrow_mut() = Some(updater);
    }

    pub fn set_update(&self, update: UpdateFn<T>) {
        if let Some(updater) = self.updater.borrow().as_ref() {
            updater.set_update(update);
        }
    }

    pub fn is_update_scheduled(&self) -> bool {
        self.updater
            .borrow()
            .as_ref()
            .map(Updater::is_update_scheduled)
            .unwrap_or(false)
    }

    /// Applies `color`, or the interop root's current background when
    /// `color` is unspecified.
    pub fn set_background_color(&self, color: Color) -> Result<(), InteropError> {
        let resolved = if color.is_specified() {
            color
        } else {
            self.interop_container.container_background()?
        };
        self.host.set_background_color(self.container, resolved)
    }

    pub fn set_frame(&self, frame: Rect) -> Result<(), InteropError> {
        self.host.set_frame(self.container, frame)?;
        self.interop_container.update_frame(self.container, frame);
        Ok(())
    }

    pub fn set_interactive(&self, interactive: bool) -> Result<(), InteropError> {
        self.host
            .set_user_interaction_enabled(self.container, interactive)?;
        self.interop_container
            .update_interactive(self.container, interactive);
        Ok(())
    }

    /// Tells the component about new bounds. Does nothing before mount or
    /// after release.
    pub fn resize(
        &self,
        on_resize: Option<&ResizeFn<T>>,
        bounds: Rect,
    ) -> Result<(), InteropError> {
        let Some(component) = self.component() else {
            return Ok(());
        };
        match on_resize {
            Some(on_resize) => {
                on_resize(&component, bounds);
                Ok(())
            }
            None => self
                .embedding
                .resize_to_bounds(self.host.as_ref(), &component, bounds),
        }
    }

    /// Attaches the component to the container and registers the container
    /// with the interop root.
    pub fn add_to_hierarchy(&self) -> Result<(), InteropError> {
        let Some(component) = self.component() else {
            log::warn!("container {} added without a component", self.container);
            return Ok(());
        };
        self.embedding
            .attach(self.host.as_ref(), self.container, &component)?;
        self.interop_container.add_interop_view(self.container)
    }

    /// Detaches the component, deregisters the container, disposes the
    /// updater, releases the component, then destroys the container view.
    /// Runs at most once.
    ///
    /// Every step runs even when an earlier native step fails; the first
    /// native error is returned afterwards.
    pub fn remove_from_hierarchy(&self) -> Result<(), InteropError> {
        if self.released.replace(true) {
            return Ok(());
        }
        let component = self.component.borrow_mut().take();
        let detached = match &component {
            Some(component) => self.embedding.detach(self.host.as_ref(), component),
            None => Ok(()),
        };
        let deregistered = if self.interop_container.contains(self.container) {
            self.interop_container.remove_interop_view(self.container)
        } else {
            Ok(())
        };
        if let Some(updater) = self.updater.borrow_mut().take() {
            updater.dispose();
        }
        let on_release = self.on_release.borrow_mut().take();
        if let (Some(component), Some(on_release)) = (&component, on_release) {
            on_release(component);
        }
        let destroyed = self.host.destroy_container(self.container);
        detached.and(deregistered).and(destroyed)
    }
}

impl<T: 'static, E: Embedding<T> + fmt::Debug> fmt::Debug for EmbeddedInteropComponent<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedInteropComponent")
            .field("container", &self.container)
            .field("embedding", &self.embedding)
            .field("mounted", &self.is_mounted())
            .field("released", &self.released.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/embedded_tests.rs"]
mod tests;
