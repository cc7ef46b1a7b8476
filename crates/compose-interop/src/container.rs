use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use compose_core::RuntimeHandle;
use compose_ui_graphics::{Color, Point, Rect};
use indexmap::IndexMap;

use crate::error::InteropError;
use crate::native::{NativeHost, ViewId};

#[derive(Clone, Copy, Debug, PartialEq)]
struct InteropRegion {
    frame: Rect,
    interactive: bool,
}

struct ContainerInner {
    host: Rc<dyn NativeHost>,
    root_view: ViewId,
    runtime: RuntimeHandle,
    regions: RefCell<IndexMap<ViewId, InteropRegion>>,
}

/// Registry of the embedded containers attached to one root view.
///
/// Registration order is z-order: later containers sit above earlier ones,
/// both in the native hierarchy and for [`hit_test`](Self::hit_test).
#[derive(Clone)]
pub struct InteropContainer {
    inner: Rc<ContainerInner>,
}

impl InteropContainer {
    pub fn new(host: Rc<dyn NativeHost>, root_view: ViewId, runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                host,
                root_view,
                runtime,
                regions: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Root native view hosting every embedded container.
    pub fn container_view(&self) -> ViewId {
        self.inner.root_view
    }

    /// Current background of the root view, read from the host.
    pub fn container_background(&self) -> Result<Color, InteropError> {
        self.inner.host.background_color(self.inner.root_view)
    }

    pub fn add_interop_view(&self, view: ViewId) -> Result<(), InteropError> {
        self.inner.runtime.assert_ui_thread();
        self.inner.host.add_subview(self.inner.root_view, view)?;
        let frame = self.inner.host.frame(view)?;
        let mut regions = self.inner.regions.borrow_mut();
        let interactive = regions
            .shift_remove(&view)
            .map(|region| region.interactive)
            .unwrap_or(true);
        regions.insert(view, InteropRegion { frame, interactive });
        log::debug!("interop view {view} added, {} active", regions.len());
        Ok(())
    }

    pub fn remove_interop_view(&self, view: ViewId) -> Result<(), InteropError> {
        self.inner.runtime.assert_ui_thread();
        let removed = self.inner.regions.borrow_mut().shift_remove(&view).is_some();
        if removed {
            self.inner.host.remove_from_superview(view)?;
            log::debug!("interop view {view} removed");
        } else {
            log::warn!("interop view {view} removed but was never added");
        }
        Ok(())
    }

    pub(crate) fn update_frame(&self, view: ViewId, frame: Rect) {
        if let Some(region) = self.inner.regions.borrow_mut().get_mut(&view) {
            region.frame = frame;
        }
    }

    pub(crate) fn update_interactive(&self, view: ViewId, interactive: bool) {
        if let Some(region) = self.inner.regions.borrow_mut().get_mut(&view) {
            region.interactive = interactive;
        }
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.inner.regions.borrow().contains_key(&view)
    }

    pub fn len(&self) -> usize {
        self.inner.regions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered containers, bottom-most first.
    pub fn interop_views(&self) -> Vec<ViewId> {
        self.inner.regions.borrow().keys().copied().collect()
    }

    /// Top-most interactive container whose frame contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<ViewId> {
        self.inner
            .regions
            .borrow()
            .iter()
            .rev()
            .find(|(_, region)| region.interactive && region.frame.contains(point))
            .map(|(view, _)| *view)
    }
}

impl fmt::Debug for InteropContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropContainer")
            .field("root_view", &self.inner.root_view)
            .field("views", &self.interop_views())
            .finish()
    }
}
