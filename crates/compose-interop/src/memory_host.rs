//! In-memory [`NativeHost`] that keeps a view/controller tree and records
//! every mutation it receives.

use std::cell::{Cell, RefCell};

use compose_core::collections::map::HashMap;
use compose_ui_graphics::{Color, Rect};

use crate::error::InteropError;
use crate::native::{ControllerId, NativeHost, ViewId};

/// Mutation received by a [`MemoryNativeHost`], in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum HostOp {
    CreateContainer(ViewId),
    AddSubview { parent: ViewId, child: ViewId },
    RemoveFromSuperview(ViewId),
    DestroyContainer(ViewId),
    SetFrame { view: ViewId, frame: Rect },
    SetBackground { view: ViewId, color: Color },
    SetInteraction { view: ViewId, enabled: bool },
    AddChildController { parent: ControllerId, child: ControllerId },
    RemoveFromParentController(ControllerId),
    DidMoveToParent { child: ControllerId, parent: Option<ControllerId> },
    WillMoveToParent { child: ControllerId, parent: Option<ControllerId> },
}

#[derive(Clone, Debug)]
struct ViewRecord {
    superview: Option<ViewId>,
    subviews: Vec<ViewId>,
    frame: Rect,
    background: Color,
    interaction_enabled: bool,
}

impl Default for ViewRecord {
    fn default() -> Self {
        Self {
            superview: None,
            subviews: Vec::new(),
            frame: Rect::ZERO,
            background: Color::TRANSPARENT,
            interaction_enabled: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ControllerRecord {
    view: Option<ViewId>,
    parent: Option<ControllerId>,
    children: Vec<ControllerId>,
}

#[derive(Default)]
struct HostState {
    views: HashMap<ViewId, ViewRecord>,
    controllers: HashMap<ControllerId, ControllerRecord>,
    ops: Vec<HostOp>,
}

impl HostState {
    fn view_mut(&mut self, id: ViewId) -> Result<&mut ViewRecord, InteropError> {
        self.views.get_mut(&id).ok_or(InteropError::MissingView { id })
    }

    fn controller_mut(&mut self, id: ControllerId) -> Result<&mut ControllerRecord, InteropError> {
        self.controllers
            .get_mut(&id)
            .ok_or(InteropError::MissingController { id })
    }

    fn detach_view(&mut self, view: ViewId) -> Result<(), InteropError> {
        let superview = self.view_mut(view)?.superview.take();
        if let Some(parent) = superview {
            self.view_mut(parent)?.subviews.retain(|child| *child != view);
        }
        Ok(())
    }
}

/// Headless native toolkit.
///
/// Views and controllers live in hash maps; nothing is drawn. Used by tests
/// and by the demo app to show which native calls the interop layer makes.
#[derive(Default)]
pub struct MemoryNativeHost {
    state: RefCell<HostState>,
    next_id: Cell<u64>,
}

impl MemoryNativeHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    /// Creates a plain view. Not recorded as an op; factories call this.
    pub fn create_view(&self) -> ViewId {
        let id = ViewId(self.allocate_id());
        self.state
            .borrow_mut()
            .views
            .insert(id, ViewRecord::default());
        id
    }

    /// Creates a controller owning a fresh root view.
    pub fn create_controller(&self) -> ControllerId {
        let view = self.create_view();
        let id = ControllerId(self.allocate_id());
        self.state.borrow_mut().controllers.insert(
            id,
            ControllerRecord {
                view: Some(view),
                ..ControllerRecord::default()
            },
        );
        id
    }

    /// Creates a controller whose view was never loaded.
    pub fn create_viewless_controller(&self) -> ControllerId {
        let id = ControllerId(self.allocate_id());
        self.state
            .borrow_mut()
            .controllers
            .insert(id, ControllerRecord::default());
        id
    }

    /// Live views, containers included.
    pub fn view_count(&self) -> usize {
        self.state.borrow().views.len()
    }

    pub fn contains_view(&self, view: ViewId) -> bool {
        self.state.borrow().views.contains_key(&view)
    }

    pub fn ops(&self) -> Vec<HostOp> {
        self.state.borrow().ops.clone()
    }

    pub fn take_ops(&self) -> Vec<HostOp> {
        std::mem::take(&mut self.state.borrow_mut().ops)
    }

    pub fn clear_ops(&self) {
        self.state.borrow_mut().ops.clear();
    }

    pub fn superview(&self, view: ViewId) -> Option<ViewId> {
        self.state
            .borrow()
            .views
            .get(&view)
            .and_then(|record| record.superview)
    }

    pub fn subviews(&self, view: ViewId) -> Vec<ViewId> {
        self.state
            .borrow()
            .views
            .get(&view)
            .map(|record| record.subviews.clone())
            .unwrap_or_default()
    }

    pub fn is_interaction_enabled(&self, view: ViewId) -> Option<bool> {
        self.state
            .borrow()
            .views
            .get(&view)
            .map(|record| record.interaction_enabled)
    }

    pub fn parent_controller(&self, controller: ControllerId) -> Option<ControllerId> {
        self.state
            .borrow()
            .controllers
            .get(&controller)
            .and_then(|record| record.parent)
    }

    pub fn child_controllers(&self, controller: ControllerId) -> Vec<ControllerId> {
        self.state
            .borrow()
            .controllers
            .get(&controller)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    fn record(&self, op: HostOp) {
        log::trace!("host op {op:?}");
        self.state.borrow_mut().ops.push(op);
    }
}

impl NativeHost for MemoryNativeHost {
    fn create_container(&self) -> ViewId {
        let id = self.create_view();
        self.record(HostOp::CreateContainer(id));
        id
    }

    fn add_subview(&self, parent: ViewId, child: ViewId) -> Result<(), InteropError> {
        {
            let mut state = self.state.borrow_mut();
            state.view_mut(parent)?;
            state.detach_view(child)?;
            state.view_mut(child)?.superview = Some(parent);
            state.view_mut(parent)?.subviews.push(child);
        }
        self.record(HostOp::AddSubview { parent, child });
        Ok(())
    }

    fn remove_from_superview(&self, view: ViewId) -> Result<(), InteropError> {
        self.state.borrow_mut().detach_view(view)?;
        self.record(HostOp::RemoveFromSuperview(view));
        Ok(())
    }

    fn destroy_container(&self, view: ViewId) -> Result<(), InteropError> {
        {
            let mut state = self.state.borrow_mut();
            state.detach_view(view)?;
            let record = state
                .views
                .remove(&view)
                .ok_or(InteropError::MissingView { id: view })?;
            for child in record.subviews {
                if let Some(child) = state.views.get_mut(&child) {
                    child.superview = None;
                }
            }
        }
        self.record(HostOp::DestroyContainer(view));
        Ok(())
    }

    fn set_frame(&self, view: ViewId, frame: Rect) -> Result<(), InteropError> {
        self.state.borrow_mut().view_mut(view)?.frame = frame;
        self.record(HostOp::SetFrame { view, frame });
        Ok(())
    }

    fn frame(&self, view: ViewId) -> Result<Rect, InteropError> {
        self.state.borrow_mut().view_mut(view).map(|record| record.frame)
    }

    fn set_background_color(&self, view: ViewId, color: Color) -> Result<(), InteropError> {
        self.state.borrow_mut().view_mut(view)?.background = color;
        self.record(HostOp::SetBackground { view, color });
        Ok(())
    }

    fn background_color(&self, view: ViewId) -> Result<Color, InteropError> {
        self.state
            .borrow_mut()
            .view_mut(view)
            .map(|record| record.background)
    }

    fn set_user_interaction_enabled(
        &self,
        view: ViewId,
        enabled: bool,
    ) -> Result<(), InteropError> {
        self.state.borrow_mut().view_mut(view)?.interaction_enabled = enabled;
        self.record(HostOp::SetInteraction { view, enabled });
        Ok(())
    }

    fn controller_view(&self, controller: ControllerId) -> Result<ViewId, InteropError> {
        self.state
            .borrow_mut()
            .controller_mut(controller)?
            .view
            .ok_or(InteropError::ControllerHasNoView { id: controller })
    }

    fn add_child_controller(
        &self,
        parent: ControllerId,
        child: ControllerId,
    ) -> Result<(), InteropError> {
        {
            let mut state = self.state.borrow_mut();
            state.controller_mut(parent)?;
            let record = state.controller_mut(child)?;
            if record.parent.is_some() {
                return Err(InteropError::AlreadyAttached { id: child });
            }
            record.parent = Some(parent);
            state.controller_mut(parent)?.children.push(child);
        }
        self.record(HostOp::AddChildController { parent, child });
        Ok(())
    }

    fn remove_from_parent_controller(&self, child: ControllerId) -> Result<(), InteropError> {
        {
            let mut state = self.state.borrow_mut();
            let parent = state.controller_mut(child)?.parent.take();
            if let Some(parent) = parent {
                state
                    .controller_mut(parent)?
                    .children
                    .retain(|controller| *controller != child);
            }
        }
        self.record(HostOp::RemoveFromParentController(child));
        Ok(())
    }

    fn did_move_to_parent(
        &self,
        child: ControllerId,
        parent: Option<ControllerId>,
    ) -> Result<(), InteropError> {
        self.state.borrow_mut().controller_mut(child)?;
        self.record(HostOp::DidMoveToParent { child, parent });
        Ok(())
    }

    fn will_move_to_parent(
        &self,
        child: ControllerId,
        parent: Option<ControllerId>,
    ) -> Result<(), InteropError> {
        self.state.borrow_mut().controller_mut(child)?;
        self.record(HostOp::WillMoveToParent { child, parent });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_subview_moves_view_between_parents() {
        let host = MemoryNativeHost::new();
        let first = host.create_container();
        let second = host.create_container();
        let child = host.create_view();

        host.add_subview(first, child).expect("add to first");
        host.add_subview(second, child).expect("move to second");

        assert_eq!(host.superview(child), Some(second));
        assert!(host.subviews(first).is_empty());
        assert_eq!(host.subviews(second), vec![child]);
    }

    #[test]
    fn missing_handles_are_reported() {
        let host = MemoryNativeHost::new();
        let ghost = ViewId(404);
        assert_eq!(
            host.set_frame(ghost, Rect::ZERO),
            Err(InteropError::MissingView { id: ghost })
        );
        let controller = host.create_viewless_controller();
        assert_eq!(
            host.controller_view(controller),
            Err(InteropError::ControllerHasNoView { id: controller })
        );
    }

    #[test]
    fn destroyed_container_orphans_its_subviews() {
        let host = MemoryNativeHost::new();
        let root = host.create_view();
        let container = host.create_container();
        let child = host.create_view();
        host.add_subview(root, container).expect("attach container");
        host.add_subview(container, child).expect("attach child");

        host.destroy_container(container).expect("destroy");

        assert!(!host.contains_view(container));
        assert!(host.contains_view(child));
        assert_eq!(host.superview(child), None);
        assert!(host.subviews(root).is_empty());
        assert_eq!(
            host.destroy_container(container),
            Err(InteropError::MissingView { id: container })
        );
    }

    #[test]
    fn controller_cannot_have_two_parents() {
        let host = MemoryNativeHost::new();
        let root = host.create_controller();
        let other = host.create_controller();
        let child = host.create_controller();

        host.add_child_controller(root, child).expect("first parent");
        assert_eq!(
            host.add_child_controller(other, child),
            Err(InteropError::AlreadyAttached { id: child })
        );
        host.remove_from_parent_controller(child).expect("detach");
        assert!(host.child_controllers(root).is_empty());
        assert_eq!(host.parent_controller(child), None);
    }
}
