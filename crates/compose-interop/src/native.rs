//! Contract with the host platform's native view toolkit.
//!
//! Native views and controllers are reference objects owned by the platform.
//! The interop layer only holds opaque ids and asks the host to mutate them,
//! the same way the composer talks to nodes through an applier.

use std::fmt;

use compose_ui_graphics::{Color, Rect};

use crate::error::InteropError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native toolkit operations used by the interop layer.
///
/// All methods are called on the UI thread only. Frames are in
/// density-independent units relative to the superview.
pub trait NativeHost {
    /// Creates an empty grouping view with no superview.
    fn create_container(&self) -> ViewId;

    /// Appends `child` to `parent`, detaching it from any previous superview.
    fn add_subview(&self, parent: ViewId, child: ViewId) -> Result<(), InteropError>;

    /// Detaches `view` from its superview. Detaching a view without a
    /// superview is not an error.
    fn remove_from_superview(&self, view: ViewId) -> Result<(), InteropError>;

    /// Frees a view made by [`create_container`](Self::create_container).
    /// Remaining subviews are orphaned, not destroyed.
    fn destroy_container(&self, view: ViewId) -> Result<(), InteropError>;

    fn set_frame(&self, view: ViewId, frame: Rect) -> Result<(), InteropError>;

    fn frame(&self, view: ViewId) -> Result<Rect, InteropError>;

    fn set_background_color(&self, view: ViewId, color: Color) -> Result<(), InteropError>;

    fn background_color(&self, view: ViewId) -> Result<Color, InteropError>;

    fn set_user_interaction_enabled(&self, view: ViewId, enabled: bool)
        -> Result<(), InteropError>;

    /// Root view of a controller.
    fn controller_view(&self, controller: ControllerId) -> Result<ViewId, InteropError>;

    fn add_child_controller(
        &self,
        parent: ControllerId,
        child: ControllerId,
    ) -> Result<(), InteropError>;

    fn remove_from_parent_controller(&self, child: ControllerId) -> Result<(), InteropError>;

    /// Containment signal sent after `child` was attached to `parent`.
    fn did_move_to_parent(
        &self,
        child: ControllerId,
        parent: Option<ControllerId>,
    ) -> Result<(), InteropError>;

    /// Containment signal sent before `child` is detached from its parent.
    fn will_move_to_parent(
        &self,
        child: ControllerId,
        parent: Option<ControllerId>,
    ) -> Result<(), InteropError>;
}

/// User objects that are, or wrap, a native view.
pub trait AsNativeView {
    fn native_view(&self) -> ViewId;
}

impl AsNativeView for ViewId {
    fn native_view(&self) -> ViewId {
        *self
    }
}

/// User objects that are, or wrap, a native view controller.
pub trait AsNativeController {
    fn native_controller(&self) -> ControllerId;
}

impl AsNativeController for ControllerId {
    fn native_controller(&self) -> ControllerId {
        *self
    }
}
