//! Per-instance lifecycle of an embedded native object inside composition.

use std::fmt;
use std::rc::Rc;

use compose_ui_graphics::{Color, IntOffset, IntRect, IntSize, Point};

use crate::args::InteropOptions;
use crate::context::HierarchyChange;
use crate::embedded::{EmbeddedInteropComponent, Embedding, ReleaseFn, ResizeFn};
use crate::environment::InteropEnvironment;
use crate::native::ViewId;
use crate::updater::UpdateFn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteropNodeState {
    Uninitialized,
    Mounted,
    Unmounted,
}

/// Resolved placement of the zero-size layout node, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutCoordinates {
    pub position_in_root: Point,
    pub position_in_window: Point,
    pub size: IntSize,
}

impl LayoutCoordinates {
    /// Placement for a root that sits at the window origin.
    pub fn new(position_in_root: Point, size: IntSize) -> Self {
        Self {
            position_in_root,
            position_in_window: position_in_root,
            size,
        }
    }
}

/// Which deferred actions a placement produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementChange {
    pub frame_changed: bool,
    pub resized: bool,
}

/// Composition-side handle of one embedded native object.
///
/// Every native effect goes through the environment's
/// [`InteropContext`](crate::InteropContext); the node itself only tracks
/// state and decides what to defer.
pub struct InteropViewNode<T: 'static, E: Embedding<T>> {
    env: InteropEnvironment,
    embedded: Rc<EmbeddedInteropComponent<T, E>>,
    state: InteropNodeState,
    rect_in_pixels: IntRect,
    local_to_window_offset: IntOffset,
    background: Color,
    interactive: bool,
    on_resize: Option<ResizeFn<T>>,
    no_update: UpdateFn<T>,
}

impl<T: 'static, E: Embedding<T>> InteropViewNode<T, E> {
    /// Creates the node and its container view. The component is created by
    /// [`mount`](Self::mount).
    pub fn new(env: InteropEnvironment, embedding: E, on_release: ReleaseFn<T>) -> Self {
        let embedded = Rc::new(EmbeddedInteropComponent::new(
            Rc::clone(&env.host),
            env.container.clone(),
            embedding,
            on_release,
        ));
        Self {
            env,
            embedded,
            state: InteropNodeState::Uninitialized,
            rect_in_pixels: IntRect::ZERO,
            local_to_window_offset: IntOffset::ZERO,
            background: Color::UNSPECIFIED,
            interactive: true,
            on_resize: None,
            no_update: Rc::new(|_: &T| {}),
        }
    }

    /// Creates the component, runs its first update and queues its insertion
    /// into the native hierarchy.
    pub fn mount(&mut self, factory: impl FnOnce() -> T, options: InteropOptions<T>) {
        if self.state != InteropNodeState::Uninitialized {
            log::warn!(
                "interop node in container {} mounted while {:?}",
                self.container(),
                self.state
            );
            return;
        }
        let InteropOptions {
            update,
            background,
            on_resize,
            interactive,
        } = options;
        let update = update.unwrap_or_else(|| Rc::clone(&self.no_update));
        self.embedded.mount(
            factory(),
            update,
            self.env.runtime.clone(),
            self.env.context.deferrer(),
        );
        self.state = InteropNodeState::Mounted;
        self.on_resize = on_resize;

        let embedded = Rc::clone(&self.embedded);
        self.env
            .context
            .defer_hierarchy_change(HierarchyChange::ViewAdded, move || {
                embedded.add_to_hierarchy()
            });
        self.interactive = interactive;
        self.defer_interactive();
        self.background = background;
        self.defer_background();
        log::debug!("interop node mounted in container {}", self.container());
    }

    /// Applies the options of a later composition pass.
    pub fn apply(&mut self, options: InteropOptions<T>) {
        let update = options
            .update
            .unwrap_or_else(|| Rc::clone(&self.no_update));
        self.set_update(update);
        self.set_background(options.background);
        self.set_interactive(options.interactive);
        self.set_on_resize(options.on_resize);
    }

    /// Layout-position callback. Queues a frame update when the pixel rect
    /// moved or resized, and a resize when its size changed.
    pub fn on_placed(&mut self, coordinates: LayoutCoordinates) -> PlacementChange {
        match self.state {
            InteropNodeState::Mounted => {}
            InteropNodeState::Uninitialized => return PlacementChange::default(),
            InteropNodeState::Unmounted => {
                log::warn!(
                    "interop node in container {} placed after unmount",
                    self.container()
                );
                return PlacementChange::default();
            }
        }
        let offset = coordinates.position_in_root.round();
        let window = coordinates.position_in_window.round();
        self.local_to_window_offset = IntOffset::new(window.x - offset.x, window.y - offset.y);

        let rect = IntRect::from_offset_size(offset, coordinates.size);
        if rect == self.rect_in_pixels {
            return PlacementChange::default();
        }
        let resized = !rect.same_size(&self.rect_in_pixels);
        self.rect_in_pixels = rect;

        let frame = self.env.density.to_dp_rect(rect);
        let embedded = Rc::clone(&self.embedded);
        self.env
            .context
            .defer_action(move || embedded.set_frame(frame));
        if resized {
            let embedded = Rc::clone(&self.embedded);
            let on_resize = self.on_resize.clone();
            let bounds = frame.bounds();
            self.env
                .context
                .defer_action(move || embedded.resize(on_resize.as_ref(), bounds));
        }
        PlacementChange {
            frame_changed: true,
            resized,
        }
    }

    pub fn set_background(&mut self, background: Color) {
        if self.state != InteropNodeState::Mounted || background.same_as(&self.background) {
            return;
        }
        self.background = background;
        self.defer_background();
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        if self.state != InteropNodeState::Mounted || interactive == self.interactive {
            return;
        }
        self.interactive = interactive;
        self.defer_interactive();
    }

    /// Replaces the update callback; a different callback runs right away.
    pub fn set_update(&mut self, update: UpdateFn<T>) {
        if self.state == InteropNodeState::Mounted {
            self.embedded.set_update(update);
        }
    }

    /// Takes effect on the next size change.
    pub fn set_on_resize(&mut self, on_resize: Option<ResizeFn<T>>) {
        self.on_resize = on_resize;
    }

    /// Queues the removal protocol. Nothing is deferred for this node
    /// afterwards.
    pub fn unmount(&mut self) {
        match self.state {
            InteropNodeState::Mounted => {
                let embedded = Rc::clone(&self.embedded);
                self.env
                    .context
                    .defer_hierarchy_change(HierarchyChange::ViewRemoved, move || {
                        embedded.remove_from_hierarchy()
                    });
                log::debug!("interop node in container {} unmounted", self.container());
            }
            InteropNodeState::Uninitialized => {
                let embedded = Rc::clone(&self.embedded);
                self.env
                    .context
                    .defer_action(move || embedded.remove_from_hierarchy());
            }
            InteropNodeState::Unmounted => {
                log::warn!(
                    "interop node in container {} unmounted twice",
                    self.container()
                );
                return;
            }
        }
        self.state = InteropNodeState::Unmounted;
    }

    fn defer_background(&self) {
        let embedded = Rc::clone(&self.embedded);
        let background = self.background;
        self.env
            .context
            .defer_action(move || embedded.set_background_color(background));
    }

    fn defer_interactive(&self) {
        let embedded = Rc::clone(&self.embedded);
        let interactive = self.interactive;
        self.env
            .context
            .defer_action(move || embedded.set_interactive(interactive));
    }

    pub fn state(&self) -> InteropNodeState {
        self.state
    }

    pub fn container(&self) -> ViewId {
        self.embedded.container()
    }

    pub fn embedded(&self) -> &Rc<EmbeddedInteropComponent<T, E>> {
        &self.embedded
    }

    pub fn component(&self) -> Option<Rc<T>> {
        self.embedded.component()
    }

    pub fn rect_in_pixels(&self) -> IntRect {
        self.rect_in_pixels
    }

    pub fn local_to_window_offset(&self) -> IntOffset {
        self.local_to_window_offset
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl<T: 'static, E: Embedding<T>> fmt::Debug for InteropViewNode<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropViewNode")
            .field("container", &self.container())
            .field("state", &self.state)
            .field("rect_in_pixels", &self.rect_in_pixels)
            .field("background", &self.background)
            .field("interactive", &self.interactive)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/node_tests.rs"]
mod tests;
