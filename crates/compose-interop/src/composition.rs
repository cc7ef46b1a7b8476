//! Keyed composition passes over embedded native objects.
//!
//! [`InteropComposition`] plays the part of the composer for interop nodes:
//! each [`compose`](InteropComposition::compose) pass visits nodes by key,
//! mounting new ones and updating existing ones; nodes a pass does not visit
//! leave composition.

#![allow(non_snake_case)]

use std::any::Any;
use std::fmt;

use compose_core::collections::map::HashSet;
use compose_core::Key;
use indexmap::IndexMap;

use crate::args::{InteropArgs, NativeControllerArgs, NativeViewArgs};
use crate::embedded::{ControllerEmbedding, Embedding, ViewEmbedding};
use crate::environment::InteropEnvironment;
use crate::native::{AsNativeController, AsNativeView, ViewId};
use crate::node::{InteropViewNode, LayoutCoordinates, PlacementChange};

trait InteropSlot {
    fn container(&self) -> ViewId;
    fn on_placed(&mut self, coordinates: LayoutCoordinates) -> PlacementChange;
    fn unmount(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static, E: Embedding<T>> InteropSlot for InteropViewNode<T, E> {
    fn container(&self) -> ViewId {
        InteropViewNode::container(self)
    }

    fn on_placed(&mut self, coordinates: LayoutCoordinates) -> PlacementChange {
        InteropViewNode::on_placed(self, coordinates)
    }

    fn unmount(&mut self) {
        InteropViewNode::unmount(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Interop nodes of one composition, keyed by call site.
pub struct InteropComposition {
    env: InteropEnvironment,
    slots: IndexMap<Key, Box<dyn InteropSlot>>,
}

impl InteropComposition {
    pub fn new(env: InteropEnvironment) -> Self {
        Self {
            env,
            slots: IndexMap::new(),
        }
    }

    pub fn env(&self) -> &InteropEnvironment {
        &self.env
    }

    /// Runs one composition pass. Nodes from the previous pass that `content`
    /// does not visit are unmounted, last-mounted first.
    pub fn compose<R>(&mut self, content: impl FnOnce(&mut InteropScope<'_>) -> R) -> R {
        let mut scope = InteropScope {
            env: &self.env,
            slots: &mut self.slots,
            visited: HashSet::default(),
        };
        let result = content(&mut scope);
        let visited = scope.visited;

        let stale: Vec<Key> = self
            .slots
            .keys()
            .filter(|key| !visited.contains(*key))
            .copied()
            .collect();
        for key in stale.into_iter().rev() {
            if let Some(mut slot) = self.slots.shift_remove(&key) {
                log::debug!("interop slot {key:#x} left composition");
                slot.unmount();
            }
        }
        result
    }

    /// Routes a layout-position callback to the node at `key`.
    pub fn on_placed(
        &mut self,
        key: Key,
        coordinates: LayoutCoordinates,
    ) -> Option<PlacementChange> {
        match self.slots.get_mut(&key) {
            Some(slot) => Some(slot.on_placed(coordinates)),
            None => {
                log::warn!("placement for unknown interop slot {key:#x}");
                None
            }
        }
    }

    pub fn node<T: 'static, E: Embedding<T>>(&self, key: Key) -> Option<&InteropViewNode<T, E>> {
        self.slots.get(&key)?.as_any().downcast_ref()
    }

    pub fn container(&self, key: Key) -> Option<ViewId> {
        self.slots.get(&key).map(|slot| slot.container())
    }

    pub fn keys(&self) -> Vec<Key> {
        self.slots.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Unmounts every node, last-mounted first.
    pub fn dispose(&mut self) {
        while let Some((key, mut slot)) = self.slots.pop() {
            log::debug!("interop slot {key:#x} disposed");
            slot.unmount();
        }
    }
}

impl Drop for InteropComposition {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for InteropComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropComposition")
            .field("keys", &self.keys())
            .field("env", &self.env)
            .finish()
    }
}

/// Handle passed to the content of a composition pass.
pub struct InteropScope<'a> {
    env: &'a InteropEnvironment,
    slots: &'a mut IndexMap<Key, Box<dyn InteropSlot>>,
    visited: HashSet<Key>,
}

impl InteropScope<'_> {
    pub fn env(&self) -> &InteropEnvironment {
        self.env
    }

    fn embed<T: 'static, E: Embedding<T>>(
        &mut self,
        key: Key,
        embedding: impl FnOnce() -> E,
        args: InteropArgs<T>,
    ) -> ViewId {
        assert!(
            self.visited.insert(key),
            "interop key {key:#x} used twice in one composition pass"
        );
        let (factory, on_release, options) = args.into_parts();
        if let Some(slot) = self.slots.get_mut(&key) {
            if let Some(node) = slot.as_any_mut().downcast_mut::<InteropViewNode<T, E>>() {
                node.apply(options);
                return node.container();
            }
            log::debug!("interop slot {key:#x} changed type, remounting");
            if let Some(mut stale) = self.slots.shift_remove(&key) {
                stale.unmount();
            }
        }
        let mut node = InteropViewNode::new(self.env.clone(), embedding(), on_release);
        node.mount(factory, options);
        let container = node.container();
        self.slots.insert(key, Box::new(node));
        container
    }
}

/// Embeds a native view at `key`, returning its container view.
///
/// The factory runs on the pass that first visits `key`; later passes apply
/// the update callback, background, resize callback and interaction flag.
pub fn NativeView<T: AsNativeView + 'static>(
    scope: &mut InteropScope<'_>,
    key: Key,
    args: NativeViewArgs<T>,
) -> ViewId {
    scope.embed(key, || ViewEmbedding, args)
}

/// Embeds a native view controller at `key` as a child of the environment's
/// root controller, returning its container view.
///
/// # Panics
///
/// When the environment has no root controller.
pub fn NativeViewController<T: AsNativeController + 'static>(
    scope: &mut InteropScope<'_>,
    key: Key,
    args: NativeControllerArgs<T>,
) -> ViewId {
    let Some(root) = scope.env().root_controller else {
        panic!("NativeViewController requires an InteropEnvironment with a root controller");
    };
    scope.embed(key, move || ControllerEmbedding::new(root), args)
}

/// Slot key for the calling source location, optionally mixed with a value
/// distinguishing repeated calls (such as a list index).
#[macro_export]
macro_rules! interop_key {
    () => {
        $crate::location_key(file!(), line!(), column!())
    };
    ($discriminator:expr) => {
        $crate::hash_one(&(
            $crate::location_key(file!(), line!(), column!()),
            $discriminator,
        ))
    };
}
