//! Native view interop for Compose-RS.
//!
//! Embeds platform views and view controllers in a composition. Composition
//! and layout never mutate native objects themselves; they queue actions on
//! an [`InteropContext`] that the frame driver flushes on the UI thread after
//! layout. Each embedded object gets a container view registered with the
//! [`InteropContainer`], and an [`Updater`] that re-runs the user's update
//! callback when state it read changes.

mod args;
mod composition;
mod container;
mod context;
mod embedded;
mod environment;
mod error;
pub mod memory_host;
mod native;
mod node;
mod updater;

pub use args::{InteropArgs, InteropOptions, NativeControllerArgs, NativeViewArgs};
pub use composition::{InteropComposition, InteropScope, NativeView, NativeViewController};
pub use container::InteropContainer;
pub use context::{
    DeferFn, DeferredAction, HierarchyChange, InteropContext, InteropState, InteropTransaction,
};
pub use embedded::{
    ControllerEmbedding, EmbeddedInteropComponent, Embedding, ReleaseFn, ResizeFn, ViewEmbedding,
};
pub use environment::InteropEnvironment;
pub use error::InteropError;
pub use native::{AsNativeController, AsNativeView, ControllerId, NativeHost, ViewId};
pub use node::{InteropNodeState, InteropViewNode, LayoutCoordinates, PlacementChange};
pub use updater::{UpdateFn, Updater};

pub use compose_core::{hash_one, location_key, Key};
