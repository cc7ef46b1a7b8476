#![doc = r"Runtime services and observable state shared by the Compose-RS interop crates."]

pub mod collections;
pub mod hash;
pub mod platform;
pub mod runtime;
pub mod snapshot_observer;
pub mod state;

pub use hash::{hash_one, location_key};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use snapshot_observer::{untracked, SnapshotStateObserver};
pub use state::{mutable_state_of, MutableState, StateId};

#[cfg(test)]
pub use runtime::TestScheduler;

/// Slot identity inside a composition pass.
pub type Key = u64;
