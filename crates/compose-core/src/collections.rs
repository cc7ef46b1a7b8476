//! Collection aliases used by the runtime.
//!
//! `hashbrown` is the default backing store; the `std-hash` feature swaps in
//! the standard library maps for hosts that want fewer dependencies.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};
}
