//! Pure math/data for colors, geometry and units in Compose-RS.
//!
//! Float types (`Point`, `Size`, `Rect`) are in density-independent units
//! unless stated otherwise; `Int*` types are whole device pixels.

mod color;
mod geometry;
mod unit;

pub use color::*;
pub use geometry::*;
pub use unit::*;

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::geometry::{IntOffset, IntRect, IntSize, Point, Rect, Size};
    pub use crate::unit::{Density, Dp};
}
