use crate::geometry::{IntRect, Rect};

/// Density-independent length.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Dp(pub f32);

/// Pixels per density-independent unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub density: f32,
}

impl Density {
    pub const fn new(density: f32) -> Self {
        Self { density }
    }

    pub fn to_px(&self, dp: Dp) -> f32 {
        dp.0 * self.density
    }

    pub fn to_dp(&self, px: f32) -> Dp {
        Dp(px / self.density)
    }

    /// Converts a pixel rectangle into density-independent units.
    pub fn to_dp_rect(&self, rect: IntRect) -> Rect {
        Rect::new(
            rect.left as f32 / self.density,
            rect.top as f32 / self.density,
            rect.width() as f32 / self.density,
            rect.height() as f32 / self.density,
        )
    }
}

impl Default for Density {
    fn default() -> Self {
        Density::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_pixel_rect_at_density() {
        let density = Density::new(2.0);
        let rect = density.to_dp_rect(IntRect::new(20, 40, 220, 140));
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(density.to_px(Dp(4.0)), 8.0);
        assert_eq!(density.to_dp(8.0), Dp(4.0));
    }
}
