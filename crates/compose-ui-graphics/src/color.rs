/// Linear RGBA color with components in `0.0..=1.0`.
///
/// [`Color::UNSPECIFIED`] is a sentinel, not a drawable color: consumers
/// resolve it from context (for example an inherited background).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32, pub f32);

impl Color {
    pub const BLACK: Color = Color(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color(0.0, 0.0, 0.0, 0.0);
    pub const UNSPECIFIED: Color = Color(f32::NAN, f32::NAN, f32::NAN, f32::NAN);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color(r, g, b, a)
    }

    pub fn from_rgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn is_specified(&self) -> bool {
        !self.is_unspecified()
    }

    pub fn is_unspecified(&self) -> bool {
        self.3.is_nan()
    }

    pub fn alpha(&self) -> f32 {
        self.3
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Color(self.0, self.1, self.2, alpha)
    }

    /// Returns `self` when specified, otherwise the result of `fallback`.
    pub fn take_or_else(self, fallback: impl FnOnce() -> Color) -> Color {
        if self.is_specified() {
            self
        } else {
            fallback()
        }
    }

    /// Equality that treats every unspecified color as equal to each other.
    pub fn same_as(&self, other: &Color) -> bool {
        match (self.is_unspecified(), other.is_unspecified()) {
            (true, true) => true,
            (false, false) => self == other,
            _ => false,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::UNSPECIFIED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_is_not_equal_to_itself_but_same_as_itself() {
        assert_ne!(Color::UNSPECIFIED, Color::UNSPECIFIED);
        assert!(Color::UNSPECIFIED.same_as(&Color::UNSPECIFIED));
        assert!(!Color::UNSPECIFIED.same_as(&Color::BLACK));
        assert!(Color::RED.same_as(&Color::RED));
    }

    #[test]
    fn take_or_else_resolves_only_unspecified() {
        assert_eq!(Color::UNSPECIFIED.take_or_else(|| Color::WHITE), Color::WHITE);
        assert_eq!(Color::BLUE.take_or_else(|| Color::WHITE), Color::BLUE);
        assert!(Color::default().is_unspecified());
        assert_eq!(Color::from_rgba_u8(255, 0, 0, 255), Color::RED);
    }
}
