use nalgebra::Vector3;

/// Struct, representing a single 8-bit per channel pixel.
/// Field order follows the on-disk TGA order (blue, green, red), alpha is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

pub const WHITE: Color = Color::new(255, 255, 255);
pub const BLACK: Color = Color::new(0, 0, 0);
pub const RED: Color = Color::new(255, 0, 0);
pub const GREEN: Color = Color::new(0, 255, 0);
pub const BLUE: Color = Color::new(0, 0, 255);

impl Default for Color {
    fn default() -> Self {
        return BLACK;
    }
}

impl Color {
    /// Opaque color from red, green and blue components.
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { b, g, r, a: 255 };
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Color {
        return Color { b, g, r, a };
    }

    /// Opaque color from rgb components in [0.0, 1.0]. Values outside are clamped,
    /// scaling to 8 bits truncates.
    pub fn from_unit_rgb(rgb: Vector3<f32>) -> Color {
        fn to_channel(value: f32) -> u8 {
            return (value.clamp(0.0, 1.0) * 255.0) as u8;
        }
        return Color::new(to_channel(rgb.x), to_channel(rgb.y), to_channel(rgb.z));
    }

    /// Red, green and blue components scaled to [0.0, 1.0].
    pub fn to_unit_rgb(self) -> Vector3<f32> {
        return Vector3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0;
    }

    /// Bytes in the order they are stored in a TGA file.
    pub fn to_bgr(self) -> [u8; 3] {
        return [self.b, self.g, self.r];
    }
}
