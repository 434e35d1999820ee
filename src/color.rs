// Simple color struct, sampled straight out of an RGBA pixel buffer

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    // Particles only keep the color of their source pixel, the alpha is
    // only used to decide whether the pixel becomes a particle at all
    pub fn from_rgba_opaque(pixel: [u8; 4]) -> Color {
        Color::rgb(pixel[0], pixel[1], pixel[2])
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// CSS color string understood by `CanvasRenderingContext2d::fillStyle`.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}
