// Simple particle struct to keep track of individual position, velocity, and color,
// plus the rest position it was sampled at

use crate::color::Color;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    origin: [f64; 2],
    color: Color,
}

impl Particle {
    pub fn new(origin_x: f64, origin_y: f64, color: Color) -> Particle {
        Particle {
            pos: [origin_x, origin_y],
            vel: [0.0, 0.0],
            origin: [origin_x, origin_y],
            color,
        }
    }

    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn speed(&self) -> f64 {
        vecmath::vec2_len(self.vel)
    }

    pub fn distance_from_origin(&self) -> f64 {
        vecmath::vec2_len(vecmath::vec2_sub(self.origin, self.pos))
    }
}
