// Drawing surfaces the animation loop renders into. `PixelBuffer` is a plain
// software framebuffer, handy headless and for blitting onto a 2D canvas in
// one `putImageData` call.

use crate::color::Color;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, ImageData};

pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    /// Clears every pixel of the surface.
    fn clear(&mut self);

    fn fill_square(&mut self, x: f64, y: f64, size: f64, color: Color);
}

pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixel_data: vec![0x00; (width * height * 4) as usize],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.get_pixel_index(x as i32, y as i32).map(|idx| {
            [
                self.pixel_data[idx],
                self.pixel_data[idx + 1],
                self.pixel_data[idx + 2],
                self.pixel_data[idx + 3],
            ]
        })
    }

    pub fn present(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&self.pixel_data[..]),
            self.width,
            self.height,
        )?;
        ctx.put_image_data(&image_data, 0.0, 0.0)
    }

    fn get_pixel_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(((y * self.width as i32 + x) * 4) as usize)
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.get_pixel_index(x, y) {
            self.pixel_data[idx..idx + 4].copy_from_slice(&color.to_rgba());
        }
    }
}

impl Surface for PixelBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixel_data = vec![0x00; (width * height * 4) as usize];
    }

    fn clear(&mut self) {
        self.pixel_data.fill(0x00);
    }

    // Squares snap to whole pixels, like fillRect without anti-aliasing
    fn fill_square(&mut self, x: f64, y: f64, size: f64, color: Color) {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let side = size.round().max(0.0) as i32;
        for pixel_y in y0..y0 + side {
            for pixel_x in x0..x0 + side {
                self.set_pixel(pixel_x, pixel_y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_square_paints_side_by_side_pixels() {
        let mut buffer = PixelBuffer::new(8, 8);
        buffer.fill_square(2.4, 3.9, 3.0, Color::rgb(255, 0, 0));
        assert_eq!(buffer.pixel(2, 3), Some([255, 0, 0, 255]));
        assert_eq!(buffer.pixel(4, 5), Some([255, 0, 0, 255]));
        assert_eq!(buffer.pixel(5, 5), Some([0, 0, 0, 0]));
        assert_eq!(buffer.pixel(2, 6), Some([0, 0, 0, 0]));
        let painted = buffer.pixels().chunks(4).filter(|px| px[3] != 0).count();
        assert_eq!(painted, 9);
    }

    #[test]
    fn squares_are_clipped_at_the_edges() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_square(-1.0, 2.0, 3.0, Color::rgb(0, 255, 0));
        let painted = buffer.pixels().chunks(4).filter(|px| px[3] != 0).count();
        assert_eq!(painted, 4);
        assert_eq!(buffer.pixel(4, 0), None);
    }

    #[test]
    fn clear_and_resize_blank_the_buffer() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.fill_square(0.0, 0.0, 4.0, Color::rgb(1, 2, 3));
        buffer.clear();
        assert!(buffer.pixels().iter().all(|&b| b == 0));

        buffer.set_size(6, 2);
        assert_eq!(buffer.size(), (6, 2));
        assert_eq!(buffer.pixels().len(), 6 * 2 * 4);
    }
}
