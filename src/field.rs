// Particle field builder: rasterizes a source image at the size it will be
// drawn at, samples it on a fixed stride and turns every opaque sample into
// a particle placed in surface coordinates.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::color::Color;
use crate::config::{Sampling, WidgetConfig};
use crate::error::{HoverError, Result};
use crate::particle::Particle;

/// How the image is laid out on the surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FitMode {
    /// Map the full image onto the full surface, independently per axis.
    Stretch,
    /// Keep the aspect ratio, size the image to `scale` times the surface
    /// width (never larger than the surface) and center it.
    AspectFit { scale: f64 },
}

impl Default for FitMode {
    fn default() -> Self {
        FitMode::Stretch
    }
}

/// Where the sampled raster lands on the surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Size the image is rasterized at before sampling.
    pub raster_size: (u32, u32),
    /// Size of the draw rectangle in surface pixels.
    pub draw_size: [f64; 2],
    /// Top-left corner of the draw rectangle.
    pub offset: [f64; 2],
    /// Raster pixel to surface pixel factor per axis.
    pub scale: [f64; 2],
}

impl Placement {
    pub fn compute(image: (u32, u32), surface: (u32, u32), fit: FitMode) -> Result<Placement> {
        let (img_w, img_h) = image;
        let (surface_w, surface_h) = surface;
        if img_w == 0 || img_h == 0 {
            return Err(HoverError::EmptyImage);
        }
        if surface_w == 0 || surface_h == 0 {
            return Err(HoverError::EmptySurface {
                width: surface_w,
                height: surface_h,
            });
        }
        let (surface_w, surface_h) = (surface_w as f64, surface_h as f64);

        match fit {
            FitMode::Stretch => Ok(Placement {
                raster_size: (img_w, img_h),
                draw_size: [surface_w, surface_h],
                offset: [0.0, 0.0],
                scale: [surface_w / img_w as f64, surface_h / img_h as f64],
            }),
            FitMode::AspectFit { scale } => {
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(HoverError::InvalidScale(scale));
                }
                let aspect = img_w as f64 / img_h as f64;
                let mut draw_w = (surface_w * scale).min(surface_w);
                let mut draw_h = draw_w / aspect;
                // Too tall: shrink both sides so the aspect ratio survives
                if draw_h > surface_h {
                    draw_h = surface_h;
                    draw_w = (draw_h * aspect).min(surface_w);
                }
                let raster_w = (draw_w.round() as u32).max(1);
                let raster_h = (draw_h.round() as u32).max(1);
                Ok(Placement {
                    raster_size: (raster_w, raster_h),
                    draw_size: [draw_w, draw_h],
                    offset: [(surface_w - draw_w) / 2.0, (surface_h - draw_h) / 2.0],
                    scale: [1.0, 1.0],
                })
            }
        }
    }

    pub fn map(&self, x: u32, y: u32) -> [f64; 2] {
        [
            self.offset[0] + x as f64 * self.scale[0],
            self.offset[1] + y as f64 * self.scale[1],
        ]
    }
}

/// Row-major RGBA8 pixels, the offscreen buffer the builder samples from.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaRaster {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaRaster> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(HoverError::RasterSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(RgbaRaster {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

/// Anything that can be drawn into an offscreen RGBA buffer of a given size.
pub trait ImageSource {
    /// Natural size of the image in pixels.
    fn dimensions(&self) -> (u32, u32);

    fn rasterize(&self, width: u32, height: u32) -> Result<RgbaRaster>;
}

impl ImageSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rasterize(&self, width: u32, height: u32) -> Result<RgbaRaster> {
        let resized = if (width, height) == (self.width(), self.height()) {
            self.clone()
        } else {
            imageops::resize(self, width, height, FilterType::Triangle)
        };
        RgbaRaster::new(width, height, resized.into_raw())
    }
}

/// Decodes encoded image bytes into an RGBA buffer.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgba8())
}

#[derive(Copy, Clone, Debug)]
pub struct FieldBuilder {
    sampling: Sampling,
    fit: FitMode,
}

impl FieldBuilder {
    pub fn new(sampling: Sampling, fit: FitMode) -> Self {
        FieldBuilder { sampling, fit }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        FieldBuilder::new(config.sampling, config.fit)
    }

    pub fn build(&self, image: &dyn ImageSource, surface: (u32, u32)) -> Result<Vec<Particle>> {
        if self.sampling.stride == 0 {
            return Err(HoverError::Config("sampling stride must be at least 1"));
        }
        let placement = Placement::compute(image.dimensions(), surface, self.fit)?;
        let (raster_w, raster_h) = placement.raster_size;
        let raster = image.rasterize(raster_w, raster_h)?;
        let particles = self.sample(&raster, &placement);
        debug!(
            count = particles.len(),
            raster_w, raster_h, "built particle field"
        );
        Ok(particles)
    }

    pub fn sample(&self, raster: &RgbaRaster, placement: &Placement) -> Vec<Particle> {
        let stride = self.sampling.stride.max(1) as usize;
        let mut particles = Vec::new();
        for y in (0..raster.height()).step_by(stride) {
            for x in (0..raster.width()).step_by(stride) {
                let pixel = raster.pixel(x, y);
                if pixel[3] > self.sampling.alpha_threshold {
                    let [px, py] = placement.map(x, y);
                    particles.push(Particle::new(px, py, Color::from_rgba_opaque(pixel)));
                }
            }
        }
        particles
    }
}
