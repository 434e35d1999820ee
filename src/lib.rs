// Particle hover effect: an image sampled into a cloud of particles that
// scatter away from the pointer and spring back to where they came from.
//
// The simulation core (`field`, `simulation`, `widget`) is plain Rust and
// runs anywhere; `web` binds it to a canvas through wasm-bindgen.

mod utils;

pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod particle;
pub mod scheduler;
pub mod simulation;
pub mod surface;
pub mod web;
pub mod widget;

use std::sync::Once;
use wasm_bindgen::prelude::*;

pub use color::Color;
pub use config::{Physics, Sampling, Sizing, WidgetConfig};
pub use error::HoverError;
pub use field::{FieldBuilder, FitMode, ImageSource, Placement, RgbaRaster};
pub use particle::Particle;
pub use scheduler::{FrameLoop, FrameScheduler, ManualScheduler, RafScheduler};
pub use simulation::Simulation;
pub use surface::{PixelBuffer, Surface};
pub use web::{CanvasSurface, HoverOptions, ParticleHover};
pub use widget::{LoopState, Widget};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    static LOGGING: Once = Once::new();
    utils::set_panic_hook();
    LOGGING.call_once(tracing_wasm::set_as_global_default);
}
