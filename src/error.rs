// Error types shared by the field builder, the widget and the browser binding.
//
// None of these ever reach the host page: the widget logs them and degrades
// to an empty, idle effect.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HoverError>;

#[derive(Debug, Error)]
pub enum HoverError {
    #[error("drawing surface is unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("failed to decode source image: {0}")]
    Decode(String),

    #[error("source image has no pixels")]
    EmptyImage,

    #[error("surface has zero area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("raster buffer holds {actual} bytes, expected {expected}")]
    RasterSize { expected: usize, actual: usize },

    #[error("fit scale must be a positive finite number, got {0}")]
    InvalidScale(f64),

    #[error("invalid configuration: {0}")]
    Config(&'static str),
}

impl From<image::ImageError> for HoverError {
    fn from(err: image::ImageError) -> Self {
        HoverError::Decode(err.to_string())
    }
}

impl HoverError {
    // JsValue isn't an Error, so browser failures are flattened to their
    // string form when crossing into the crate's error type
    pub(crate) fn surface(value: impl Into<wasm_bindgen::JsValue>) -> Self {
        let value = value.into();
        HoverError::SurfaceUnavailable(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}
