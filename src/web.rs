// Browser binding: draws the widget on a 2D canvas, loads the image through an
// HtmlImageElement and wires pointer, resize and image load events to it.
// Every listener is a gloo EventListener, so dropping it unsubscribes.

use gloo::events::EventListener;
use js_sys::{Function, Promise};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent};

use crate::color::Color;
use crate::config::{Sizing, WidgetConfig, DEFAULT_FIT_SCALE};
use crate::error::{HoverError, Result};
use crate::field::{FitMode, ImageSource, RgbaRaster};
use crate::scheduler::RafScheduler;
use crate::surface::Surface;
use crate::widget::{LoopState, Widget};

type HoverWidget = Widget<CanvasSurface, RafScheduler>;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(HoverError::surface)?
        .ok_or_else(|| HoverError::SurfaceUnavailable("canvas has no 2d context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(HoverError::surface)
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    fill: Option<Color>,
}

impl CanvasSurface {
    pub fn acquire(canvas: &HtmlCanvasElement) -> Result<CanvasSurface> {
        let context = context_2d(canvas)?;
        Ok(CanvasSurface {
            canvas: canvas.clone(),
            context,
            fill: None,
        })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        // Resizing a canvas resets its context state
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.fill = None;
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.context
            .clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_square(&mut self, x: f64, y: f64, size: f64, color: Color) {
        if self.fill != Some(color) {
            #[allow(deprecated)]
            self.context
                .set_fill_style(&JsValue::from_str(&color.to_css()));
            self.fill = Some(color);
        }
        self.context.fill_rect(x, y, size, size);
    }
}

// Rasterizes through an offscreen canvas, the same way the browser would draw it
impl ImageSource for HtmlImageElement {
    fn dimensions(&self) -> (u32, u32) {
        (self.natural_width(), self.natural_height())
    }

    fn rasterize(&self, width: u32, height: u32) -> Result<RgbaRaster> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| HoverError::SurfaceUnavailable("no document".into()))?;
        let offscreen = document
            .create_element("canvas")
            .map_err(HoverError::surface)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(HoverError::surface)?;
        offscreen.set_width(width);
        offscreen.set_height(height);
        let context = context_2d(&offscreen)?;
        context
            .draw_image_with_html_image_element_and_dw_and_dh(
                self,
                0.0,
                0.0,
                width as f64,
                height as f64,
            )
            .map_err(|err| HoverError::Decode(format!("{:?}", err)))?;
        let image_data = context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(HoverError::surface)?;
        RgbaRaster::new(width, height, image_data.data().0)
    }
}

/// Options accepted from the host page.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct HoverOptions {
    size: Option<(u32, u32)>,
    scale: Option<f64>,
    aspect_fit: Option<bool>,
}

#[wasm_bindgen]
impl HoverOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> HoverOptions {
        HoverOptions::default()
    }

    /// Explicit canvas size. Without it the canvas fills its parent.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = Some(scale);
    }

    /// `"stretch"` or `"aspect-fit"`.
    pub fn set_fit(&mut self, fit: &str) {
        match fit {
            "stretch" => self.aspect_fit = Some(false),
            "aspect-fit" => self.aspect_fit = Some(true),
            other => warn!(fit = other, "unknown fit mode, keeping the current one"),
        }
    }
}

impl HoverOptions {
    /// Passing a scale alone selects the aspect-preserving fit.
    pub fn config(&self) -> WidgetConfig {
        let sizing = match self.size {
            Some((width, height)) => Sizing::Fixed { width, height },
            None => Sizing::FillParent,
        };
        let fit = if self.aspect_fit.unwrap_or(self.scale.is_some()) {
            FitMode::AspectFit {
                scale: self.scale.unwrap_or(DEFAULT_FIT_SCALE),
            }
        } else {
            FitMode::Stretch
        };
        WidgetConfig {
            sizing,
            fit,
            ..WidgetConfig::default()
        }
    }
}

fn fit_to_parent(canvas: &HtmlCanvasElement, widget: &RefCell<HoverWidget>) {
    if let Some(parent) = canvas.parent_element() {
        let width = parent.client_width().max(0) as u32;
        let height = parent.client_height().max(0) as u32;
        widget.borrow_mut().resize(width, height);
    }
}

// Resolves the promise handed out by `ParticleHover::ready` once the current
// image has either been turned into particles or failed
#[derive(Clone, Default)]
struct Settle(Rc<RefCell<Option<Function>>>);

impl Settle {
    fn pending() -> (Promise, Settle) {
        let settle = Settle::default();
        let slot = Rc::clone(&settle.0);
        let promise = Promise::new(&mut |resolve, _reject| {
            *slot.borrow_mut() = Some(resolve);
        });
        (promise, settle)
    }

    fn resolve(&self, running: bool) {
        if let Some(resolve) = self.0.borrow_mut().take() {
            let _ = resolve.call1(&JsValue::NULL, &JsValue::from_bool(running));
        }
    }
}

/// The particle hover effect mounted on a canvas element.
#[wasm_bindgen]
pub struct ParticleHover {
    canvas: HtmlCanvasElement,
    widget: Option<Rc<RefCell<HoverWidget>>>,
    listeners: Vec<EventListener>,
    image_listeners: Vec<EventListener>,
    ready: Promise,
    settle: Settle,
}

#[wasm_bindgen]
impl ParticleHover {
    /// Never throws: if the canvas or the options are unusable the effect
    /// simply draws nothing.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, image_url: &str, options: &HoverOptions) -> ParticleHover {
        let mut hover = ParticleHover {
            canvas,
            widget: None,
            listeners: Vec::new(),
            image_listeners: Vec::new(),
            ready: Promise::resolve(&JsValue::FALSE),
            settle: Settle::default(),
        };
        match hover.attach(options.config()) {
            Ok(()) => hover.set_image(image_url),
            Err(err) => warn!(%err, "particle hover disabled"),
        }
        hover
    }

    /// Swaps the image. A load still in flight for the previous one is dropped.
    pub fn set_image(&mut self, image_url: &str) {
        self.image_listeners.clear();
        self.settle.resolve(false);
        let (ready, settle) = Settle::pending();
        self.ready = ready;
        self.settle = settle.clone();

        let widget = match &self.widget {
            Some(widget) => Rc::clone(widget),
            None => return settle.resolve(false),
        };
        widget.borrow_mut().clear_image();

        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                warn!(error = ?err, "could not create image element");
                return settle.resolve(false);
            }
        };
        image.set_cross_origin(Some("anonymous"));

        let on_load = {
            let widget = Rc::clone(&widget);
            let settle = settle.clone();
            let loaded = image.clone();
            EventListener::once(&image, "load", move |_| {
                debug!(
                    width = loaded.natural_width(),
                    height = loaded.natural_height(),
                    "image loaded"
                );
                widget.borrow_mut().set_image(loaded);
                let running = widget.borrow().state() == LoopState::Running;
                settle.resolve(running);
            })
        };
        let on_error = {
            let url = image_url.to_owned();
            EventListener::once(&image, "error", move |_| {
                warn!(%url, "image failed to load");
                widget.borrow_mut().clear_image();
                settle.resolve(false);
            })
        };
        self.image_listeners = vec![on_load, on_error];
        image.set_src(image_url);
    }

    /// Re-reads the parent's size when filling the parent.
    pub fn resize(&self) {
        if let Some(widget) = &self.widget {
            let fills_parent = widget.borrow().config().sizing == Sizing::FillParent;
            if fills_parent {
                fit_to_parent(&self.canvas, widget);
            }
        }
    }

    /// Promise for the image passed last: resolves to `true` once it is
    /// animating, `false` if it failed, held no opaque pixels or was replaced.
    pub fn ready(&self) -> Promise {
        self.ready.clone()
    }

    pub fn is_running(&self) -> bool {
        self.widget
            .as_ref()
            .map_or(false, |widget| widget.borrow().state() == LoopState::Running)
    }

    pub fn particle_count(&self) -> usize {
        self.widget
            .as_ref()
            .map_or(0, |widget| widget.borrow().particle_count())
    }

    /// Unsubscribes from every event and stops the animation.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.image_listeners.clear();
        self.settle.resolve(false);
        if let Some(widget) = self.widget.take() {
            widget.borrow_mut().unmount();
        }
    }
}

impl ParticleHover {
    fn attach(&mut self, config: WidgetConfig) -> Result<()> {
        let mut widget = Widget::new(config, RafScheduler)?;
        widget.mount(CanvasSurface::acquire(&self.canvas)?);
        let widget = Rc::new(RefCell::new(widget));

        if config.sizing == Sizing::FillParent {
            fit_to_parent(&self.canvas, &widget);
            let window =
                web_sys::window().ok_or_else(|| HoverError::SurfaceUnavailable("no window".into()))?;
            let canvas = self.canvas.clone();
            let on_resize = Rc::clone(&widget);
            self.listeners
                .push(EventListener::new(&window, "resize", move |_| {
                    fit_to_parent(&canvas, &on_resize)
                }));
        }

        let canvas = self.canvas.clone();
        let on_move = Rc::clone(&widget);
        self.listeners
            .push(EventListener::new(&self.canvas, "mousemove", move |event| {
                let event = match event.dyn_ref::<MouseEvent>() {
                    Some(event) => event,
                    None => return,
                };
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                on_move.borrow_mut().pointer_move(x, y);
            }));

        self.widget = Some(widget);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_stretch_filling_the_parent() {
        let config = HoverOptions::new().config();
        assert_eq!(config.sizing, Sizing::FillParent);
        assert_eq!(config.fit, FitMode::Stretch);
    }

    #[test]
    fn scale_alone_selects_aspect_fit() {
        let mut options = HoverOptions::new();
        options.set_scale(1.8);
        options.set_size(600, 400);
        let config = options.config();
        assert_eq!(config.fit, FitMode::AspectFit { scale: 1.8 });
        assert_eq!(config.sizing, Sizing::Fixed { width: 600, height: 400 });
    }

    #[test]
    fn explicit_fit_wins_over_scale() {
        let mut options = HoverOptions::new();
        options.set_scale(1.8);
        options.set_fit("stretch");
        assert_eq!(options.config().fit, FitMode::Stretch);

        let mut options = HoverOptions::new();
        options.set_fit("aspect-fit");
        options.set_fit("sideways");
        assert_eq!(
            options.config().fit,
            FitMode::AspectFit {
                scale: DEFAULT_FIT_SCALE
            }
        );
    }
}
