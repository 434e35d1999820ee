// Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

extern crate wasm_bindgen_test;
use particle_hover::{
    CanvasSurface, Color, HoverOptions, ImageSource, ParticleHover, PixelBuffer, Surface,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, HtmlImageElement};

wasm_bindgen_test_configure!(run_in_browser);

// 8x8 fully opaque red
const RED_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAgAAAAICAYAAADED76LAAAAEklEQVR4nGP4z8DwHx9mGBkKAMLXf4EvceABAAAAAElFTkSuQmCC";

fn canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn context(canvas: &HtmlCanvasElement) -> CanvasRenderingContext2d {
    canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap()
}

#[wasm_bindgen_test]
fn canvas_surface_fills_squares() {
    let canvas = canvas();
    let mut surface = CanvasSurface::acquire(&canvas).unwrap();
    surface.set_size(10, 10);
    assert_eq!(surface.size(), (10, 10));
    surface.fill_square(2.0, 2.0, 3.0, Color::rgb(255, 0, 0));

    let data = context(&canvas).get_image_data(3.0, 3.0, 1.0, 1.0).unwrap().data();
    assert_eq!(data.0, vec![255, 0, 0, 255]);

    surface.clear();
    let data = context(&canvas).get_image_data(3.0, 3.0, 1.0, 1.0).unwrap().data();
    assert_eq!(data.0[3], 0);
}

#[wasm_bindgen_test]
fn pixel_buffer_presents_onto_a_canvas() {
    let canvas = canvas();
    canvas.set_width(4);
    canvas.set_height(4);
    let mut buffer = PixelBuffer::new(4, 4);
    buffer.fill_square(0.0, 0.0, 2.0, Color::rgb(0, 0, 255));
    buffer.present(&context(&canvas)).unwrap();

    let data = context(&canvas).get_image_data(1.0, 1.0, 1.0, 1.0).unwrap().data();
    assert_eq!(data.0, vec![0, 0, 255, 255]);
}

#[wasm_bindgen_test]
fn unloaded_image_has_no_pixels() {
    let image = HtmlImageElement::new().unwrap();
    assert_eq!(image.dimensions(), (0, 0));
}

#[wasm_bindgen_test]
fn fixed_size_hover_sizes_its_canvas_and_waits_for_the_image() {
    let canvas = canvas();
    let mut options = HoverOptions::new();
    options.set_size(300, 200);
    let mut hover = ParticleHover::new(canvas.clone(), "", &options);
    assert_eq!((canvas.width(), canvas.height()), (300, 200));
    assert!(!hover.is_running());
    assert_eq!(hover.particle_count(), 0);

    hover.destroy();
    assert!(!hover.is_running());
}

#[wasm_bindgen_test]
fn hover_on_a_bad_scale_stays_inert() {
    let canvas = canvas();
    let mut options = HoverOptions::new();
    options.set_scale(-1.0);
    let hover = ParticleHover::new(canvas, "", &options);
    assert!(!hover.is_running());
    assert_eq!(hover.particle_count(), 0);
}

#[wasm_bindgen_test]
async fn loaded_image_rasterizes_through_an_offscreen_canvas() {
    let image = HtmlImageElement::new().unwrap();
    image.set_src(RED_PNG);
    JsFuture::from(image.decode()).await.unwrap();
    assert_eq!(image.dimensions(), (8, 8));

    let raster = image.rasterize(8, 8).unwrap();
    assert_eq!((raster.width(), raster.height()), (8, 8));
    assert_eq!(raster.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(raster.pixel(7, 7), [255, 0, 0, 255]);

    let scaled = image.rasterize(4, 2).unwrap();
    assert_eq!(scaled.pixel(3, 1), [255, 0, 0, 255]);
}

#[wasm_bindgen_test]
async fn hover_starts_animating_once_its_image_loads() {
    let canvas = canvas();
    let mut options = HoverOptions::new();
    options.set_size(8, 8);
    let mut hover = ParticleHover::new(canvas, RED_PNG, &options);

    let running = JsFuture::from(hover.ready()).await.unwrap();
    assert_eq!(running.as_bool(), Some(true));
    assert!(hover.is_running());
    assert_eq!(hover.particle_count(), 4);

    hover.destroy();
    assert!(!hover.is_running());
    assert_eq!(hover.particle_count(), 0);
}

#[wasm_bindgen_test]
async fn replaced_image_settles_its_promise_as_not_running() {
    let canvas = canvas();
    let mut options = HoverOptions::new();
    options.set_size(8, 8);
    let mut hover = ParticleHover::new(canvas, RED_PNG, &options);
    let first = hover.ready();
    hover.set_image(RED_PNG);

    let first = JsFuture::from(first).await.unwrap();
    assert_eq!(first.as_bool(), Some(false));
    let second = JsFuture::from(hover.ready()).await.unwrap();
    assert_eq!(second.as_bool(), Some(true));
}

fn sized_parent(width: u32, height: u32) -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let parent = document.create_element("div").unwrap();
    set_parent_size(&parent, width, height);
    document.body().unwrap().append_child(&parent).unwrap();
    parent
}

fn set_parent_size(parent: &Element, width: u32, height: u32) {
    parent
        .set_attribute(
            "style",
            &format!("width: {}px; height: {}px; overflow: hidden;", width, height),
        )
        .unwrap();
}

#[wasm_bindgen_test]
fn fill_parent_hover_tracks_its_container() {
    let parent = sized_parent(120, 80);
    let canvas = canvas();
    parent.append_child(&canvas).unwrap();
    let mut hover = ParticleHover::new(canvas.clone(), "", &HoverOptions::new());
    assert_eq!((canvas.width(), canvas.height()), (120, 80));

    set_parent_size(&parent, 200, 50);
    hover.resize();
    assert_eq!((canvas.width(), canvas.height()), (200, 50));

    set_parent_size(&parent, 64, 96);
    let window = web_sys::window().unwrap();
    window
        .dispatch_event(&Event::new("resize").unwrap())
        .unwrap();
    assert_eq!((canvas.width(), canvas.height()), (64, 96));

    hover.destroy();
    set_parent_size(&parent, 300, 300);
    window
        .dispatch_event(&Event::new("resize").unwrap())
        .unwrap();
    assert_eq!((canvas.width(), canvas.height()), (64, 96));
}
