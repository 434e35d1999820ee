// The hover widget: owns the surface, the particle simulation and the frame
// loop, and rebuilds the field whenever the image or the surface changes.
//
// Failures never escape: a widget that cannot build a field logs why and
// stays idle, leaving a blank surface.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace_span, warn};

use crate::config::{Sizing, WidgetConfig};
use crate::error::Result;
use crate::field::{self, FieldBuilder, ImageSource};
use crate::particle::Particle;
use crate::scheduler::{FrameLoop, FrameScheduler};
use crate::simulation::Simulation;
use crate::surface::Surface;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

struct Stage<S> {
    surface: S,
    simulation: Simulation,
}

pub struct Widget<S: Surface + 'static, F: FrameScheduler> {
    config: WidgetConfig,
    builder: FieldBuilder,
    scheduler: F,
    stage: Option<Rc<RefCell<Stage<S>>>>,
    image: Option<Box<dyn ImageSource>>,
    frame_loop: Option<FrameLoop<F>>,
}

impl<S: Surface + 'static, F: FrameScheduler> Widget<S, F> {
    pub fn new(config: WidgetConfig, scheduler: F) -> Result<Self> {
        config.validate()?;
        Ok(Widget {
            config,
            builder: FieldBuilder::from_config(&config),
            scheduler,
            stage: None,
            image: None,
            frame_loop: None,
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        match &self.frame_loop {
            Some(frame_loop) if frame_loop.is_running() => LoopState::Running,
            _ => LoopState::Idle,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.stage.is_some()
    }

    pub fn mount(&mut self, mut surface: S) {
        if let Sizing::Fixed { width, height } = self.config.sizing {
            surface.set_size(width, height);
        }
        let (width, height) = surface.size();
        debug!(width, height, "widget mounted");
        self.stop();
        self.stage = Some(Rc::new(RefCell::new(Stage {
            surface,
            simulation: Simulation::new(self.config.physics),
        })));
        self.rebuild();
    }

    /// Tears the widget down. The frame loop is cancelled before the surface
    /// is handed back, so nothing draws on it afterwards.
    pub fn unmount(&mut self) -> Option<S> {
        self.stop();
        let stage = self.stage.take()?;
        debug!("widget unmounted");
        match Rc::try_unwrap(stage) {
            Ok(stage) => Some(stage.into_inner().surface),
            Err(_) => {
                warn!("surface still referenced after unmount");
                None
            }
        }
    }

    pub fn set_image<I: ImageSource + 'static>(&mut self, image: I) {
        self.image = Some(Box::new(image));
        self.rebuild();
    }

    /// Decodes `bytes` and uses the result as the new image. Undecodable
    /// bytes leave the widget blank.
    pub fn set_image_bytes(&mut self, bytes: &[u8]) {
        match field::decode(bytes) {
            Ok(image) => self.set_image(image),
            Err(err) => {
                warn!(%err, "image failed to decode");
                self.clear_image();
            }
        }
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.rebuild();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(stage) = &self.stage {
            stage.borrow_mut().surface.set_size(width, height);
        }
        debug!(width, height, "surface resized");
        self.rebuild();
    }

    /// Pointer position in surface-local coordinates.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(stage) = &self.stage {
            stage.borrow_mut().simulation.apply_pointer([x, y]);
        }
    }

    pub fn particle_count(&self) -> usize {
        self.with_particles(|particles| particles.len()).unwrap_or(0)
    }

    pub fn with_particles<R>(&self, f: impl FnOnce(&[Particle]) -> R) -> Option<R> {
        self.stage
            .as_ref()
            .map(|stage| f(stage.borrow().simulation.particles()))
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.stage.as_ref().map(|stage| f(&stage.borrow().surface))
    }

    fn stop(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
    }

    fn rebuild(&mut self) {
        self.stop();
        let stage = match &self.stage {
            Some(stage) => Rc::clone(stage),
            None => return,
        };
        {
            let mut guard = stage.borrow_mut();
            let Stage {
                surface,
                simulation,
            } = &mut *guard;
            simulation.clear();
            surface.clear();

            let image = match &self.image {
                Some(image) => image,
                None => {
                    debug!("no image, staying idle");
                    return;
                }
            };
            match self.builder.build(image.as_ref(), surface.size()) {
                Ok(particles) => simulation.replace(particles),
                Err(err) => {
                    warn!(%err, "particle field unavailable");
                    return;
                }
            }
            if simulation.is_empty() {
                debug!("image has no opaque samples, staying idle");
                return;
            }
        }

        self.frame_loop = Some(FrameLoop::start(self.scheduler.clone(), move || {
            let _span = trace_span!("frame").entered();
            let mut guard = stage.borrow_mut();
            let Stage {
                surface,
                simulation,
            } = &mut *guard;
            simulation.advance(surface);
        }));
    }
}
