// Refresh-driven scheduling. A [`FrameLoop`] runs its body once per display
// refresh and re-requests a frame after each run until it is cancelled or
// dropped. Outstanding requests are cancelled by dropping their handle.

use gloo::render::{request_animation_frame, AnimationFrame};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

pub type FrameCallback = Box<dyn FnOnce()>;

pub trait FrameScheduler: Clone + 'static {
    /// Handle for one pending request; dropping it cancels the request.
    type Frame: 'static;

    fn request_frame(&self, callback: FrameCallback) -> Self::Frame;
}

/// Schedules frames with the browser's `requestAnimationFrame`.
#[derive(Copy, Clone, Debug, Default)]
pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    type Frame = AnimationFrame;

    fn request_frame(&self, callback: FrameCallback) -> AnimationFrame {
        request_animation_frame(move |_timestamp| callback())
    }
}

#[derive(Default)]
struct Queue {
    next_id: u64,
    pending: Vec<(u64, FrameCallback)>,
}

/// A refresh signal driven by hand, for headless rendering and tests.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<Queue>>,
}

pub struct ManualFrame {
    id: u64,
    queue: Weak<RefCell<Queue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        ManualScheduler::default()
    }

    /// Number of requests waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Fires every request made before this call and returns how many ran.
    /// Frames requested by the callbacks wait for the next tick.
    pub fn tick(&self) -> usize {
        let due = std::mem::take(&mut self.queue.borrow_mut().pending);
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    type Frame = ManualFrame;

    fn request_frame(&self, callback: FrameCallback) -> ManualFrame {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.pending.push((id, callback));
        ManualFrame {
            id,
            queue: Rc::downgrade(&self.queue),
        }
    }
}

impl Drop for ManualFrame {
    fn drop(&mut self) {
        let queue = match self.queue.upgrade() {
            Some(queue) => queue,
            None => return,
        };
        // Dropped callbacks may own other frames, so let them go only after
        // the queue borrow ends
        let cancelled: Vec<(u64, FrameCallback)> = {
            let mut queue = queue.borrow_mut();
            let (cancelled, kept) = std::mem::take(&mut queue.pending)
                .into_iter()
                .partition(|(id, _)| *id == self.id);
            queue.pending = kept;
            cancelled
        };
        drop(cancelled);
    }
}

/// A self-rescheduling frame loop with a cancellation flag.
pub struct FrameLoop<F: FrameScheduler> {
    live: Rc<Cell<bool>>,
    frame: Rc<RefCell<Option<F::Frame>>>,
}

impl<F: FrameScheduler> FrameLoop<F> {
    pub fn start(scheduler: F, body: impl FnMut() + 'static) -> Self {
        let live = Rc::new(Cell::new(true));
        let frame = Rc::new(RefCell::new(None));
        let body: Rc<RefCell<dyn FnMut()>> = Rc::new(RefCell::new(body));
        schedule(&scheduler, &live, &frame, &body);
        debug!("frame loop started");
        FrameLoop { live, frame }
    }

    pub fn is_running(&self) -> bool {
        self.live.get()
    }

    pub fn cancel(&self) {
        if self.live.replace(false) {
            debug!("frame loop cancelled");
        }
        let pending = self.frame.borrow_mut().take();
        drop(pending);
    }
}

impl<F: FrameScheduler> Drop for FrameLoop<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule<F: FrameScheduler>(
    scheduler: &F,
    live: &Rc<Cell<bool>>,
    slot: &Rc<RefCell<Option<F::Frame>>>,
    body: &Rc<RefCell<dyn FnMut()>>,
) {
    let next = {
        let again = scheduler.clone();
        let live = Rc::clone(live);
        let slot = Rc::clone(slot);
        let body = Rc::clone(body);
        scheduler.request_frame(Box::new(move || {
            if !live.get() {
                return;
            }
            (&mut *body.borrow_mut())();
            if live.get() {
                schedule(&again, &live, &slot, &body);
            }
        }))
    };
    let previous = slot.borrow_mut().replace(next);
    drop(previous);
}
