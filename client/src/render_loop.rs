use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Dirty/scheduled bookkeeping for one animation-frame loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameGate {
    dirty: bool,
    scheduled: bool,
}

impl FrameGate {
    /// Flag a repaint. Returns `true` when no frame is pending yet and the
    /// caller has to request one.
    pub fn mark_dirty(&mut self) -> bool {
        self.dirty = true;
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Start of a frame callback. Returns whether anything needs drawing.
    pub fn begin_frame(&mut self) -> bool {
        self.scheduled = false;
        std::mem::take(&mut self.dirty)
    }

    pub fn request_failed(&mut self) {
        self.scheduled = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Coalesces repaint requests into at most one `requestAnimationFrame`
/// callback per vsync.
///
/// When the render function returns `true` another frame is requested
/// straight away.
pub struct RenderScheduler {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    gate: Cell<FrameGate>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Inner {
    fn mark_dirty(&self) {
        let mut gate = self.gate.get();
        let needs_request = gate.mark_dirty();
        self.gate.set(gate);
        if needs_request {
            self.request_frame();
        }
    }

    fn request_frame(&self) {
        let cb_ref = self.callback.borrow();
        let requested = match (self.window.as_ref(), cb_ref.as_ref()) {
            (Some(window), Some(cb)) => window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .ok(),
            _ => None,
        };
        match requested {
            Some(id) => self.raf_id.set(Some(id)),
            None => {
                let mut gate = self.gate.get();
                gate.request_failed();
                self.gate.set(gate);
            }
        }
    }
}

impl RenderScheduler {
    pub fn new(render_fn: impl Fn() -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            gate: Cell::new(FrameGate::default()),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let inner_cb = Rc::clone(&inner);
        let cb = Closure::<dyn FnMut()>::new(move || {
            inner_cb.raf_id.set(None);
            let mut gate = inner_cb.gate.get();
            let due = gate.begin_frame();
            inner_cb.gate.set(gate);
            if due && render_fn() {
                inner_cb.mark_dirty();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    pub fn mark_dirty(&self) {
        self.inner.mark_dirty();
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        let mut gate = self.inner.gate.get();
        gate.clear();
        self.inner.gate.set(gate);
        // Break the callback -> inner cycle.
        self.inner.callback.borrow_mut().take();
    }
}
