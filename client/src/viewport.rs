use leptos::prelude::*;

use hexworld_shared::axial_to_pixel;

use crate::render_loop::RenderScheduler;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
/// Zoom change for the header buttons and `+`/`-` keys.
pub const ZOOM_STEP: f64 = 0.1;
/// Zoom change per mouse-wheel notch.
pub const ZOOM_WHEEL_STEP: f64 = 0.1;
/// Pointer travel (px) after which a press counts as a drag, not a click.
pub const DRAG_CLICK_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_x: f64,
    start_y: f64,
    // Offset at press time.
    origin_x: f64,
    origin_y: f64,
    moved: bool,
}

/// Pan/zoom state of the hex scene. Offsets are in scene units, applied
/// before scaling, so the scene point `-offset` sits at the container centre
/// at every zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    drag: Option<Drag>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            drag: None,
        }
    }
}

impl Viewport {
    /// Start a click-drag pan. Refused while editing so presses paint tiles.
    pub fn begin_drag(&mut self, x: f64, y: f64, edit_mode: bool) -> bool {
        if edit_mode {
            return false;
        }
        self.drag = Some(Drag {
            start_x: x,
            start_y: y,
            origin_x: self.offset_x,
            origin_y: self.offset_y,
            moved: false,
        });
        true
    }

    /// Follow the pointer. Screen travel is divided by the scale so the scene
    /// stays under the cursor. Returns `true` if the offset changed.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        if !drag.moved {
            let travel = (x - drag.start_x).hypot(y - drag.start_y);
            drag.moved = travel > DRAG_CLICK_THRESHOLD;
        }
        let ox = drag.origin_x + (x - drag.start_x) / self.scale;
        let oy = drag.origin_y + (y - drag.start_y) / self.scale;
        let changed = ox != self.offset_x || oy != self.offset_y;
        self.offset_x = ox;
        self.offset_y = oy;
        changed
    }

    /// Finish the drag. Returns `true` if the pointer travelled far enough
    /// that the release must not be treated as a click.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some_and(|d| d.moved)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// One wheel notch. Scrolling up zooms in.
    pub fn zoom_wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_by(ZOOM_WHEEL_STEP);
        } else if delta_y > 0.0 {
            self.zoom_by(-ZOOM_WHEEL_STEP);
        }
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// Bring hex `(q, r)` to the container centre, whatever the zoom.
    pub fn center_on(&mut self, q: i32, r: i32, size: f64) {
        let (x, y) = axial_to_pixel(q, r, size);
        self.offset_x = -x;
        self.offset_y = -y;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// SVG transform for a container of `width` x `height` pixels.
    pub fn transform(&self, width: f64, height: f64) -> String {
        format!(
            "translate({:.2}, {:.2}) scale({:.3}) translate({:.2}, {:.2})",
            width / 2.0,
            height / 2.0,
            self.scale,
            self.offset_x,
            self.offset_y
        )
    }
}

/// Owns the viewport outside the reactive graph and writes its transform onto
/// the scene group at most once per animation frame. Only the zoom readout is
/// reactive.
#[derive(Clone, Copy)]
pub struct ViewportController {
    viewport: StoredValue<Viewport>,
    scheduler: StoredValue<Option<RenderScheduler>, LocalStorage>,
    zoom_percent: RwSignal<u32>,
}

impl ViewportController {
    pub fn new() -> Self {
        let viewport = Viewport::default();
        Self {
            zoom_percent: RwSignal::new(viewport.zoom_percent()),
            viewport: StoredValue::new(viewport),
            scheduler: StoredValue::new_local(None),
        }
    }

    pub fn zoom_percent(&self) -> ReadSignal<u32> {
        self.zoom_percent.read_only()
    }

    /// Bind to the scene group. The container size is read from the SVG's
    /// parent on every frame, so resizes only need a `request_frame`.
    pub fn attach(&self, scene: NodeRef<leptos::svg::G>) {
        let viewport = self.viewport;
        let scheduler = RenderScheduler::new(move || {
            let Some(group) = scene.get_untracked() else {
                return false;
            };
            let Some(container) = group
                .parent_element()
                .and_then(|svg| svg.parent_element())
            else {
                return false;
            };
            let w = container.client_width() as f64;
            let h = container.client_height() as f64;
            let Some(transform) = viewport.try_with_value(|vp| vp.transform(w, h)) else {
                return false;
            };
            group.set_attribute("transform", &transform).ok();
            false
        });
        self.scheduler.set_value(Some(scheduler));
        self.request_frame();
    }

    pub fn request_frame(&self) {
        self.scheduler.with_value(|scheduler| {
            if let Some(scheduler) = scheduler {
                scheduler.mark_dirty();
            }
        });
    }

    pub fn begin_drag(&self, x: f64, y: f64, edit_mode: bool) -> bool {
        self.viewport
            .try_update_value(|vp| vp.begin_drag(x, y, edit_mode))
            .unwrap_or(false)
    }

    pub fn drag_to(&self, x: f64, y: f64) {
        let moved = self
            .viewport
            .try_update_value(|vp| vp.drag_to(x, y))
            .unwrap_or(false);
        if moved {
            self.request_frame();
        }
    }

    pub fn end_drag(&self) -> bool {
        self.viewport
            .try_update_value(|vp| vp.end_drag())
            .unwrap_or(false)
    }

    pub fn is_dragging(&self) -> bool {
        self.viewport
            .try_with_value(|vp| vp.is_dragging())
            .unwrap_or(false)
    }

    pub fn zoom_by(&self, delta: f64) {
        self.apply(|vp| vp.zoom_by(delta));
    }

    pub fn zoom_wheel(&self, delta_y: f64) {
        self.apply(|vp| vp.zoom_wheel(delta_y));
    }

    pub fn center_on(&self, q: i32, r: i32, size: f64) {
        self.apply(|vp| vp.center_on(q, r, size));
    }

    pub fn reset(&self) {
        self.apply(Viewport::reset);
    }

    fn apply(&self, f: impl FnOnce(&mut Viewport)) {
        let Some(percent) = self.viewport.try_update_value(|vp| {
            f(vp);
            vp.zoom_percent()
        }) else {
            return;
        };
        if self.zoom_percent.get_untracked() != percent {
            self.zoom_percent.set(percent);
        }
        self.request_frame();
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}
