use eframe::egui::{Pos2, Rect, Vec2};

use super::render_utils::screen_to_world;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 2.0;

/// Once the engine's energy first falls below this after running, the camera
/// frames the ring.
pub const FRAME_ALPHA: f32 = 0.5;

const FRAME_DURATION_SECS: f32 = 0.9;

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

struct FrameToFit {
    from_pan: Vec2,
    from_zoom: f32,
    to_zoom: f32,
    progress: f32,
}

/// The view transform: a pan offset plus a uniform scale, owned here
/// exclusively. User gestures apply immediately; the one automatic
/// frame-to-fit transition animates and loses any race against a gesture.
pub struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
    animation: Option<FrameToFit>,
    framed: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            animation: None,
            framed: false,
        }
    }

    /// Frame-to-fit scale for a ring of `node_count` sites: denser rings get
    /// a wider view so the whole cycle stays legible.
    pub fn fit_zoom(node_count: usize) -> f32 {
        if node_count == 0 {
            return 1.0;
        }
        (1.0 / (node_count as f32 / 20.0).sqrt()).clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Arm the one-shot framing animation. A repeat request before
    /// `reset_framing` is a no-op; returns whether the animation started.
    pub fn request_frame_to_fit(&mut self, node_count: usize) -> bool {
        if self.framed {
            return false;
        }
        self.framed = true;
        self.animation = Some(FrameToFit {
            from_pan: self.pan,
            from_zoom: self.zoom,
            to_zoom: Self::fit_zoom(node_count),
            progress: 0.0,
        });
        true
    }

    /// New layout lifetime: the automatic framing may fire once again.
    pub fn reset_framing(&mut self) {
        self.framed = false;
        self.animation = None;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the framing animation. Returns true while still in flight.
    pub fn advance(&mut self, dt: f32) -> bool {
        let Some(animation) = &mut self.animation else {
            return false;
        };

        animation.progress = (animation.progress + dt / FRAME_DURATION_SECS).min(1.0);
        let t = smoothstep(animation.progress);
        self.zoom = animation.from_zoom + (animation.to_zoom - animation.from_zoom) * t;
        self.pan = animation.from_pan * (1.0 - t);

        if animation.progress >= 1.0 {
            self.animation = None;
            return false;
        }
        true
    }

    /// User zoom about the pointer. Cancels an in-flight framing animation;
    /// the world point under the cursor stays put.
    pub fn zoom_at(&mut self, rect: Rect, pointer: Pos2, scroll: f32) {
        self.animation = None;

        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);
        let factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// User pan by a screen-space delta. Cancels an in-flight framing
    /// animation.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.pan += delta;
    }
}
