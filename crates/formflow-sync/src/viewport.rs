//! Screen/canvas coordinate mapping
//!
//! A surface renders canvas content as `screen = origin + pan + canvas * zoom`,
//! where `origin` is the surface's top-left corner on screen.

use formflow_engine::constants::viewport;
use formflow_engine::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Pan offset in screen pixels
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    /// Top-left corner of the surface on screen
    pub origin: Position,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            origin: Position::default(),
        }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self {
            x,
            y,
            zoom: clamp_zoom(zoom),
            origin: Position::default(),
        }
    }

    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    /// Inverse transform: where a screen point lands on the canvas
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        let zoom = clamp_zoom(self.zoom);
        Position::new(
            (screen.x - self.origin.x - self.x) / zoom,
            (screen.y - self.origin.y - self.y) / zoom,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Position) -> Position {
        let zoom = clamp_zoom(self.zoom);
        Position::new(
            canvas.x * zoom + self.x + self.origin.x,
            canvas.y * zoom + self.y + self.origin.y,
        )
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(viewport::MIN_ZOOM, viewport::MAX_ZOOM)
    } else {
        1.0
    }
}
