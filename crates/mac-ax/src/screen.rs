//! Display geometry and conversion between the OS's top-left coordinates and the
//! core's bottom-left coordinates.
//!
//! Both spaces are anchored on the primary display: top-left `y` grows downward from
//! its top edge, bottom-left `y` grows upward from its bottom edge.

use core_graphics::display::CGDisplay;
use notimove_core::Rect;

/// Height of the primary display, the pivot for all flips.
pub fn primary_height() -> f64 {
    CGDisplay::main().bounds().size.height
}

/// Flip a rect between top-left and bottom-left spaces. The transform is its own
/// inverse.
pub fn flip_rect(r: Rect, primary_height: f64) -> Rect {
    Rect::new(r.x, primary_height - r.y - r.h, r.w, r.h)
}

/// Flip the `y` of an origin for an item of height `h`.
pub(crate) fn flip_y(y: f64, h: f64, primary_height: f64) -> f64 {
    primary_height - y - h
}

/// Bounds of the main display in bottom-left space. Read fresh on every call.
pub fn main_screen_bounds() -> Rect {
    let b = CGDisplay::main().bounds();
    let top_left = Rect::new(b.origin.x, b.origin.y, b.size.width, b.size.height);
    flip_rect(top_left, primary_height())
}
