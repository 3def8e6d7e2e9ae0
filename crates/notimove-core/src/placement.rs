//! Target coordinate computation for the nine named placements.
//!
//! Coordinates are bottom-left origin: `y = 0` is the bottom edge of the screen.
//! Bottom placements clear the dock with a fixed offset instead of `padding`.

use config::{HAlign, Placement, VAlign};

use crate::geom::{Point, Rect, Size};

/// Height reserved for the dock along the bottom edge.
pub const DOCK_CLEARANCE: f64 = 70.0;

/// Extra gap kept between a bottom-placed element and the dock.
pub const ABOVE_DOCK_OFFSET: f64 = 10.0;

/// Bottom edge of any bottom-aligned placement, relative to the screen origin.
pub const BOTTOM_Y: f64 = DOCK_CLEARANCE + ABOVE_DOCK_OFFSET;

/// Compute the origin (bottom-left corner) an element of `element` size should be
/// moved to for `placement` on `screen`.
pub fn calculate_position(placement: Placement, element: Size, screen: Rect, padding: f64) -> Point {
    let x = match placement.horizontal() {
        HAlign::Left => padding,
        HAlign::Center => (screen.w - element.width) / 2.0,
        HAlign::Right => screen.w - element.width - padding,
    };
    let y = match placement.vertical() {
        VAlign::Top => screen.h - element.height - padding,
        VAlign::Middle => (screen.h - element.height) / 2.0,
        VAlign::Bottom => BOTTOM_Y,
    };
    Point::new(screen.x + x, screen.y + y)
}
