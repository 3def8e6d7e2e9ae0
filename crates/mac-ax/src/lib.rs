//! macOS backend for the notimove core.
//!
//! Window enumeration goes through CoreGraphics, element trees through the
//! Accessibility (AX) API. Both report geometry with a top-left origin on the
//! primary display; everything handed to the core is flipped into the core's
//! bottom-left space here.
#![cfg(target_os = "macos")]

mod ax;
mod ax_private;
mod cfutil;
mod desktop;
mod element;
mod screen;
mod window;

pub use desktop::MacDesktop;
pub use element::AxElement;
pub use screen::{flip_rect, main_screen_bounds, primary_height};
pub use window::list_windows;
