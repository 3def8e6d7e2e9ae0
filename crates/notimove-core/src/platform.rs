//! Seams between the core and the host OS.
//!
//! Handles are views onto state owned by other processes. They may go stale at any
//! time, so the core never keeps one across a poll boundary; windows are re-resolved
//! from their id on every pass.

use std::{fmt, sync::Arc};

use crate::{
    error::AxError,
    geom::{Point, Rect, Size},
};

/// Stable numeric identifier of an on-screen window.
pub type WindowId = u32;

/// Snapshot of one window as reported by the OS enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Window id.
    pub id: WindowId,
    /// Owning process id.
    pub pid: i32,
    /// Owning process name.
    pub app: String,
    /// Window layer reported by the window server.
    pub layer: i32,
    /// On-screen frame, bottom-left origin.
    pub frame: Rect,
}

/// OS version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct OsVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl OsVersion {
    /// Construct a version triple.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A node in a foreign UI-automation tree.
///
/// Every method is a blocking call into another process and may fail or stall.
pub trait Element: Send + Sync + fmt::Debug {
    /// Role string, e.g. `AXGroup`.
    fn role(&self) -> Option<String>;
    /// Subrole string, if the element has one.
    fn subrole(&self) -> Option<String>;
    /// Automation identifier, if the element has one.
    fn identifier(&self) -> Option<String>;
    /// Direct children in tree order.
    fn children(&self) -> Vec<ElementRef>;
    /// Current origin, bottom-left coordinate space.
    fn position(&self) -> Result<Point, AxError>;
    /// Current size.
    fn size(&self) -> Result<Size, AxError>;
    /// Whether the position attribute accepts writes.
    fn position_settable(&self) -> Result<bool, AxError>;
    /// Write a new origin, bottom-left coordinate space.
    fn set_position(&self, pos: Point) -> Result<(), AxError>;
}

/// Shared handle to a foreign element.
pub type ElementRef = Arc<dyn Element>;

/// System-wide window and screen access.
pub trait Desktop: Send + Sync {
    /// All currently visible windows, in OS enumeration order.
    fn list_windows(&self) -> Vec<WindowInfo>;
    /// Root automation element for `window`, or `None` if it cannot be reached.
    fn window_element(&self, window: &WindowInfo) -> Option<ElementRef>;
    /// Application-level automation element for the running app with `bundle_id`.
    fn app_element_for_bundle(&self, bundle_id: &str) -> Option<ElementRef>;
    /// Bounds of the active display, bottom-left origin. Fetched fresh on each call.
    fn screen_bounds(&self) -> Rect;
    /// Version of the running OS.
    fn os_version(&self) -> OsVersion;
}

/// The OS trust primitive behind the permission gate.
pub trait TrustCheck: Send + Sync {
    /// True when this process may read and write foreign UI trees.
    fn is_trusted(&self) -> bool;
}

/// Trust check backed by the system accessibility permission.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrust;

impl TrustCheck for SystemTrust {
    fn is_trusted(&self) -> bool {
        permissions::accessibility_ok()
    }
}
