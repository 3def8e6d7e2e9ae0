//! Outbound notifications from the core to whoever is watching.

use config::Placement;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    geom::Point,
    platform::{WindowId, WindowInfo},
    resolver::Stage,
};

/// Receiver for discovery and positioning events.
///
/// Callbacks run on the discovery and widget tasks; implementations must return
/// quickly and must not block.
pub trait EventSink: Send + Sync {
    /// A new candidate window passed the filters.
    fn on_window_detected(&self, _window: &WindowInfo) {}

    /// The resolver found the element to move inside `window_id`.
    fn on_element_resolved(&self, _window_id: WindowId, _stage: Stage) {}

    /// `window_id` was moved to `coordinate` for `placement`.
    fn on_window_moved(&self, window_id: WindowId, placement: Placement, coordinate: Point);

    /// Handling `window_id` failed; the loop carries on with other windows.
    fn on_window_move_failed(&self, window_id: WindowId, reason: &Error);

    /// The widget panel appeared (`true`) or disappeared (`false`).
    fn on_widget_panel_transition(&self, now_visible: bool);

    /// Discovery entered (`true`) or left (`false`) the scanning state.
    fn on_scanning_changed(&self, _scanning: bool) {}
}

/// Sink that renders every event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_window_detected(&self, window: &WindowInfo) {
        debug!(
            window_id = window.id,
            pid = window.pid,
            app = %window.app,
            w = window.frame.w,
            h = window.frame.h,
            "window_detected"
        );
    }

    fn on_element_resolved(&self, window_id: WindowId, stage: Stage) {
        debug!(window_id, stage = stage.number(), name = stage.name(), "element_resolved");
    }

    fn on_window_moved(&self, window_id: WindowId, placement: Placement, coordinate: Point) {
        info!(
            window_id,
            placement = %placement,
            x = coordinate.x,
            y = coordinate.y,
            "window_moved"
        );
    }

    fn on_window_move_failed(&self, window_id: WindowId, reason: &Error) {
        if reason.is_expected() {
            debug!(window_id, kind = reason.kind(), "window_move_skipped");
        } else {
            warn!(window_id, kind = reason.kind(), error = %reason, "window_move_failed");
        }
    }

    fn on_widget_panel_transition(&self, now_visible: bool) {
        info!(visible = now_visible, "widget_panel_transition");
    }

    fn on_scanning_changed(&self, scanning: bool) {
        info!(scanning, "discovery_scanning_changed");
    }
}
