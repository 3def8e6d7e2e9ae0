use std::{sync::Arc, time::Duration};

use notimove_core::{Desktop, Element, ElementRef, OsVersion, Rect, WindowInfo, approx_eq};
use objc2_app_kit::NSRunningApplication;
use objc2_foundation::{NSProcessInfo, NSString};
use tracing::{debug, trace, warn};

use crate::{
    ax::{AX_WINDOWS, app_element, ax_elements, cfstr, set_global_messaging_timeout},
    ax_private::window_id_for_ax_element,
    element::AxElement,
    screen::main_screen_bounds,
    window,
};

/// Frames closer than this are considered the same window.
const FRAME_MATCH_EPS: f64 = 1.0;

/// [`Desktop`] over CoreGraphics and the Accessibility API.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacDesktop;

impl MacDesktop {
    /// Backend whose AX calls are each bounded by `call_timeout`.
    pub fn new(call_timeout: Duration) -> Self {
        if let Err(e) = set_global_messaging_timeout(call_timeout.as_secs_f32()) {
            warn!(error = %e, "ax_messaging_timeout_not_set");
        }
        Self
    }
}

impl Desktop for MacDesktop {
    fn list_windows(&self) -> Vec<WindowInfo> {
        window::list_windows()
    }

    /// Match by CGWindowID first, then by frame. An app with a single AX window falls
    /// back to that window.
    fn window_element(&self, info: &WindowInfo) -> Option<ElementRef> {
        let app = app_element(info.pid)?;
        let windows: Vec<AxElement> = ax_elements(app.as_ptr(), cfstr(AX_WINDOWS))
            .into_iter()
            .map(AxElement::new)
            .collect();
        trace!(window_id = info.id, pid = info.pid, ax_windows = windows.len(), "window_element");

        let single = windows.len() == 1;
        let mut by_frame = None;
        for (i, w) in windows.iter().enumerate() {
            if window_id_for_ax_element(w.as_ptr()) == Some(info.id) {
                return windows.into_iter().nth(i).map(|w| Arc::new(w) as ElementRef);
            }
            if by_frame.is_none() && same_frame(w, &info.frame) {
                by_frame = Some(i);
            }
        }
        let pick = by_frame.or(single.then_some(0))?;
        debug!(window_id = info.id, index = pick, "window_element_fallback_match");
        windows.into_iter().nth(pick).map(|w| Arc::new(w) as ElementRef)
    }

    fn app_element_for_bundle(&self, bundle_id: &str) -> Option<ElementRef> {
        let id = NSString::from_str(bundle_id);
        let pid = unsafe {
            let apps = NSRunningApplication::runningApplicationsWithBundleIdentifier(&id);
            apps.iter().next().map(|app| app.processIdentifier())
        }?;
        let elem = app_element(pid)?;
        Some(Arc::new(AxElement::new(elem)))
    }

    fn screen_bounds(&self) -> Rect {
        main_screen_bounds()
    }

    fn os_version(&self) -> OsVersion {
        let v = unsafe { NSProcessInfo::processInfo().operatingSystemVersion() };
        OsVersion::new(
            u32::try_from(v.majorVersion).unwrap_or_default(),
            u32::try_from(v.minorVersion).unwrap_or_default(),
            u32::try_from(v.patchVersion).unwrap_or_default(),
        )
    }
}

fn same_frame(w: &AxElement, frame: &Rect) -> bool {
    match (w.position(), w.size()) {
        (Ok(p), Ok(s)) => {
            approx_eq(p.x, frame.x, FRAME_MATCH_EPS)
                && approx_eq(p.y, frame.y, FRAME_MATCH_EPS)
                && approx_eq(s.width, frame.w, FRAME_MATCH_EPS)
                && approx_eq(s.height, frame.h, FRAME_MATCH_EPS)
        }
        _ => false,
    }
}
