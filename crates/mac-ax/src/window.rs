use std::ffi::c_void;

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFTypeRef, TCFType},
    dictionary::CFDictionaryRef,
};
use core_graphics::window as cgw;
use notimove_core::{Rect, WindowInfo};
use tracing::{trace, warn};

use crate::{
    cfutil::{dict_get_bounds, dict_get_i32, dict_get_string, is_dict},
    screen::{flip_rect, primary_height},
};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowListCopyWindowInfo(option: u32, relative_to_window: u32) -> CFTypeRef; // CFArrayRef
}

const K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY: u32 = 1 << 0;
const K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS: u32 = 1 << 4;

/// Every on-screen window, front to back, with frames in bottom-left space.
///
/// All layers are included; notification banners live above layer 0.
pub fn list_windows() -> Vec<WindowInfo> {
    trace!("list_windows");
    let mut out = Vec::new();
    let arr_ref = unsafe {
        CGWindowListCopyWindowInfo(
            K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY
                | K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS,
            0,
        )
    };
    if arr_ref.is_null() {
        warn!("CGWindowListCopyWindowInfo returned null");
        return out;
    }
    let arr: CFArray<*const c_void> = unsafe { CFArray::wrap_under_create_rule(arr_ref as _) };
    let pivot = primary_height();
    let (key_pid, key_num, key_app, key_layer, key_bounds) = unsafe {
        (
            cgw::kCGWindowOwnerPID,
            cgw::kCGWindowNumber,
            cgw::kCGWindowOwnerName,
            cgw::kCGWindowLayer,
            cgw::kCGWindowBounds,
        )
    };
    let n = unsafe { CFArrayGetCount(arr.as_concrete_TypeRef()) };
    for i in 0..n {
        let item = unsafe { CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) } as CFTypeRef;
        if !is_dict(item) {
            continue;
        }
        let d = item as CFDictionaryRef;
        let Some(pid) = dict_get_i32(d, key_pid) else {
            continue;
        };
        let id = match dict_get_i32(d, key_num) {
            Some(n) if n > 0 => n as u32,
            _ => continue,
        };
        let Some((x, y, w, h)) = dict_get_bounds(d, key_bounds) else {
            continue;
        };
        out.push(WindowInfo {
            id,
            pid,
            app: dict_get_string(d, key_app).unwrap_or_default(),
            layer: dict_get_i32(d, key_layer).unwrap_or_default(),
            frame: flip_rect(Rect::new(x, y, w, h), pivot),
        });
    }
    out
}
